//! Reaction handlers

use axum::{
    extract::{Path, State},
    Json,
};
use messenger_service::dto::{ToggleReactionRequest, ToggleReactionResponse};
use messenger_service::ReactionService;

use crate::extractors::{AuthUser, JsonBody, MessageIdPath};
use crate::response::ApiResult;
use crate::state::AppState;

/// Toggle the caller's reaction on a message
///
/// POST /api/messages/{message_id}/react
pub async fn toggle_reaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<MessageIdPath>,
    JsonBody(request): JsonBody<ToggleReactionRequest>,
) -> ApiResult<Json<ToggleReactionResponse>> {
    let message_id = path.message_id()?;

    let service = ReactionService::new(state.service_context());
    let result = service
        .toggle(message_id, auth.user_id(), &request.emoji)
        .await?;
    Ok(Json(result))
}
