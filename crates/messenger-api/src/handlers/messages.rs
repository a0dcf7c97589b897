//! Message handlers
//!
//! Endpoints for message operations.

use axum::{
    extract::{Path, State},
    Json,
};
use messenger_service::dto::{ListMessagesQuery, MessageResponse, SendMessageRequest};
use messenger_service::MessageService;

use crate::extractors::{AuthUser, ChatIdPath, JsonBody, ValidatedQuery};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Messages of a chat, oldest first
///
/// GET /api/messages/chat/{chat_id}?before=&limit=
pub async fn list_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<ChatIdPath>,
    ValidatedQuery(query): ValidatedQuery<ListMessagesQuery>,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let chat_id = path.chat_id()?;

    let service = MessageService::new(state.service_context());
    let messages = service.list_for_chat(chat_id, auth.user_id(), query).await?;
    Ok(Json(messages))
}

/// Send a message
///
/// POST /api/messages
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(request): JsonBody<SendMessageRequest>,
) -> ApiResult<Created<Json<MessageResponse>>> {
    let service = MessageService::new(state.service_context());
    let message = service.append(auth.user_id(), request).await?;
    Ok(Created(Json(message)))
}
