//! Chat handlers
//!
//! Endpoints for listing, opening and creating chats, and for membership.

use axum::{
    extract::{Path, State},
    Json,
};
use messenger_service::dto::{
    AddMemberRequest, ChatDetailResponse, ChatSummaryResponse, CreateDirectChatRequest,
    CreateGroupChatRequest, MemberResponse,
};
use messenger_service::ConversationService;

use crate::extractors::{AuthUser, ChatIdPath, JsonBody};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// List my chats, most recent first
///
/// GET /api/chats
pub async fn list_chats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<ChatSummaryResponse>>> {
    let service = ConversationService::new(state.service_context());
    let chats = service.list_chats_for_user(auth.user_id()).await?;
    Ok(Json(chats))
}

/// Get or create the direct chat with another user
///
/// POST /api/chats/direct
pub async fn open_direct_chat(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(request): JsonBody<CreateDirectChatRequest>,
) -> ApiResult<Json<ChatDetailResponse>> {
    let service = ConversationService::new(state.service_context());
    let chat = service
        .open_direct_chat(auth.user_id(), request.other_user_id)
        .await?;
    Ok(Json(chat))
}

/// Create a group chat
///
/// POST /api/chats/group
pub async fn create_group(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(request): JsonBody<CreateGroupChatRequest>,
) -> ApiResult<Created<Json<ChatDetailResponse>>> {
    let service = ConversationService::new(state.service_context());
    let chat = service.create_group(auth.user_id(), request).await?;
    Ok(Created(Json(chat)))
}

/// Add a member to a group chat
///
/// POST /api/chats/{chat_id}/members
pub async fn add_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<ChatIdPath>,
    JsonBody(request): JsonBody<AddMemberRequest>,
) -> ApiResult<Created<Json<MemberResponse>>> {
    let chat_id = path.chat_id()?;

    let service = ConversationService::new(state.service_context());
    let member = service.add_member(chat_id, auth.user_id(), request).await?;
    Ok(Created(Json(member)))
}

/// Mark a chat read up to now
///
/// POST /api/chats/{chat_id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<ChatIdPath>,
) -> ApiResult<NoContent> {
    let chat_id = path.chat_id()?;

    let service = ConversationService::new(state.service_context());
    service.mark_read(chat_id, auth.user_id()).await?;
    Ok(NoContent)
}
