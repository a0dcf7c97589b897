//! User handlers

use axum::{extract::State, Json};
use messenger_service::dto::{DirectoryQuery, UsersResponse};
use messenger_service::UserService;

use crate::extractors::{AuthUser, ValidatedQuery};
use crate::response::ApiResult;
use crate::state::AppState;

/// Everyone except the caller, ordered by name
///
/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedQuery(query): ValidatedQuery<DirectoryQuery>,
) -> ApiResult<Json<UsersResponse>> {
    let service = UserService::new(state.service_context());
    let users = service.list_directory(auth.user_id(), query.limit).await?;
    Ok(Json(users))
}
