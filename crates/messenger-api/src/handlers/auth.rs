//! Authentication handlers
//!
//! Token verification happens in the [`AuthUser`] extractor; these endpoints
//! expose the resolved user.

use axum::{extract::State, Json};
use messenger_service::dto::UserResponse;
use messenger_service::UserService;

use crate::extractors::AuthUser;
use crate::response::ApiResult;
use crate::state::AppState;

/// Sign-in callback: resolves the principal, creating the user on first sight
///
/// POST /api/auth/callback
pub async fn callback(auth: AuthUser) -> Json<UserResponse> {
    Json(UserResponse::from(auth.user))
}

/// Get current user
///
/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<UserResponse>> {
    let service = UserService::new(state.service_context());
    let user = service.current_user(auth.user_id()).await?;
    Ok(Json(user))
}
