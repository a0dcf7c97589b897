//! Route definitions
//!
//! All API routes organized by domain and mounted under /api.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{auth, chats, health, messages, reactions, users};
use crate::state::AppState;

/// API routes (health routes are separate so they bypass rate limiting)
pub fn api_routes() -> Router<AppState> {
    Router::new().nest(
        "/api",
        Router::new()
            .merge(auth_routes())
            .merge(user_routes())
            .merge(chat_routes())
            .merge(message_routes()),
    )
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// Authentication routes
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/callback", post(auth::callback))
        .route("/auth/me", get(auth::me))
}

/// User routes
fn user_routes() -> Router<AppState> {
    Router::new().route("/users", get(users::list_users))
}

/// Chat routes
fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/chats", get(chats::list_chats))
        .route("/chats/direct", post(chats::open_direct_chat))
        .route("/chats/group", post(chats::create_group))
        .route("/chats/:chat_id/members", post(chats::add_member))
        .route("/chats/:chat_id/read", post(chats::mark_read))
}

/// Message routes
fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/messages", post(messages::send_message))
        .route("/messages/chat/:chat_id", get(messages::list_messages))
        .route("/messages/:message_id/react", post(reactions::toggle_reaction))
}
