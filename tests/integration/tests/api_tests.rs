//! API Integration Tests
//!
//! Each test starts its own server on the in-memory backend, so no external
//! services are required.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use futures::future::join_all;
use integration_tests::{
    assert_error, assert_json, assert_status, fixtures::*, TestServer,
};
use reqwest::StatusCode;
use serde_json::json;

/// Start a server and sign in two fresh users
async fn server_with_pair() -> (TestServer, (String, String), (String, String)) {
    let server = TestServer::start().await.expect("Failed to start server");
    let ada = server
        .sign_in(&TestUser::named("Ada", "Lovelace"))
        .await
        .unwrap();
    let bob = server
        .sign_in(&TestUser::named("Bob", "Builder"))
        .await
        .unwrap();
    (server, ada, bob)
}

async fn open_direct(server: &TestServer, token: &str, other_id: &str) -> ChatDetailBody {
    let response = server
        .post_auth("/api/chats/direct", token, &direct_chat_body(other_id))
        .await
        .unwrap();
    assert_json(response, StatusCode::OK).await.unwrap()
}

async fn send_text(server: &TestServer, token: &str, chat_id: &str, text: &str) -> MessageBody {
    let response = server
        .post_auth("/api/messages", token, &text_message_body(chat_id, text))
        .await
        .unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

async fn list_chats(server: &TestServer, token: &str) -> Vec<ChatBody> {
    let response = server.get_auth("/api/chats", token).await.unwrap();
    assert_json(response, StatusCode::OK).await.unwrap()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_health_ready_with_memory_backend() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["checks"]["database"], "disabled");
    assert_eq!(body["checks"]["redis"], "disabled");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

// ============================================================================
// Identity Tests
// ============================================================================

#[tokio::test]
async fn test_missing_token_is_unauthenticated() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/api/chats").await.unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_garbage_token_is_unauthenticated() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get_auth("/api/auth/me", "not-a-jwt").await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_callback_provisions_user_once() {
    let server = TestServer::start().await.expect("Failed to start server");
    let user = TestUser::named("Ada", "Lovelace");
    let token = server.token_for(&user).unwrap();

    let first: UserBody = assert_json(
        server
            .post_auth("/api/auth/callback", &token, &json!({}))
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert_eq!(first.name, "Ada Lovelace");
    assert_eq!(first.email, user.email);

    let me: UserBody = assert_json(
        server.get_auth("/api/auth/me", &token).await.unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert_eq!(me.id, first.id);
}

#[tokio::test]
async fn test_concurrent_first_requests_share_one_user() {
    let server = TestServer::start().await.expect("Failed to start server");
    let token = server.token_for(&TestUser::named("Cy", "Racer")).unwrap();

    let responses = join_all((0..8).map(|_| server.get_auth("/api/auth/me", &token))).await;

    let mut ids = Vec::new();
    for response in responses {
        let me: UserBody = assert_json(response.unwrap(), StatusCode::OK).await.unwrap();
        ids.push(me.id);
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 1);
}

#[tokio::test]
async fn test_directory_excludes_caller() {
    let (server, (ada_token, ada_id), (_, bob_id)) = server_with_pair().await;

    let response = server.get_auth("/api/users", &ada_token).await.unwrap();
    let body: UsersBody = assert_json(response, StatusCode::OK).await.unwrap();

    assert!(body.users.iter().any(|u| u.id == bob_id));
    assert!(body.users.iter().all(|u| u.id != ada_id));
}

// ============================================================================
// Direct Chat Tests
// ============================================================================

#[tokio::test]
async fn test_direct_chat_is_shared_by_both_sides() {
    let (server, (ada_token, ada_id), (bob_token, bob_id)) = server_with_pair().await;

    let from_ada = open_direct(&server, &ada_token, &bob_id).await;
    let from_bob = open_direct(&server, &bob_token, &ada_id).await;

    assert_eq!(from_ada.summary.id, from_bob.summary.id);
    assert_eq!(from_ada.summary.chat_type, "DIRECT");
    assert_eq!(from_ada.members.len(), 2);
    assert_eq!(from_ada.summary.peer.as_ref().unwrap().id, bob_id);
    assert_eq!(from_bob.summary.peer.as_ref().unwrap().id, ada_id);
}

#[tokio::test]
async fn test_concurrent_direct_opens_converge() {
    let (server, (ada_token, _), (_, bob_id)) = server_with_pair().await;

    let body = direct_chat_body(&bob_id);
    let responses =
        join_all((0..10).map(|_| server.post_auth("/api/chats/direct", &ada_token, &body))).await;

    let mut ids = Vec::new();
    for response in responses {
        let chat: ChatDetailBody = assert_json(response.unwrap(), StatusCode::OK).await.unwrap();
        ids.push(chat.summary.id);
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 1);
    assert_eq!(list_chats(&server, &ada_token).await.len(), 1);
}

#[tokio::test]
async fn test_self_chat_is_saved_messages() {
    let (server, (ada_token, ada_id), _) = server_with_pair().await;

    let chat = open_direct(&server, &ada_token, &ada_id).await;

    assert_eq!(chat.summary.name, "Saved Messages");
    assert_eq!(chat.members.len(), 1);
    assert_eq!(chat.members[0].role, "OWNER");
}

#[tokio::test]
async fn test_unknown_counterpart_is_rejected() {
    let (server, (ada_token, _), _) = server_with_pair().await;

    let response = server
        .post_auth("/api/chats/direct", &ada_token, &direct_chat_body("424242"))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "UNKNOWN_COUNTERPART");
}

#[tokio::test]
async fn test_missing_counterpart_is_invalid() {
    let (server, (ada_token, _), _) = server_with_pair().await;

    let response = server
        .post_auth("/api/chats/direct", &ada_token, &json!({}))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "MISSING_FIELD");
}

// ============================================================================
// Unread Tracking Tests
// ============================================================================

#[tokio::test]
async fn test_unread_counts_and_mark_read() {
    let (server, (ada_token, _), (bob_token, bob_id)) = server_with_pair().await;
    let chat = open_direct(&server, &ada_token, &bob_id).await;
    let chat_id = chat.summary.id;

    send_text(&server, &bob_token, &chat_id, "hi").await;
    send_text(&server, &bob_token, &chat_id, "you there?").await;

    let ada_chats = list_chats(&server, &ada_token).await;
    assert_eq!(ada_chats[0].unread_count, 2);
    let last = ada_chats[0].last_message.as_ref().unwrap();
    assert_eq!(last.text.as_deref(), Some("you there?"));
    assert_eq!(last.sender_id, bob_id);

    // Own messages never count as unread
    let bob_chats = list_chats(&server, &bob_token).await;
    assert_eq!(bob_chats[0].unread_count, 0);

    let response = server
        .post_auth(&format!("/api/chats/{chat_id}/read"), &ada_token, &json!({}))
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let ada_chats = list_chats(&server, &ada_token).await;
    assert_eq!(ada_chats[0].unread_count, 0);
}

#[tokio::test]
async fn test_chats_ordered_by_recent_activity() {
    let server = TestServer::start().await.expect("Failed to start server");
    let (ada_token, _) = server.sign_in(&TestUser::named("Ada", "L")).await.unwrap();
    let (_, bob_id) = server.sign_in(&TestUser::named("Bob", "B")).await.unwrap();
    let (_, cy_id) = server.sign_in(&TestUser::named("Cy", "C")).await.unwrap();

    let with_bob = open_direct(&server, &ada_token, &bob_id).await;
    let with_cy = open_direct(&server, &ada_token, &cy_id).await;

    send_text(&server, &ada_token, &with_bob.summary.id, "ping").await;

    let chats = list_chats(&server, &ada_token).await;
    assert_eq!(chats[0].id, with_bob.summary.id);
    assert_eq!(chats[1].id, with_cy.summary.id);
}

// ============================================================================
// Group Chat Tests
// ============================================================================

#[tokio::test]
async fn test_create_group_and_add_member() {
    let server = TestServer::start().await.expect("Failed to start server");
    let (ada_token, ada_id) = server.sign_in(&TestUser::named("Ada", "L")).await.unwrap();
    let (bob_token, bob_id) = server.sign_in(&TestUser::named("Bob", "B")).await.unwrap();
    let (_, cy_id) = server.sign_in(&TestUser::named("Cy", "C")).await.unwrap();

    let response = server
        .post_auth(
            "/api/chats/group",
            &ada_token,
            &group_chat_body("  Engines  ", &[&bob_id, &bob_id, &ada_id]),
        )
        .await
        .unwrap();
    let group: ChatDetailBody = assert_json(response, StatusCode::CREATED).await.unwrap();

    assert_eq!(group.summary.chat_type, "GROUP");
    assert_eq!(group.summary.name, "Engines");
    assert_eq!(group.members.len(), 2);
    assert_eq!(group.members[0].user_id, ada_id);
    assert_eq!(group.members[0].role, "OWNER");

    let path = format!("/api/chats/{}/members", group.summary.id);

    // Plain members may not add people
    let response = server
        .post_auth(&path, &bob_token, &json!({ "userId": cy_id }))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(code, "INSUFFICIENT_CHAT_ROLE");

    let response = server
        .post_auth(&path, &ada_token, &json!({ "userId": cy_id }))
        .await
        .unwrap();
    let member: MemberBody = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(member.user_id, cy_id);
    assert_eq!(member.role, "MEMBER");

    let response = server
        .post_auth(&path, &ada_token, &json!({ "userId": cy_id }))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(code, "ALREADY_MEMBER");
}

#[tokio::test]
async fn test_group_without_members_is_rejected() {
    let (server, (ada_token, ada_id), _) = server_with_pair().await;

    let response = server
        .post_auth("/api/chats/group", &ada_token, &group_chat_body("Solo", &[&ada_id]))
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

// ============================================================================
// Message Tests
// ============================================================================

#[tokio::test]
async fn test_send_and_list_messages() {
    let (server, (ada_token, ada_id), (bob_token, bob_id)) = server_with_pair().await;
    let chat_id = open_direct(&server, &ada_token, &bob_id).await.summary.id;

    let first = send_text(&server, &ada_token, &chat_id, "first").await;
    assert_eq!(first.chat_id, chat_id);
    assert_eq!(first.sender.id, ada_id);
    assert_eq!(first.sender.name, "Ada Lovelace");
    send_text(&server, &bob_token, &chat_id, "second").await;

    let response = server
        .get_auth(&format!("/api/messages/chat/{chat_id}"), &bob_token)
        .await
        .unwrap();
    let messages: Vec<MessageBody> = assert_json(response, StatusCode::OK).await.unwrap();

    let texts: Vec<_> = messages.iter().filter_map(|m| m.text.as_deref()).collect();
    assert_eq!(texts, ["first", "second"]);
}

#[tokio::test]
async fn test_message_paging_with_before_cursor() {
    let (server, (ada_token, _), (_, bob_id)) = server_with_pair().await;
    let chat_id = open_direct(&server, &ada_token, &bob_id).await.summary.id;

    let mut sent = Vec::new();
    for i in 0..5 {
        sent.push(send_text(&server, &ada_token, &chat_id, &format!("m{i}")).await);
    }

    let path = format!("/api/messages/chat/{chat_id}?limit=2&before={}", sent[4].id);
    let page: Vec<MessageBody> =
        assert_json(server.get_auth(&path, &ada_token).await.unwrap(), StatusCode::OK)
            .await
            .unwrap();

    let ids: Vec<_> = page.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, [sent[2].id.as_str(), sent[3].id.as_str()]);
}

#[tokio::test]
async fn test_empty_message_is_rejected() {
    let (server, (ada_token, _), (_, bob_id)) = server_with_pair().await;
    let chat_id = open_direct(&server, &ada_token, &bob_id).await.summary.id;

    let response = server
        .post_auth("/api/messages", &ada_token, &text_message_body(&chat_id, "   "))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "EMPTY_MESSAGE");
}

#[tokio::test]
async fn test_outsider_cannot_read_or_write() {
    let server = TestServer::start().await.expect("Failed to start server");
    let (ada_token, _) = server.sign_in(&TestUser::named("Ada", "L")).await.unwrap();
    let (_, bob_id) = server.sign_in(&TestUser::named("Bob", "B")).await.unwrap();
    let (eve_token, _) = server.sign_in(&TestUser::named("Eve", "E")).await.unwrap();
    let chat_id = open_direct(&server, &ada_token, &bob_id).await.summary.id;

    let response = server
        .get_auth(&format!("/api/messages/chat/{chat_id}"), &eve_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();

    let response = server
        .post_auth("/api/messages", &eve_token, &text_message_body(&chat_id, "hi"))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(code, "NOT_CHAT_MEMBER");
}

#[tokio::test]
async fn test_malformed_chat_id_is_invalid() {
    let (server, (ada_token, _), _) = server_with_pair().await;

    let response = server
        .get_auth("/api/messages/chat/not-a-number", &ada_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

// ============================================================================
// Reaction Tests
// ============================================================================

#[tokio::test]
async fn test_reaction_toggle_flips() {
    let (server, (ada_token, ada_id), (bob_token, bob_id)) = server_with_pair().await;
    let chat_id = open_direct(&server, &ada_token, &bob_id).await.summary.id;
    let message = send_text(&server, &ada_token, &chat_id, "react to me").await;
    let path = format!("/api/messages/{}/react", message.id);

    let added: ToggleBody = assert_json(
        server.post_auth(&path, &bob_token, &reaction_body("👍")).await.unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert_eq!(added.status, "added");
    assert_eq!(added.reaction.as_ref().unwrap().user_id, bob_id);

    let response = server
        .get_auth(&format!("/api/messages/chat/{chat_id}"), &ada_token)
        .await
        .unwrap();
    let messages: Vec<MessageBody> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(messages[0].reactions.len(), 1);
    assert_eq!(messages[0].reactions[0].emoji, "👍");

    let removed: ToggleBody = assert_json(
        server.post_auth(&path, &bob_token, &reaction_body("👍")).await.unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert_eq!(removed.status, "removed");
    assert!(removed.reaction.is_none());

    // The author may react to their own message
    let own: ToggleBody = assert_json(
        server.post_auth(&path, &ada_token, &reaction_body("👍")).await.unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert_eq!(own.reaction.unwrap().user_id, ada_id);
}

#[tokio::test]
async fn test_reaction_on_unknown_message() {
    let (server, (ada_token, _), _) = server_with_pair().await;

    let response = server
        .post_auth("/api/messages/987654321/react", &ada_token, &reaction_body("🔥"))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(code, "UNKNOWN_MESSAGE");
}
