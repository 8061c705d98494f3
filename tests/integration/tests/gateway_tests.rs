//! Gateway Integration Tests
//!
//! Run a real gateway over the in-memory state store; no external services
//! are needed.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use integration_tests::{assert_json, assert_status, member, Closed, TestServer};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio_tungstenite::tungstenite;

// ============================================================================
// HTTP
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(body["status"], "ok");
    assert_eq!(body["registry"]["sessions"], 0);
}

#[tokio::test]
async fn test_create_game_requires_token() {
    let server = TestServer::start().await.expect("Failed to start server");

    let url = format!("{}/games", server.base_url());
    let response = server.client.post(&url).send().await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let response = server.post_auth("/games", "not-a-token").await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_created_game_is_readable() {
    let server = TestServer::start().await.expect("Failed to start server");
    let host = member("Host");
    let game_id = server.create_game(&host).await.unwrap();

    let url = format!("{}/games/{game_id}", server.base_url());
    let response = server
        .client
        .get(&url)
        .bearer_auth(server.token(&host))
        .send()
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(body["host_id"], host.member_id.to_string());
    assert_eq!(body["spectators"], json!([]));
    assert_eq!(body["board"]["current_board"].as_array().unwrap().len(), 25);
}

// ============================================================================
// Admission
// ============================================================================

#[tokio::test]
async fn test_upgrade_without_token_is_rejected() {
    let server = TestServer::start().await.expect("Failed to start server");
    let url = format!("ws://{}/gateway", server.addr);

    match tokio_tungstenite::connect_async(url.as_str()).await {
        Err(tungstenite::Error::Http(response)) => assert_eq!(response.status().as_u16(), 401),
        other => panic!("expected HTTP 401, got {:?}", other.map(|_| ())),
    }
}

// ============================================================================
// Sessions
// ============================================================================

#[tokio::test]
async fn test_join_receives_snapshot() {
    let server = TestServer::start().await.expect("Failed to start server");
    let ann = member("Ann");
    let game_id = server.create_game(&ann).await.unwrap();

    let mut client = server.connect(&ann).await.unwrap();
    client.join(game_id).await.unwrap();

    let joined = client.next_of_type("member_joined").await.unwrap();
    assert_eq!(joined["session_id"], game_id.to_string());
    assert_eq!(joined["data"]["name"], "Ann");

    let state = client.snapshot_where(|_| true).await.unwrap();
    assert_eq!(state.spectators.len(), 1);
    assert_eq!(state.spectators[0].id, ann.member_id);
}

#[tokio::test]
async fn test_concurrent_joins_share_session() {
    let server = TestServer::start().await.expect("Failed to start server");
    let (ann, bob) = (member("Ann"), member("Bob"));
    let game_id = server.create_game(&ann).await.unwrap();

    let mut ann_ws = server.connect(&ann).await.unwrap();
    let mut bob_ws = server.connect(&bob).await.unwrap();
    let (a, b) = tokio::join!(ann_ws.join(game_id), bob_ws.join(game_id));
    a.unwrap();
    b.unwrap();

    let (a, b) = tokio::join!(
        ann_ws.snapshot_where(|s| s.spectators.len() == 2),
        bob_ws.snapshot_where(|s| s.spectators.len() == 2)
    );
    a.unwrap();
    b.unwrap();

    server
        .wait_for_health(|h| h["registry"]["sessions"] == 1 && h["registry"]["members"] == 2)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_leave_notifies_remaining_member() {
    let server = TestServer::start().await.expect("Failed to start server");
    let (ann, bob) = (member("Ann"), member("Bob"));
    let game_id = server.create_game(&ann).await.unwrap();

    let mut ann_ws = server.connect(&ann).await.unwrap();
    ann_ws.join(game_id).await.unwrap();
    ann_ws.snapshot_where(|s| s.spectators.len() == 1).await.unwrap();

    let mut bob_ws = server.connect(&bob).await.unwrap();
    bob_ws.join(game_id).await.unwrap();
    bob_ws.snapshot_where(|s| s.spectators.len() == 2).await.unwrap();

    bob_ws.leave().await.unwrap();
    assert_eq!(bob_ws.closed().await.unwrap(), Closed::Code(1000));

    let left = ann_ws.next_of_type("member_left").await.unwrap();
    assert_eq!(left["data"]["id"], bob.member_id.to_string());
    let state = ann_ws.snapshot_where(|_| true).await.unwrap();
    assert_eq!(state.spectators.len(), 1);
    assert_eq!(state.spectators[0].id, ann.member_id);
}

#[tokio::test]
async fn test_last_disconnect_removes_session() {
    let server = TestServer::start().await.expect("Failed to start server");
    let ann = member("Ann");
    let game_id = server.create_game(&ann).await.unwrap();

    let mut ann_ws = server.connect(&ann).await.unwrap();
    ann_ws.join(game_id).await.unwrap();
    ann_ws.snapshot_where(|_| true).await.unwrap();
    server
        .wait_for_health(|h| h["registry"]["sessions"] == 1)
        .await
        .unwrap();

    ann_ws.close().await.unwrap();

    server
        .wait_for_health(|h| h["registry"]["sessions"] == 0)
        .await
        .unwrap();
    assert!(server.state.registry().get(game_id).is_none());

    // The document outlives the session, without the departed member
    let game = server.state.games().fetch(game_id).await.unwrap();
    assert!(game.spectators.is_empty());
}

#[tokio::test]
async fn test_invalid_message_answered_to_sender_only() {
    let server = TestServer::start().await.expect("Failed to start server");
    let (ann, bob) = (member("Ann"), member("Bob"));
    let game_id = server.create_game(&ann).await.unwrap();

    let mut ann_ws = server.connect(&ann).await.unwrap();
    let mut bob_ws = server.connect(&bob).await.unwrap();
    ann_ws.join(game_id).await.unwrap();
    bob_ws.join(game_id).await.unwrap();
    ann_ws.snapshot_where(|s| s.spectators.len() == 2).await.unwrap();
    bob_ws.snapshot_where(|s| s.spectators.len() == 2).await.unwrap();

    bob_ws.send_text("{\"type\": \"shuffle_board\"}").await.unwrap();
    let error = bob_ws.next_of_type("error").await.unwrap();
    assert_eq!(error["data"]["message"], "Invalid message");

    // Bob is still connected and Ann saw nothing of it
    bob_ws.leave().await.unwrap();
    let next = ann_ws.next_json().await.unwrap();
    assert_eq!(next["type"], "member_left");
}

#[tokio::test]
async fn test_silent_member_is_evicted() {
    let server = TestServer::start_with(&[
        ("LIVENESS_INTERVAL_SECS", "1"),
        ("LIVENESS_TIMEOUT_SECS", "1"),
    ])
    .await
    .expect("Failed to start server");
    let (ann, bob) = (member("Ann"), member("Bob"));
    let game_id = server.create_game(&ann).await.unwrap();

    let mut ann_ws = server.connect(&ann).await.unwrap();
    ann_ws.join(game_id).await.unwrap();
    ann_ws.snapshot_where(|_| true).await.unwrap();

    // Bob joins, then never reads again, so his pings go unanswered
    let mut bob_ws = server.connect(&bob).await.unwrap();
    bob_ws.join(game_id).await.unwrap();
    ann_ws.snapshot_where(|s| s.spectators.len() == 2).await.unwrap();

    let left = ann_ws.next_of_type("member_left").await.unwrap();
    assert_eq!(left["data"]["id"], bob.member_id.to_string());
    let state = ann_ws.snapshot_where(|_| true).await.unwrap();
    assert_eq!(state.spectators.len(), 1);

    drop(bob_ws);
}
