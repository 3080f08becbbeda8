//! Direct chat API integration tests
//!
//! Sending, reading, seen state and deletion of direct messages.

use axum::http::Method;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::*;
use crate::{assert_envelope_err, assert_envelope_ok};

#[tokio::test]
async fn test_direct_message_send_read_and_seen() {
    let pool = create_test_pool().await;
    let alice = create_test_user(&pool, "alice").await;
    let bob = create_test_user(&pool, "bob").await;
    let (app, _) = test_app(&pool);

    let body = call(
        &app,
        Method::POST,
        &format!("/api/v1/chats/{}", bob.id()),
        Some(&alice.token),
        Some(json!({
            "messages": {
                alice.id().to_string(): "cipher-for-alice",
                bob.id().to_string(): "cipher-for-bob"
            }
        })),
    )
    .await;
    assert_envelope_ok!(body);

    let body = call(&app, Method::GET, "/api/v1/users/profile", Some(&bob.token), None).await;
    assert_eq!(assert_envelope_ok!(body)["unseen_total"], 1);

    let body = call(&app, Method::GET, "/api/v1/chats", Some(&bob.token), None).await;
    let chats = assert_envelope_ok!(body);
    assert_eq!(chats.as_array().unwrap().len(), 1);
    assert_eq!(chats[0]["kind"], "direct");
    assert_eq!(chats[0]["partner_id"], alice.id().to_string());
    assert_eq!(chats[0]["unseen_count"], 1);
    assert_eq!(chats[0]["latest_message"]["payload"], "cipher-for-bob");

    // First read shows the message unseen, then marks it seen
    let uri = format!("/api/v1/chats/{}", alice.id());
    let page = assert_envelope_ok!(call(&app, Method::GET, &uri, Some(&bob.token), None).await);
    assert_eq!(page["messages"][0]["payload"], "cipher-for-bob");
    assert_eq!(page["messages"][0]["seen"], false);

    let page = assert_envelope_ok!(call(&app, Method::GET, &uri, Some(&bob.token), None).await);
    assert_eq!(page["messages"][0]["seen"], true);

    let uri = format!("/api/v1/chats/{}", bob.id());
    let page = assert_envelope_ok!(call(&app, Method::GET, &uri, Some(&alice.token), None).await);
    assert_eq!(page["messages"][0]["payload"], "cipher-for-alice");
    assert_eq!(page["messages"][0]["seen"], true);
}

#[tokio::test]
async fn test_direct_message_must_cover_both_participants() {
    let pool = create_test_pool().await;
    let alice = create_test_user(&pool, "alice").await;
    let bob = create_test_user(&pool, "bob").await;
    let (app, _) = test_app(&pool);

    let body = call(
        &app,
        Method::POST,
        &format!("/api/v1/chats/{}", bob.id()),
        Some(&alice.token),
        Some(json!({ "messages": { bob.id().to_string(): "only bob" } })),
    )
    .await;
    assert_envelope_err!(body, 400);

    let chats = assert_envelope_ok!(call(&app, Method::GET, "/api/v1/chats", Some(&alice.token), None).await);
    assert!(chats.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_and_unknown_ids() {
    let pool = create_test_pool().await;
    let alice = create_test_user(&pool, "alice").await;
    let (app, _) = test_app(&pool);

    let body = call(
        &app,
        Method::POST,
        "/api/v1/chats/not-a-user",
        Some(&alice.token),
        Some(json!({ "message": "hi" })),
    )
    .await;
    assert_envelope_err!(body, 400);

    let body = call(
        &app,
        Method::POST,
        &format!("/api/v1/chats/{}", uuid::Uuid::new_v4()),
        Some(&alice.token),
        Some(json!({ "message": "hi" })),
    )
    .await;
    assert_envelope_err!(body, 404);
}

#[tokio::test]
async fn test_delete_message_sender_or_admin_only() {
    let pool = create_test_pool().await;
    let alice = create_test_user(&pool, "alice").await;
    let bob = create_test_user(&pool, "bob").await;
    let admin = create_test_admin(&pool, "root").await;
    let (app, _) = test_app(&pool);

    let mut ids = Vec::new();
    for text in ["one", "two"] {
        let body = call(
            &app,
            Method::POST,
            &format!("/api/v1/chats/{}", bob.id()),
            Some(&alice.token),
            Some(json!({ "message": text })),
        )
        .await;
        ids.push(assert_envelope_ok!(body)["message_id"].as_str().unwrap().to_string());
    }

    let body = call(&app, Method::DELETE, &format!("/api/v1/chats/{}", ids[0]), Some(&bob.token), None).await;
    assert_envelope_err!(body, 403);

    let body = call(&app, Method::DELETE, &format!("/api/v1/chats/{}", ids[0]), Some(&alice.token), None).await;
    assert_envelope_ok!(body);
    let body = call(&app, Method::DELETE, &format!("/api/v1/chats/{}", ids[1]), Some(&admin.token), None).await;
    assert_envelope_ok!(body);

    let body = call(&app, Method::DELETE, &format!("/api/v1/chats/{}", ids[1]), Some(&alice.token), None).await;
    assert_envelope_err!(body, 404);
}
