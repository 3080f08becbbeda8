//! End-to-end delivery scenarios
//!
//! Offline recipient, a single live session, and paging through history.

use std::collections::HashMap;

use axum::http::Method;
use pretty_assertions::assert_eq;
use securechat::backend::chat::conversation::Conversation;
use securechat::backend::chat::db::{append, get_page};
use securechat::backend::chat::delivery::notify_new_message;
use securechat::backend::chat::unseen::count_unseen;
use securechat::backend::realtime::SessionId;
use securechat::shared::messaging::ConversationKind;
use securechat::shared::ServerEvent;
use serde_json::json;

use crate::common::*;
use crate::assert_envelope_ok;

#[tokio::test]
async fn test_offline_recipient_gets_nothing_pushed_but_counts_unseen() {
    let pool = create_test_pool().await;
    let alice = create_test_user(&pool, "alice").await;
    let bob = create_test_user(&pool, "bob").await;
    let (_app, state) = test_app(&pool);

    let conversation = Conversation::direct(alice.id(), bob.id());
    let payloads = HashMap::from([
        (alice.id(), "for alice".to_string()),
        (bob.id(), "for bob".to_string()),
    ]);
    let stored = append(&pool, &conversation, alice.id(), &payloads)
        .await
        .unwrap();
    assert_eq!(stored.payloads.len(), 2);

    let report = notify_new_message(&state.fanout, ConversationKind::Direct, &stored).await;
    assert_eq!(report.delivered, 0);
    assert_eq!(report.failed, 0);

    let unseen = count_unseen(&pool, &conversation.id(), bob.id()).await.unwrap();
    assert_eq!(unseen, 1);
}

#[tokio::test]
async fn test_single_session_receives_exactly_one_push() {
    let pool = create_test_pool().await;
    let alice = create_test_user(&pool, "alice").await;
    let bob = create_test_user(&pool, "bob").await;
    let (app, state) = test_app(&pool);

    let session = SessionId::new();
    let mut outbox = state.hub.register(session);
    state.presence.connect(session).await;
    let transition = state.presence.authenticate(session, bob.id()).await;
    assert_eq!(transition.came_online, Some(bob.id()));

    let body = call(
        &app,
        Method::POST,
        &format!("/api/v1/chats/{}", bob.id()),
        Some(&alice.token),
        Some(json!({ "message": "hello bob" })),
    )
    .await;
    let data = assert_envelope_ok!(body);

    let event = outbox.try_recv().expect("bob's session should have one event");
    match event {
        ServerEvent::NewPrivateMsg(view) => {
            assert_eq!(view.id.to_string(), data["message_id"].as_str().unwrap());
            assert_eq!(view.sender_id, alice.id());
            assert_eq!(view.payload, "hello bob");
            assert!(!view.seen);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(outbox.try_recv().is_err());
}

#[tokio::test]
async fn test_pages_continue_newest_first() {
    let pool = create_test_pool().await;
    let alice = create_test_user(&pool, "alice").await;
    let bob = create_test_user(&pool, "bob").await;
    let conversation = Conversation::direct(alice.id(), bob.id());

    let mut sent = Vec::new();
    for n in 0..15 {
        let text = format!("message {n}");
        let payloads = HashMap::from([(alice.id(), text.clone()), (bob.id(), text)]);
        let stored = append(&pool, &conversation, alice.id(), &payloads)
            .await
            .unwrap();
        sent.push(stored.id);
    }
    sent.reverse();

    let id = conversation.id();
    let page_one = get_page(&pool, &id, bob.id(), 1, 10).await.unwrap();
    let page_two = get_page(&pool, &id, bob.id(), 2, 10).await.unwrap();
    let page_three = get_page(&pool, &id, bob.id(), 3, 10).await.unwrap();

    assert_eq!(page_one.len(), 10);
    assert_eq!(page_two.len(), 5);
    assert!(page_three.is_empty());

    let ids: Vec<_> = page_one.iter().chain(&page_two).map(|m| m.id).collect();
    assert_eq!(ids, sent);
    assert_eq!(page_two[0].payload, "message 4");
}
