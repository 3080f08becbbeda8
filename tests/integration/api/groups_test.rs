//! Group management and group chat integration tests

use axum::http::Method;
use pretty_assertions::assert_eq;
use securechat::backend::realtime::SessionId;
use securechat::shared::ServerEvent;
use serde_json::{json, Value};

use crate::common::*;
use crate::{assert_envelope_err, assert_envelope_ok};

async fn create_group(app: &axum::Router, owner: &TestUser, name: &str, members: &[&TestUser]) -> Value {
    let users_id: Vec<String> = members.iter().map(|m| m.id().to_string()).collect();
    let body = call(
        app,
        Method::POST,
        "/api/v1/groups",
        Some(&owner.token),
        Some(json!({ "name": name, "users_id": users_id })),
    )
    .await;
    assert_envelope_ok!(body)
}

#[tokio::test]
async fn test_create_group_includes_creator_and_reuses_member_set() {
    let pool = create_test_pool().await;
    let alice = create_test_user(&pool, "alice").await;
    let bob = create_test_user(&pool, "bob").await;
    let carol = create_test_user(&pool, "carol").await;
    let (app, _) = test_app(&pool);

    let group = create_group(&app, &alice, "Team", &[&bob, &carol]).await;
    let members: Vec<&str> = group["members"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["username"].as_str().unwrap())
        .collect();
    assert_eq!(members.len(), 3);
    assert!(members.contains(&"alice"));

    // Same member set from another creator resolves to the same group
    let again = create_group(&app, &bob, "Other name", &[&alice, &carol]).await;
    assert_eq!(again["id"], group["id"]);

    let listed = assert_envelope_ok!(call(&app, Method::GET, "/api/v1/groups", Some(&carol.token), None).await);
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_group_message_fans_out_per_member_payload() {
    let pool = create_test_pool().await;
    let alice = create_test_user(&pool, "alice").await;
    let bob = create_test_user(&pool, "bob").await;
    let carol = create_test_user(&pool, "carol").await;
    let (app, state) = test_app(&pool);
    let group = create_group(&app, &alice, "Team", &[&bob, &carol]).await;
    let group_id = group["id"].as_str().unwrap().to_string();

    let session = SessionId::new();
    let mut outbox = state.hub.register(session);
    state.presence.connect(session).await;
    state.presence.authenticate(session, carol.id()).await;

    let body = call(
        &app,
        Method::POST,
        &format!("/api/v1/group_chats/{group_id}"),
        Some(&alice.token),
        Some(json!({
            "messages": {
                alice.id().to_string(): "for-alice",
                bob.id().to_string(): "for-bob",
                carol.id().to_string(): "for-carol"
            }
        })),
    )
    .await;
    assert_envelope_ok!(body);

    match outbox.try_recv().unwrap() {
        ServerEvent::NewGroupMsg(view) => assert_eq!(view.payload, "for-carol"),
        other => panic!("unexpected event {other:?}"),
    }
    assert!(outbox.try_recv().is_err());

    let uri = format!("/api/v1/group_chats/{group_id}");
    let page = assert_envelope_ok!(call(&app, Method::GET, &uri, Some(&bob.token), None).await);
    assert_eq!(page["messages"][0]["payload"], "for-bob");

    let online = assert_envelope_ok!(
        call(&app, Method::GET, &format!("{uri}/online"), Some(&bob.token), None).await
    );
    assert_eq!(online["online"], true);
    let online = assert_envelope_ok!(
        call(&app, Method::GET, &format!("{uri}/online"), Some(&carol.token), None).await
    );
    assert_eq!(online["online"], false);
}

#[tokio::test]
async fn test_non_members_cannot_touch_a_group() {
    let pool = create_test_pool().await;
    let alice = create_test_user(&pool, "alice").await;
    let bob = create_test_user(&pool, "bob").await;
    let mallory = create_test_user(&pool, "mallory").await;
    let (app, _) = test_app(&pool);
    let group = create_group(&app, &alice, "Pair", &[&bob]).await;
    let group_id = group["id"].as_str().unwrap().to_string();

    let body = call(
        &app,
        Method::POST,
        &format!("/api/v1/group_chats/{group_id}"),
        Some(&mallory.token),
        Some(json!({ "message": "let me in" })),
    )
    .await;
    assert_envelope_err!(body, 403);

    let body = call(&app, Method::DELETE, &format!("/api/v1/groups/{group_id}"), Some(&mallory.token), None).await;
    assert_envelope_err!(body, 403);

    let body = call(&app, Method::GET, &format!("/api/v1/groups/{}", uuid::Uuid::new_v4()), Some(&alice.token), None).await;
    assert_envelope_err!(body, 404);
}

#[tokio::test]
async fn test_membership_changes_rename_and_delete() {
    let pool = create_test_pool().await;
    let alice = create_test_user(&pool, "alice").await;
    let bob = create_test_user(&pool, "bob").await;
    let carol = create_test_user(&pool, "carol").await;
    let (app, state) = test_app(&pool);
    let group = create_group(&app, &alice, "Team", &[&bob]).await;
    let group_id = group["id"].as_str().unwrap().to_string();
    let members_uri = format!("/api/v1/groups/{group_id}/members");

    let session = SessionId::new();
    let mut outbox = state.hub.register(session);
    state.presence.connect(session).await;
    state.presence.authenticate(session, bob.id()).await;

    let body = call(
        &app,
        Method::PUT,
        &members_uri,
        Some(&alice.token),
        Some(json!({ "user_id": carol.id(), "action": "add" })),
    )
    .await;
    assert_eq!(assert_envelope_ok!(body)["members"].as_array().unwrap().len(), 3);
    assert_eq!(
        outbox.try_recv().unwrap(),
        ServerEvent::Join {
            username: "carol".to_string(),
            room: "Team".to_string()
        }
    );

    let body = call(
        &app,
        Method::PUT,
        &members_uri,
        Some(&alice.token),
        Some(json!({ "user_id": bob.id(), "action": "remove" })),
    )
    .await;
    assert_eq!(assert_envelope_ok!(body)["members"].as_array().unwrap().len(), 2);
    assert_eq!(
        outbox.try_recv().unwrap(),
        ServerEvent::Leave {
            username: "bob".to_string(),
            room: "Team".to_string()
        }
    );

    let body = call(
        &app,
        Method::PUT,
        &format!("/api/v1/groups/{group_id}"),
        Some(&carol.token),
        Some(json!({ "name": "Renamed" })),
    )
    .await;
    assert_eq!(assert_envelope_ok!(body)["name"], "Renamed");

    let body = call(&app, Method::DELETE, &format!("/api/v1/groups/{group_id}"), Some(&carol.token), None).await;
    assert_envelope_ok!(body);
    let body = call(&app, Method::GET, &format!("/api/v1/groups/{group_id}"), Some(&alice.token), None).await;
    assert_envelope_err!(body, 404);
}
