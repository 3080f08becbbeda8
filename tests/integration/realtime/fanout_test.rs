//! Presence and fanout integration tests
//!
//! Sessions are registered on the hub directly, the way the socket handler
//! does after an upgrade.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use securechat::backend::realtime::socket::announce;
use securechat::backend::realtime::{FanoutRouter, PresenceRegistry, SessionId, SocketHub};
use securechat::shared::ServerEvent;
use uuid::Uuid;

fn router(buffer: usize) -> (PresenceRegistry, SocketHub, FanoutRouter) {
    let presence = PresenceRegistry::new();
    let hub = SocketHub::new(buffer);
    let fanout = FanoutRouter::new(presence.clone(), Arc::new(hub.clone()));
    (presence, hub, fanout)
}

#[tokio::test]
async fn test_every_session_of_a_user_gets_the_event() {
    let (presence, hub, fanout) = router(8);
    let user = Uuid::new_v4();
    let (phone, laptop) = (SessionId::new(), SessionId::new());
    let mut phone_rx = hub.register(phone);
    let mut laptop_rx = hub.register(laptop);
    for session in [phone, laptop] {
        presence.connect(session).await;
        presence.authenticate(session, user).await;
    }

    let event = ServerEvent::Online { user_id: Uuid::new_v4() };
    let report = fanout.route(&event, &[user, user]).await;

    assert_eq!(report.delivered, 2);
    assert_eq!(phone_rx.try_recv().unwrap(), event);
    assert_eq!(laptop_rx.try_recv().unwrap(), event);
}

#[tokio::test]
async fn test_presence_edges_are_broadcast_once() {
    let (presence, hub, fanout) = router(8);
    let watcher_session = SessionId::new();
    let mut watcher = hub.register(watcher_session);
    presence.connect(watcher_session).await;
    presence.authenticate(watcher_session, Uuid::new_v4()).await;

    let user = Uuid::new_v4();
    let (first, second) = (SessionId::new(), SessionId::new());
    let _first_rx = hub.register(first);
    let _second_rx = hub.register(second);
    presence.connect(first).await;
    presence.connect(second).await;

    announce(&fanout, presence.authenticate(first, user).await).await;
    announce(&fanout, presence.authenticate(second, user).await).await;
    assert_eq!(watcher.try_recv().unwrap(), ServerEvent::Online { user_id: user });
    assert!(watcher.try_recv().is_err());

    hub.unregister(first);
    announce(&fanout, presence.disconnect(first).await).await;
    assert!(watcher.try_recv().is_err());

    hub.unregister(second);
    announce(&fanout, presence.disconnect(second).await).await;
    assert_eq!(watcher.try_recv().unwrap(), ServerEvent::Offline { user_id: user });
    assert!(!presence.is_online(user).await);
}

#[tokio::test]
async fn test_full_outbox_is_counted_not_awaited() {
    let (presence, hub, fanout) = router(1);
    let user = Uuid::new_v4();
    let session = SessionId::new();
    let mut rx = hub.register(session);
    presence.connect(session).await;
    presence.authenticate(session, user).await;

    let event = ServerEvent::Offline { user_id: Uuid::new_v4() };
    let first = fanout.route(&event, &[user]).await;
    let second = fanout.route(&event, &[user]).await;

    assert_eq!(first.delivered, 1);
    assert_eq!(second.failed, 1);
    assert_eq!(rx.try_recv().unwrap(), event);
    assert!(rx.try_recv().is_err());
}
