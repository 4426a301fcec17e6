//! Presence registration and relay through the owning task.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use axum::extract::ws::Message;
use tokio::sync::mpsc;

use estate_gateway::realtime::{Connection, ConnectionId, PresenceHandle, UserId};

fn connection(presence: &PresenceHandle) -> (Connection, mpsc::Receiver<Message>) {
    let (tx, rx) = mpsc::channel(8);
    (Connection { id: presence.next_connection_id(), tx }, rx)
}

fn text(m: Message) -> String {
    match m {
        Message::Text(s) => s,
        other => panic!("expected text frame, got {other:?}"),
    }
}

#[tokio::test]
async fn last_registration_wins() {
    let presence = PresenceHandle::spawn();
    let (a, mut rx_a) = connection(&presence);
    let (b, mut rx_b) = connection(&presence);
    let b_id = b.id;
    let sender = presence.next_connection_id();

    presence.register(UserId::from("u1"), a);
    presence.register(UserId::from("u1"), b);
    presence.relay(sender, UserId::from("u1"), "m".to_string());

    // lookup is applied after the relay, so delivery has happened
    assert_eq!(presence.lookup(UserId::from("u1")).await, Some(b_id));
    assert_eq!(text(rx_b.try_recv().unwrap()), "m");
    assert!(rx_a.try_recv().is_err());
}

#[tokio::test]
async fn relay_to_unknown_user_delivers_nothing() {
    let presence = PresenceHandle::spawn();
    let (a, mut rx_a) = connection(&presence);
    presence.register(UserId::from("u1"), a);

    presence.relay(ConnectionId(99), UserId::from("u_unknown"), "m".to_string());

    assert_eq!(presence.lookup(UserId::from("u_unknown")).await, None);
    assert!(rx_a.try_recv().is_err());
}

#[tokio::test]
async fn relay_to_own_connection_is_not_echoed() {
    let presence = PresenceHandle::spawn();
    let (a, mut rx_a) = connection(&presence);
    let a_id = a.id;

    presence.register(UserId::from("u1"), a);
    presence.relay(a_id, UserId::from("u1"), "echo".to_string());

    assert_eq!(presence.lookup(UserId::from("u1")).await, Some(a_id));
    assert!(rx_a.try_recv().is_err());
}

#[tokio::test]
async fn register_then_relay_is_ordered() {
    let presence = PresenceHandle::spawn();
    let (a, mut rx_a) = connection(&presence);
    let sender = presence.next_connection_id();

    // registration and relay submitted back to back; relay must see the entry
    presence.register(UserId::from("u1"), a);
    presence.relay(sender, UserId::from("u1"), "first".to_string());

    presence.lookup(UserId::from("u1")).await;
    assert_eq!(text(rx_a.try_recv().unwrap()), "first");
}

#[tokio::test]
async fn closed_recipient_does_not_affect_sender() {
    let presence = PresenceHandle::spawn();
    let (gone, rx_gone) = connection(&presence);
    presence.register(UserId::from("u2"), gone);
    drop(rx_gone);

    presence.relay(ConnectionId(1), UserId::from("u2"), "lost".to_string());

    // no cleanup on disconnect: the stale entry stays until overwritten
    assert!(presence.lookup(UserId::from("u2")).await.is_some());
}

#[tokio::test]
async fn unregister_spares_a_newer_connection() {
    let presence = PresenceHandle::spawn();
    let (old, _rx_old) = connection(&presence);
    let (new, _rx_new) = connection(&presence);
    let (old_id, new_id) = (old.id, new.id);

    presence.register(UserId::from("u1"), old);
    presence.register(UserId::from("u1"), new);
    presence.unregister(UserId::from("u1"), old_id);
    assert_eq!(presence.lookup(UserId::from("u1")).await, Some(new_id));

    presence.unregister(UserId::from("u1"), new_id);
    assert_eq!(presence.lookup(UserId::from("u1")).await, None);
}
