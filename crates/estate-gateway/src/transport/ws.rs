//! WebSocket handler.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS and assign a connection id
//! - Per-connection receive loop: `addUser` registers presence, `sendMsg`
//!   relays through the presence task
//! - Lifecycle: server ping + idle timeout, pong replies
//! - Malformed frames get an `error` event; the connection stays open

use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, State},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};
use tracing::Instrument;

use estate_core::error::EstateError;
use estate_core::protocol::event::{encode_error, encode_receive_msg, ClientEvent};

use crate::app_state::AppState;
use crate::realtime::{Connection, ConnectionId, UserId};
use crate::transport::codec::{decode, Inbound};

/// Connection lifecycle: unregistered until the first `addUser`, then bound
/// to every user id it has announced.
#[derive(Debug)]
enum ConnState {
    Unregistered,
    Registered(Vec<UserId>),
}

impl ConnState {
    fn bind(&mut self, user: UserId) {
        match self {
            ConnState::Unregistered => *self = ConnState::Registered(vec![user]),
            ConnState::Registered(users) => {
                if !users.contains(&user) {
                    users.push(user);
                }
            }
        }
    }
}

// --------------------
// Entry
// --------------------
pub async fn ws_upgrade(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| async move {
        let conn_id = app.presence().next_connection_id();
        let span = tracing::info_span!("conn", id = %conn_id);
        async move {
            tracing::info!("connection opened");
            run_session(app, conn_id, socket).await;
            tracing::info!("connection closed");
        }
        .instrument(span)
        .await
    })
}

fn send_error(out_tx: &mpsc::Sender<Message>, err: &EstateError) {
    // never block the loop that drains this queue
    let _ = out_tx.try_send(Message::Text(encode_error(err)));
}

// --------------------
// Core session loop
// --------------------
async fn run_session(app: AppState, conn_id: ConnectionId, socket: WebSocket) {
    let gw = &app.cfg().gateway;
    let presence = app.presence().clone();

    // ---- outbound channel (relayed messages land here)
    let (out_tx, mut out_rx) = mpsc::channel::<Message>(gw.outbound_queue);

    // ---- split socket
    let (mut ws_tx, mut ws_rx) = socket.split();

    // ---- timers
    let idle_timeout = Duration::from_millis(gw.idle_timeout_ms);
    let mut ping_tick = tokio::time::interval(Duration::from_millis(gw.ping_interval_ms));
    ping_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut last_activity = Instant::now();

    let mut state = ConnState::Unregistered;

    loop {
        tokio::select! {
            // outbound writer
            maybe_out = out_rx.recv() => {
                let Some(m) = maybe_out else { break; };
                if ws_tx.send(m).await.is_err() {
                    break;
                }
            }

            // inbound reader
            incoming = ws_rx.next() => {
                let Some(incoming) = incoming else { break; };
                let msg = match incoming {
                    Ok(msg) => msg,
                    Err(e) => {
                        tracing::debug!(error = %e, "ws receive failed");
                        break;
                    }
                };
                last_activity = Instant::now();

                match decode(msg, gw.max_frame_bytes) {
                    Ok(Inbound::Event(ClientEvent::AddUser { user_id })) => {
                        let user = UserId::from(user_id);
                        let conn = Connection { id: conn_id, tx: out_tx.clone() };
                        presence.register(user.clone(), conn);
                        state.bind(user);
                    }
                    Ok(Inbound::Event(ClientEvent::SendMsg(msg))) => {
                        match encode_receive_msg(&msg.message) {
                            Ok(frame) => presence.relay(conn_id, UserId::from(msg.to), frame),
                            Err(e) => send_error(&out_tx, &e),
                        }
                    }
                    Ok(Inbound::Ping(payload)) => {
                        let _ = out_tx.try_send(Message::Pong(payload));
                    }
                    Ok(Inbound::Pong) => {}
                    Ok(Inbound::Close) => break,
                    Err(e) => {
                        tracing::debug!(error = %e, "rejected frame");
                        send_error(&out_tx, &e);
                    }
                }
            }

            // ping
            _ = ping_tick.tick() => {
                let _ = out_tx.try_send(Message::Ping(Vec::new()));
            }

            // idle timeout
            _ = tokio::time::sleep_until(last_activity + idle_timeout) => {
                tracing::info!("idle timeout");
                break;
            }
        }
    }

    // Gone. The registry keeps the entry unless eviction is configured; a
    // stale entry only ever drops messages into a closed queue.
    if let ConnState::Registered(users) = state {
        if app.cfg().presence.evict_on_disconnect {
            // entries already taken over by another connection are skipped
            for user in users {
                presence.unregister(user, conn_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_keeps_every_announced_user() {
        let mut state = ConnState::Unregistered;
        state.bind(UserId::from("u1"));
        state.bind(UserId::from("u2"));
        state.bind(UserId::from("u1"));

        match state {
            ConnState::Registered(users) => {
                assert_eq!(users, vec![UserId::from("u1"), UserId::from("u2")]);
            }
            ConnState::Unregistered => panic!("expected registered state"),
        }
    }
}
