use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use super::presence::{Delivery, PresenceRegistry};
use crate::realtime::types::{Connection, ConnectionId, UserId};

enum PresenceCmd {
    Register { user: UserId, conn: Connection },
    Relay { from: ConnectionId, to: UserId, frame: String },
    Unregister { user: UserId, conn: ConnectionId },
    Lookup { user: UserId, reply: oneshot::Sender<Option<ConnectionId>> },
}

/// Cloneable handle to the task that owns the `PresenceRegistry`.
///
/// Commands are applied one at a time in arrival order, so a relay never
/// observes a registration half-done. Commands from one connection keep their
/// order. `register`, `relay` and `unregister` never suspend.
#[derive(Clone)]
pub struct PresenceHandle {
    tx: mpsc::UnboundedSender<PresenceCmd>,
    next_conn: Arc<AtomicU64>,
}

impl PresenceHandle {
    /// Spawn the owning task on the current runtime.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(PresenceRegistry::new(), rx));
        Self {
            tx,
            next_conn: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn next_connection_id(&self) -> ConnectionId {
        ConnectionId(self.next_conn.fetch_add(1, Ordering::Relaxed))
    }

    pub fn register(&self, user: UserId, conn: Connection) {
        self.submit(PresenceCmd::Register { user, conn });
    }

    /// Fire-and-forget: the caller learns nothing about delivery.
    pub fn relay(&self, from: ConnectionId, to: UserId, frame: String) {
        self.submit(PresenceCmd::Relay { from, to, frame });
    }

    pub fn unregister(&self, user: UserId, conn: ConnectionId) {
        self.submit(PresenceCmd::Unregister { user, conn });
    }

    /// Current connection for `user`. Also a barrier: resolves after every
    /// command submitted before it has been applied.
    pub async fn lookup(&self, user: UserId) -> Option<ConnectionId> {
        let (reply, rx) = oneshot::channel();
        self.submit(PresenceCmd::Lookup { user, reply });
        rx.await.ok().flatten()
    }

    fn submit(&self, cmd: PresenceCmd) {
        if self.tx.send(cmd).is_err() {
            tracing::warn!("presence task is gone; command discarded");
        }
    }
}

async fn run(mut registry: PresenceRegistry, mut rx: mpsc::UnboundedReceiver<PresenceCmd>) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            PresenceCmd::Register { user, conn } => {
                let conn_id = conn.id;
                match registry.register(user.clone(), conn) {
                    Some(prev) if prev.id != conn_id => {
                        tracing::info!(
                            user = %user,
                            conn = %conn_id,
                            replaced = %prev.id,
                            "user re-registered"
                        );
                    }
                    _ => tracing::info!(user = %user, conn = %conn_id, "user registered"),
                }
            }
            PresenceCmd::Relay { from, to, frame } => match registry.relay(from, &to, frame) {
                Delivery::Delivered(conn) => {
                    tracing::trace!(from = %from, to = %to, conn = %conn, "message relayed");
                }
                Delivery::Offline => {
                    tracing::debug!(from = %from, to = %to, "recipient offline; message dropped");
                }
                Delivery::Dropped(conn) => {
                    tracing::debug!(
                        from = %from,
                        to = %to,
                        conn = %conn,
                        "recipient queue unavailable; message dropped"
                    );
                }
                Delivery::SelfTarget(conn) => {
                    tracing::debug!(to = %to, conn = %conn, "recipient is the sender; not echoed");
                }
            },
            PresenceCmd::Unregister { user, conn } => {
                if registry.unregister(&user, conn) {
                    tracing::info!(user = %user, conn = %conn, "user unregistered");
                }
            }
            PresenceCmd::Lookup { user, reply } => {
                let _ = reply.send(registry.lookup(&user));
            }
        }
    }
    tracing::debug!(online = registry.len(), "presence task stopped");
}
