use std::collections::HashMap;

use axum::extract::ws::Message;
use tokio::sync::mpsc::error::TrySendError;

use crate::realtime::types::{Connection, ConnectionId, UserId};

/// Outcome of a relay. Only logged; the sender never sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Enqueued on the recipient's outbound queue.
    Delivered(ConnectionId),
    /// Recipient has no registered connection.
    Offline,
    /// Recipient's queue was full or already closed.
    Dropped(ConnectionId),
    /// Recipient is bound to the sending connection; nothing is echoed back.
    SelfTarget(ConnectionId),
}

/// Presence: user_id -> current connection. Last registration wins.
///
/// Plain single-owner state; `PresenceHandle` serializes access to it.
#[derive(Default)]
pub struct PresenceRegistry {
    online: HashMap<UserId, Connection>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self {
            online: HashMap::new(),
        }
    }

    /// Bind `user` to `conn`, returning the connection it replaces.
    pub fn register(&mut self, user: UserId, conn: Connection) -> Option<Connection> {
        self.online.insert(user, conn)
    }

    /// Remove `user` only if still bound to `conn`.
    pub fn unregister(&mut self, user: &UserId, conn: ConnectionId) -> bool {
        match self.online.get(user) {
            Some(current) if current.id == conn => {
                self.online.remove(user);
                true
            }
            _ => false,
        }
    }

    pub fn lookup(&self, user: &UserId) -> Option<ConnectionId> {
        self.online.get(user).map(|c| c.id)
    }

    pub fn len(&self) -> usize {
        self.online.len()
    }

    pub fn is_empty(&self) -> bool {
        self.online.is_empty()
    }

    /// Best-effort, non-blocking delivery of an encoded frame to `to`.
    /// Never delivers to the sending connection `from`.
    pub fn relay(&self, from: ConnectionId, to: &UserId, frame: String) -> Delivery {
        let Some(conn) = self.online.get(to) else {
            return Delivery::Offline;
        };
        if conn.id == from {
            return Delivery::SelfTarget(from);
        }
        match conn.tx.try_send(Message::Text(frame)) {
            Ok(()) => Delivery::Delivered(conn.id),
            Err(TrySendError::Full(_)) | Err(TrySendError::Closed(_)) => {
                Delivery::Dropped(conn.id)
            }
        }
    }
}
