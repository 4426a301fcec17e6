//! Realtime runtime for the estate gateway.
//!
//! Presence registry (user id -> live connection) owned by a single task, and
//! the point-to-point relay built on it.

pub mod core;
pub mod types;

pub use self::core::{Delivery, PresenceHandle, PresenceRegistry};
pub use types::{Connection, ConnectionId, UserId};
