//! estate gateway library entry.
//!
//! Wires the WebSocket transport and the presence registry into the realtime
//! chat relay: clients bind their connection to a user id with `addUser` and
//! send point-to-point messages with `sendMsg`. Consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod realtime;
pub mod router;
pub mod transport;
