//! Presence registry and the task that owns it.

mod presence;
mod registry_task;

pub use presence::{Delivery, PresenceRegistry};
pub use registry_task::PresenceHandle;
