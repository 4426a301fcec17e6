//! Shared application state for the estate gateway.
//!
//! Owns the config and the handle to the presence task. Every connection
//! handler receives it through axum state; there is no process-global map.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::realtime::PresenceHandle;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    presence: PresenceHandle,
}

impl AppState {
    /// Build application state and spawn the presence task.
    /// Must be called inside a tokio runtime.
    pub fn new(cfg: GatewayConfig) -> Self {
        Self::with_presence(cfg, PresenceHandle::spawn())
    }

    pub fn with_presence(cfg: GatewayConfig, presence: PresenceHandle) -> Self {
        Self {
            inner: Arc::new(AppStateInner { cfg, presence }),
        }
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn presence(&self) -> &PresenceHandle {
        &self.inner.presence
    }
}
