//! Top-level facade crate for estate.
//!
//! Re-exports the shared contracts, the HTTP client and the realtime gateway
//! so users can depend on a single crate.

pub mod core {
    pub use estate_core::*;
}

pub mod client {
    pub use estate_client::*;
}

pub mod gateway {
    pub use estate_gateway::*;
}
