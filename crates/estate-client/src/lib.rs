//! estate client: the single request facade used by every frontend caller.
//!
//! Attaches the stored access token to each request, and when the backend
//! answers `401 {"msg": "Access Token is not valid"}` it refreshes the token
//! once for the stored actor kind and replays the request. A failed refresh
//! terminates the session and surfaces the original failure.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod session;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use request::{ApiRequest, ApiResponse, Attempt};
pub use session::{AuthStatus, FileSessionStore, MemorySessionStore, SessionManager, SessionStore};
