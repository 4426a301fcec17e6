//! estate core: contracts shared by the HTTP client and the realtime gateway.
//!
//! This crate defines the auth/session records, the HTTP error body shape and
//! the realtime event envelope. It carries no transport or runtime
//! dependencies so both sides of the wire can depend on it.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. All fallible paths
//! surface as `EstateError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod auth;
pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{Result, EstateError};
