//! Realtime wire format.
//!
//! Every socket frame is a JSON text envelope `{"event": ..., "data": ...}`.
//! The envelope keeps `data` as `RawValue` so each event parses only what it
//! needs and relayed payloads are forwarded without re-encoding.

pub mod event;
