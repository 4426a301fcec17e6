//! Decode-once codec for the transport layer.
//!
//! - Text frames => `ClientEvent` (lazy `RawValue` for data)
//! - Binary frames are rejected; the event protocol is text only
//! - Ping/Pong/Close are surfaced for lifecycle management

use axum::extract::ws::Message;
use estate_core::{
    error::{EstateError, Result},
    protocol::event::{decode_client_event, ClientEvent},
};

#[derive(Debug)]
pub enum Inbound {
    Event(ClientEvent),
    Ping(Vec<u8>),
    Pong,
    Close,
}

pub fn decode(msg: Message, max_frame_bytes: usize) -> Result<Inbound> {
    match msg {
        Message::Text(s) => {
            if s.len() > max_frame_bytes {
                return Err(EstateError::BadRequest(format!(
                    "frame of {} bytes exceeds limit of {max_frame_bytes}",
                    s.len()
                )));
            }
            decode_client_event(&s).map(Inbound::Event)
        }
        Message::Binary(_) => Err(EstateError::BadRequest(
            "binary frames are not supported".into(),
        )),
        Message::Ping(v) => Ok(Inbound::Ping(v)),
        Message::Pong(_) => Ok(Inbound::Pong),
        Message::Close(_) => Ok(Inbound::Close),
    }
}
