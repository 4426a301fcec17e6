//! Event envelope (JSON text frames).

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::value::RawValue;

use crate::error::{EstateError, Result};

/// client -> server: bind this connection to a user id.
pub const EVENT_ADD_USER: &str = "addUser";
/// client -> server: relay a message to another user.
pub const EVENT_SEND_MSG: &str = "sendMsg";
/// server -> client: a relayed message.
pub const EVENT_RECEIVE_MSG: &str = "receiveMsg";
/// server -> client: the previous frame was rejected.
pub const EVENT_ERROR: &str = "error";

/// Inbound envelope (Text frame).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Envelope {
    /// Event name (e.g., "sendMsg").
    pub event: String,
    /// Optional payload, stored as raw JSON (lazy parsing).
    #[serde(default)]
    pub data: Option<Box<RawValue>>,
}

/// `sendMsg` payload. Extra fields are tolerated and ignored.
#[derive(Debug, Deserialize)]
pub struct SendMsg {
    /// Recipient user id.
    pub to: String,
    /// Opaque payload delivered verbatim to the recipient.
    pub message: Box<RawValue>,
}

/// Decoded client event.
#[derive(Debug)]
pub enum ClientEvent {
    AddUser { user_id: String },
    SendMsg(SendMsg),
}

impl ClientEvent {
    /// Parse the event-specific payload of an envelope.
    pub fn from_envelope(env: Envelope) -> Result<Self> {
        let Envelope { event, data } = env;
        let raw = data.ok_or_else(|| EstateError::BadRequest(format!("{event} requires data")))?;

        match event.as_str() {
            EVENT_ADD_USER => {
                let user_id: String = serde_json::from_str(raw.get())
                    .map_err(|e| EstateError::BadRequest(format!("addUser invalid data: {e}")))?;
                if user_id.is_empty() {
                    return Err(EstateError::BadRequest(
                        "addUser requires a non-empty user id".into(),
                    ));
                }
                Ok(ClientEvent::AddUser { user_id })
            }
            EVENT_SEND_MSG => {
                let msg: SendMsg = serde_json::from_str(raw.get())
                    .map_err(|e| EstateError::BadRequest(format!("sendMsg invalid data: {e}")))?;
                Ok(ClientEvent::SendMsg(msg))
            }
            other => Err(EstateError::BadRequest(format!("unknown event: {other}"))),
        }
    }
}

/// Decode a text frame into a client event.
pub fn decode_client_event(text: &str) -> Result<ClientEvent> {
    let env: Envelope = serde_json::from_str(text)
        .map_err(|e| EstateError::BadRequest(format!("invalid envelope json: {e}")))?;
    ClientEvent::from_envelope(env)
}

#[derive(Serialize)]
struct OutEnvelope<'a> {
    event: &'a str,
    data: &'a RawValue,
}

/// Encode a `receiveMsg` frame carrying `message` verbatim.
pub fn encode_receive_msg(message: &RawValue) -> Result<String> {
    serde_json::to_string(&OutEnvelope {
        event: EVENT_RECEIVE_MSG,
        data: message,
    })
    .map_err(|e| EstateError::Internal(format!("json encode failed: {e}")))
}

/// Encode an `error` frame for a rejected inbound frame.
pub fn encode_error(err: &EstateError) -> String {
    json!({
        "event": EVENT_ERROR,
        "data": {
            "code": err.client_code().as_str(),
            "msg": err.to_string()
        }
    })
    .to_string()
}
