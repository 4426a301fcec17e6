//! Outbound frame encoding.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use serde_json::value::RawValue;
use serde_json::Value;

use estate_core::protocol::event::{
    decode_client_event, encode_error, encode_receive_msg, ClientEvent,
};
use estate_core::EstateError;

#[test]
fn receive_msg_forwards_payload_verbatim() {
    let frame = r#"{"event":"sendMsg","data":{"to":"u2",
        "message":{"text":"is the flat still free?","from":"u1"}}}"#;
    let ClientEvent::SendMsg(msg) = decode_client_event(frame).unwrap() else {
        panic!("expected sendMsg");
    };

    let out = encode_receive_msg(&msg.message).unwrap();
    let v: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(v["event"], "receiveMsg");
    assert_eq!(v["data"]["text"], "is the flat still free?");
    assert_eq!(v["data"]["from"], "u1");
}

#[test]
fn receive_msg_with_scalar_payload() {
    let raw = RawValue::from_string("\"hello\"".to_string()).unwrap();
    let out = encode_receive_msg(&raw).unwrap();
    assert_eq!(out, r#"{"event":"receiveMsg","data":"hello"}"#);
}

#[test]
fn error_frame_carries_code_and_msg() {
    let out = encode_error(&EstateError::BadRequest("unknown event: joinRoom".into()));
    let v: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(v["event"], "error");
    assert_eq!(v["data"]["code"], "BAD_REQUEST");
    assert_eq!(v["data"]["msg"], "bad request: unknown event: joinRoom");
}
