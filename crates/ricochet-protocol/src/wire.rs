//! Encoding of protocol messages.
//!
//! MessagePack is the transport encoding; JSON is offered for tooling and debugging clients and
//! carries the contractual event names in its `type` field.

use rmp_serde::{decode, encode};
use thiserror::Error;

use crate::{ClientMessage, ServerMessage, SessionState};

#[derive(Debug, Error)]
pub enum WireError {
    #[error("encode error: {0}")]
    Encode(#[from] encode::Error),
    #[error("decode error: {0}")]
    Decode(#[from] decode::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn serialize_client_message(msg: &ClientMessage) -> Result<Vec<u8>, WireError> {
    Ok(encode::to_vec(msg)?)
}

pub fn deserialize_client_message(bytes: &[u8]) -> Result<ClientMessage, WireError> {
    Ok(decode::from_slice(bytes)?)
}

pub fn serialize_server_message(msg: &ServerMessage) -> Result<Vec<u8>, WireError> {
    Ok(encode::to_vec(msg)?)
}

pub fn deserialize_server_message(bytes: &[u8]) -> Result<ServerMessage, WireError> {
    Ok(decode::from_slice(bytes)?)
}

pub fn serialize_state(state: &SessionState) -> Result<Vec<u8>, WireError> {
    Ok(encode::to_vec(state)?)
}

pub fn deserialize_state(bytes: &[u8]) -> Result<SessionState, WireError> {
    Ok(decode::from_slice(bytes)?)
}

pub fn client_message_to_json(msg: &ClientMessage) -> Result<String, WireError> {
    Ok(serde_json::to_string(msg)?)
}

pub fn client_message_from_json(json: &str) -> Result<ClientMessage, WireError> {
    Ok(serde_json::from_str(json)?)
}

pub fn server_message_to_json(msg: &ServerMessage) -> Result<String, WireError> {
    Ok(serde_json::to_string(msg)?)
}

pub fn server_message_from_json(json: &str) -> Result<ServerMessage, WireError> {
    Ok(serde_json::from_str(json)?)
}
