use serde::{Deserialize, Serialize};

use super::messages::{ClientMessage, MessageType, ServerMessage};

/// Maximum frame size in bytes.
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    EmptyMessage,
    UnknownMessageType(u8),
    /// A server-bound type arrived where a client-bound one was expected, or vice versa.
    WrongDirection(MessageType),
    PayloadTooLarge(usize),
    SerializeError(String),
    DeserializeError(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "empty message"),
            Self::UnknownMessageType(b) => write!(f, "unknown message type: 0x{b:02x}"),
            Self::WrongDirection(t) => write!(f, "message type {t:?} not valid in this direction"),
            Self::PayloadTooLarge(size) => {
                write!(
                    f,
                    "payload too large: {size} bytes (max {MAX_MESSAGE_SIZE})"
                )
            },
            Self::SerializeError(e) => write!(f, "serialize error: {e}"),
            Self::DeserializeError(e) => write!(f, "deserialize error: {e}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Encode a payload with a 1-byte type prefix. Fields are written by name so
/// that decoders can default the ones a sloppy client leaves out.
pub fn encode_message<T: Serialize>(
    msg_type: MessageType,
    payload: &T,
) -> Result<Vec<u8>, ProtocolError> {
    let payload_bytes = rmp_serde::to_vec_named(payload)
        .map_err(|e| ProtocolError::SerializeError(e.to_string()))?;
    let total = 1 + payload_bytes.len();
    if total > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::PayloadTooLarge(total));
    }
    let mut buf = Vec::with_capacity(total);
    buf.push(msg_type as u8);
    buf.extend_from_slice(&payload_bytes);
    Ok(buf)
}

/// Encode a payload-less signal.
fn encode_signal(msg_type: MessageType) -> Vec<u8> {
    vec![msg_type as u8]
}

pub fn encode_client_message(msg: &ClientMessage) -> Result<Vec<u8>, ProtocolError> {
    match msg {
        ClientMessage::Join(m) => encode_message(MessageType::Join, m),
        ClientMessage::ReadyToggle => Ok(encode_signal(MessageType::ReadyToggle)),
        ClientMessage::Input(m) => encode_message(MessageType::Input, m),
        ClientMessage::Tilt(m) => encode_message(MessageType::Tilt, m),
        ClientMessage::Action(m) => encode_message(MessageType::Action, m),
        ClientMessage::DisplayJoin => Ok(encode_signal(MessageType::DisplayJoin)),
        ClientMessage::StartRound(m) => encode_message(MessageType::StartRound, m),
        ClientMessage::ScoreUpdate(m) => encode_message(MessageType::ScoreUpdate, m),
        ClientMessage::Vibrate(m) => encode_message(MessageType::VibrateRequest, m),
        ClientMessage::EndRound(m) => encode_message(MessageType::EndRound, m),
        ClientMessage::ReturnToLobby => Ok(encode_signal(MessageType::ReturnToLobby)),
    }
}

pub fn encode_server_message(msg: &ServerMessage) -> Result<Vec<u8>, ProtocolError> {
    match msg {
        ServerMessage::Joined(m) => encode_message(MessageType::Joined, m),
        ServerMessage::JoinRejected(m) => encode_message(MessageType::JoinRejected, m),
        ServerMessage::Roster(m) => encode_message(MessageType::Roster, m),
        ServerMessage::SessionState(m) => encode_message(MessageType::SessionState, m),
        ServerMessage::AllReady => Ok(encode_signal(MessageType::AllReady)),
        ServerMessage::PlayerInput(m) => encode_message(MessageType::PlayerInput, m),
        ServerMessage::PlayerTilt(m) => encode_message(MessageType::PlayerTilt, m),
        ServerMessage::PlayerAction(m) => encode_message(MessageType::PlayerAction, m),
        ServerMessage::RoundStarted(m) => encode_message(MessageType::RoundStarted, m),
        ServerMessage::Score(m) => encode_message(MessageType::Score, m),
        ServerMessage::Vibrate(m) => encode_message(MessageType::Vibrate, m),
        ServerMessage::RoundEnded(m) => encode_message(MessageType::RoundEnded, m),
        ServerMessage::ReturnedToLobby => Ok(encode_signal(MessageType::ReturnedToLobby)),
    }
}

/// Extract the message type byte from raw wire data.
pub fn decode_message_type(data: &[u8]) -> Result<MessageType, ProtocolError> {
    let Some(&first) = data.first() else {
        return Err(ProtocolError::EmptyMessage);
    };
    MessageType::from_byte(first).ok_or(ProtocolError::UnknownMessageType(first))
}

/// Decode the MessagePack payload that follows the type byte.
pub fn decode_payload<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, ProtocolError> {
    if data.is_empty() {
        return Err(ProtocolError::EmptyMessage);
    }
    if data.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::PayloadTooLarge(data.len()));
    }
    rmp_serde::from_slice(&data[1..]).map_err(|e| ProtocolError::DeserializeError(e.to_string()))
}

pub fn decode_client_message(data: &[u8]) -> Result<ClientMessage, ProtocolError> {
    let msg_type = decode_message_type(data)?;
    Ok(match msg_type {
        MessageType::Join => ClientMessage::Join(decode_payload(data)?),
        MessageType::ReadyToggle => ClientMessage::ReadyToggle,
        MessageType::Input => ClientMessage::Input(decode_payload(data)?),
        MessageType::Tilt => ClientMessage::Tilt(decode_payload(data)?),
        MessageType::Action => ClientMessage::Action(decode_payload(data)?),
        MessageType::DisplayJoin => ClientMessage::DisplayJoin,
        MessageType::StartRound => ClientMessage::StartRound(decode_payload(data)?),
        MessageType::ScoreUpdate => ClientMessage::ScoreUpdate(decode_payload(data)?),
        MessageType::VibrateRequest => ClientMessage::Vibrate(decode_payload(data)?),
        MessageType::EndRound => ClientMessage::EndRound(decode_payload(data)?),
        MessageType::ReturnToLobby => ClientMessage::ReturnToLobby,
        other => return Err(ProtocolError::WrongDirection(other)),
    })
}

pub fn decode_server_message(data: &[u8]) -> Result<ServerMessage, ProtocolError> {
    let msg_type = decode_message_type(data)?;
    Ok(match msg_type {
        MessageType::Joined => ServerMessage::Joined(decode_payload(data)?),
        MessageType::JoinRejected => ServerMessage::JoinRejected(decode_payload(data)?),
        MessageType::Roster => ServerMessage::Roster(decode_payload(data)?),
        MessageType::SessionState => ServerMessage::SessionState(decode_payload(data)?),
        MessageType::AllReady => ServerMessage::AllReady,
        MessageType::PlayerInput => ServerMessage::PlayerInput(decode_payload(data)?),
        MessageType::PlayerTilt => ServerMessage::PlayerTilt(decode_payload(data)?),
        MessageType::PlayerAction => ServerMessage::PlayerAction(decode_payload(data)?),
        MessageType::RoundStarted => ServerMessage::RoundStarted(decode_payload(data)?),
        MessageType::Score => ServerMessage::Score(decode_payload(data)?),
        MessageType::Vibrate => ServerMessage::Vibrate(decode_payload(data)?),
        MessageType::RoundEnded => ServerMessage::RoundEnded(decode_payload(data)?),
        MessageType::ReturnedToLobby => ServerMessage::ReturnedToLobby,
        other => return Err(ProtocolError::WrongDirection(other)),
    })
}
