//! Engine.IO v4 / Socket.IO v5 packet codec for the HTTP long-polling transport.
//!
//! A polling payload carries one or more Engine.IO packets separated by the
//! record separator `0x1e`. Each packet starts with a one-digit type; Socket.IO
//! packets travel inside Engine.IO `message` packets (`4`).

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub(crate) const RECORD_SEPARATOR: char = '\u{1e}';
/// Socket.IO CONNECT to the default namespace, wrapped in an Engine.IO message.
pub(crate) const CONNECT_PACKET: &str = "40";
pub(crate) const PONG_PACKET: &str = "3";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("request failed: {0}")]
    Http(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("namespace connection refused: {0}")]
    ConnectRefused(String),
}

/// Session parameters sent by the server in the Engine.IO `open` packet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenInfo {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    #[serde(default = "default_ping_interval")]
    pub ping_interval: u64,
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout: u64,
}

fn default_ping_interval() -> u64 {
    25_000
}

fn default_ping_timeout() -> u64 {
    20_000
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(OpenInfo),
    Close,
    Ping,
    Pong,
    Message(SocketPacket),
    Upgrade,
    Noop,
    /// Base64 binary frame; the progress protocol never sends one.
    Binary,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect(Option<Value>),
    Disconnect,
    Event { name: String, args: Vec<Value> },
    ConnectError(Option<Value>),
    /// Acks and binary variants, which this client never requests.
    Unsupported(u8),
}

/// Splits a polling response body into Engine.IO packets.
pub fn decode_payload(body: &str) -> Result<Vec<EnginePacket>, ChannelError> {
    body.split(RECORD_SEPARATOR)
        .filter(|raw| !raw.is_empty())
        .map(decode_engine_packet)
        .collect()
}

fn decode_engine_packet(raw: &str) -> Result<EnginePacket, ChannelError> {
    let mut chars = raw.chars();
    let kind = chars
        .next()
        .ok_or_else(|| ChannelError::Protocol("empty packet".to_string()))?;
    let rest = chars.as_str();
    match kind {
        '0' => serde_json::from_str(rest)
            .map(EnginePacket::Open)
            .map_err(|err| ChannelError::Protocol(format!("bad open packet: {err}"))),
        '1' => Ok(EnginePacket::Close),
        '2' => Ok(EnginePacket::Ping),
        '3' => Ok(EnginePacket::Pong),
        '4' => decode_socket_packet(rest).map(EnginePacket::Message),
        '5' => Ok(EnginePacket::Upgrade),
        '6' => Ok(EnginePacket::Noop),
        'b' => Ok(EnginePacket::Binary),
        other => Err(ChannelError::Protocol(format!(
            "unknown engine packet type {other:?}"
        ))),
    }
}

fn decode_socket_packet(raw: &str) -> Result<SocketPacket, ChannelError> {
    let mut chars = raw.chars();
    let kind = chars
        .next()
        .and_then(|c| c.to_digit(10))
        .ok_or_else(|| ChannelError::Protocol(format!("bad socket packet {raw:?}")))?
        as u8;
    let body = skip_ack_id(skip_namespace(chars.as_str()));

    match kind {
        0 => Ok(SocketPacket::Connect(optional_json(body)?)),
        1 => Ok(SocketPacket::Disconnect),
        2 => {
            let mut args: Vec<Value> = serde_json::from_str(body)
                .map_err(|err| ChannelError::Protocol(format!("bad event packet: {err}")))?;
            if args.is_empty() {
                return Err(ChannelError::Protocol("event without a name".to_string()));
            }
            let name = match args.remove(0) {
                Value::String(name) => name,
                other => {
                    return Err(ChannelError::Protocol(format!(
                        "event name is not a string: {other}"
                    )))
                }
            };
            Ok(SocketPacket::Event { name, args })
        }
        4 => Ok(SocketPacket::ConnectError(optional_json(body)?)),
        other => Ok(SocketPacket::Unsupported(other)),
    }
}

/// Drops a `/namespace,` prefix if present.
fn skip_namespace(raw: &str) -> &str {
    if raw.starts_with('/') {
        match raw.split_once(',') {
            Some((_, rest)) => rest,
            None => "",
        }
    } else {
        raw
    }
}

fn skip_ack_id(raw: &str) -> &str {
    raw.trim_start_matches(|c: char| c.is_ascii_digit())
}

fn optional_json(body: &str) -> Result<Option<Value>, ChannelError> {
    if body.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(body)
        .map(Some)
        .map_err(|err| ChannelError::Protocol(format!("bad packet data: {err}")))
}
