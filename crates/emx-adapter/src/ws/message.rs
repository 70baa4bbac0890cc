/*
[INPUT]:  Raw WebSocket frames (JSON text)
[OUTPUT]: Parsed WebSocketMessage values
[POS]:    WebSocket layer - message parsing and validation
[UPDATE]: When adding new message types or changing format
*/

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry of a `subscriptions` confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSubscription {
    pub name: String,
    #[serde(default)]
    pub contract_codes: Vec<String>,
}

/// Data pushed on a subscribed channel (level2 snapshots/updates, ticker,
/// trades, order and balance events)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub channel: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    #[serde(default)]
    pub data: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChannelMessage {
    /// Contract code, from the message itself or from its data payload
    pub fn contract_code(&self) -> Option<&str> {
        self.extra
            .get("contract_code")
            .or_else(|| self.data.get("contract_code"))
            .and_then(|value| value.as_str())
    }
}

/// WebSocket message types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WebSocketMessage {
    Subscriptions { channels: Vec<ChannelSubscription> },
    Error { message: String },
    Channel(ChannelMessage),
    Other { raw: String },
    /// The connection task stopped; no further messages will arrive
    Disconnected,
}

impl WebSocketMessage {
    /// Parse one text frame
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(text)?;
        let message_type = value.get("type").and_then(|value| value.as_str());

        match message_type {
            Some("subscriptions") => {
                let channels = match value.get("channels") {
                    Some(channels) => Vec::<ChannelSubscription>::deserialize(channels)?,
                    None => Vec::new(),
                };
                Ok(WebSocketMessage::Subscriptions { channels })
            }
            Some("error") => {
                let message = value
                    .get("message")
                    .or_else(|| value.get("error"))
                    .and_then(|value| value.as_str())
                    .unwrap_or(text)
                    .to_string();
                Ok(WebSocketMessage::Error { message })
            }
            _ if value.get("channel").is_some_and(Value::is_string) => {
                Ok(WebSocketMessage::Channel(serde_json::from_value(value)?))
            }
            _ => Ok(WebSocketMessage::Other {
                raw: text.to_string(),
            }),
        }
    }

    pub fn channel_name(&self) -> &str {
        match self {
            WebSocketMessage::Subscriptions { .. } => "subscriptions",
            WebSocketMessage::Error { .. } => "error",
            WebSocketMessage::Channel(message) => &message.channel,
            WebSocketMessage::Other { .. } => "other",
            WebSocketMessage::Disconnected => "disconnected",
        }
    }
}
