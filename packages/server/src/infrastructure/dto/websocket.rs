//! WebSocket wire envelope.
//!
//! `{type, data, project_id, user_id, username}` in both directions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Identity, Member, Message, MessageKind, Presence};

/// Server-originated message types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    UserJoined,
    UserLeft,
    Error,
    Kicked,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::UserJoined => "user_joined",
            MessageType::UserLeft => "user_left",
            MessageType::Error => "error",
            MessageType::Kicked => "kicked",
        }
    }
}

/// Envelope as it travels over the socket.
///
/// Every field is optional on input; identity fields are overwritten before relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub username: String,
}

/// Member entry inside presence payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_id: String,
    pub username: String,
}

impl From<&Member> for UserInfo {
    fn from(member: &Member) -> Self {
        Self {
            user_id: member.user_id.as_str().to_string(),
            username: member.username.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceData {
    pub message: String,
    pub users_count: usize,
    pub users: Vec<UserInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KickedData {
    pub reason: String,
    pub admin: Option<String>,
}

fn presence_data(text: String, presence: &Presence) -> PresenceData {
    PresenceData {
        message: text,
        users_count: presence.users_count,
        users: presence.users.iter().map(UserInfo::from).collect(),
    }
}

impl Envelope {
    /// Build the wire form of a domain message.
    pub fn from_message(message: &Message) -> Result<Self, serde_json::Error> {
        let username = message
            .identity
            .as_ref()
            .map(|identity| identity.username.as_str())
            .unwrap_or_default();

        let (kind, data) = match &message.kind {
            MessageKind::UserJoined(presence) => (
                MessageType::UserJoined.as_str().to_string(),
                serde_json::to_value(presence_data(
                    format!("{username} joined the room"),
                    presence,
                ))?,
            ),
            MessageKind::UserLeft(presence) => (
                MessageType::UserLeft.as_str().to_string(),
                serde_json::to_value(presence_data(format!("{username} left the room"), presence))?,
            ),
            MessageKind::Error { reason } => {
                (MessageType::Error.as_str().to_string(), Value::String(reason.clone()))
            }
            MessageKind::Kicked { reason, admin } => (
                MessageType::Kicked.as_str().to_string(),
                serde_json::to_value(KickedData {
                    reason: reason.clone(),
                    admin: admin.as_ref().map(|id| id.as_str().to_string()),
                })?,
            ),
            MessageKind::Relay { kind, data } => (kind.clone(), data.clone()),
        };

        let (project_id, user_id, username) = match &message.identity {
            Some(identity) => (
                identity.project_id.as_str().to_string(),
                identity.user_id.as_str().to_string(),
                identity.username.as_str().to_string(),
            ),
            None => Default::default(),
        };

        Ok(Self {
            kind,
            data,
            project_id,
            user_id,
            username,
        })
    }
}

/// Serialize a domain message to its wire text.
pub fn encode(message: &Message) -> Result<String, serde_json::Error> {
    serde_json::to_string(&Envelope::from_message(message)?)
}

/// Parse one inbound frame and stamp it with the sender's identity.
///
/// Newlines are folded into spaces and surrounding whitespace is trimmed first.
/// Whatever identity the client wrote into the envelope is discarded.
pub fn decode_inbound(payload: &[u8], author: &Identity) -> Result<Message, serde_json::Error> {
    let normalized: Vec<u8> = payload
        .iter()
        .map(|&b| if b == b'\n' { b' ' } else { b })
        .collect();
    let envelope: Envelope = serde_json::from_slice(normalized.trim_ascii())?;
    Ok(Message::relay(envelope.kind, envelope.data, author.clone()))
}
