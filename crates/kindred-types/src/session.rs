//! Session and transcript types.
//!
//! A transcript is the ordered list of turns for the current, not-yet-saved
//! conversation. A session is a persisted transcript tied to the pair of
//! profile names (and their data snapshots) active when it was saved.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profile::ProfileData;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for TurnRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(TurnRole::User),
            "assistant" => Ok(TurnRole::Assistant),
            other => Err(format!("invalid turn role: '{other}'")),
        }
    }
}

/// A single conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }

    /// Render the turn as a prompt line.
    pub fn render(&self) -> String {
        match self.role {
            TurnRole::User => format!("User : {}", self.content),
            TurnRole::Assistant => format!("Chatbot: {}", self.content),
        }
    }
}

/// Session listing entry: identity plus the profile names snapshotted at
/// save time. Ordered most-recently-updated first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub session_name: String,
    pub chatbot_name: String,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A full session row: names, profile data snapshots, and messages.
///
/// The data snapshots capture the active pair exactly as it was at save
/// time, so loading a session reproduces the persona it was recorded with
/// even if the named profiles changed since.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub session_name: String,
    pub chatbot_name: String,
    pub user_name: String,
    pub chatbot_data: ProfileData,
    pub user_data: ProfileData,
    pub messages: Vec<Turn>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for a session upsert, keyed by `session_name`.
///
/// The profile ids are the rows resolved from the active names at save
/// time; the name/data fields are the snapshots written alongside them.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub session_name: String,
    pub chatbot_profile_id: Uuid,
    pub user_profile_id: Uuid,
    pub chatbot_name: String,
    pub user_name: String,
    pub chatbot_data: ProfileData,
    pub user_data: ProfileData,
    pub messages: Vec<Turn>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_role_roundtrip() {
        for role in [TurnRole::User, TurnRole::Assistant] {
            let s = role.to_string();
            let parsed: TurnRole = s.parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_turn_render() {
        assert_eq!(Turn::user("hi").render(), "User : hi");
        assert_eq!(Turn::assistant("hello!").render(), "Chatbot: hello!");
    }

    #[test]
    fn test_turn_serde() {
        let turn = Turn::user("hi");
        let json = serde_json::to_string(&turn).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);
        let parsed: Turn = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, turn);
    }

    #[test]
    fn test_messages_json_array() {
        let messages = vec![Turn::user("hi"), Turn::assistant("hello!")];
        let json = serde_json::to_string(&messages).unwrap();
        let parsed: Vec<Turn> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, messages);
    }
}
