//! Profile types: kinds, attribute values, stored records, and the
//! per-conversation active pair.
//!
//! A profile is a named bundle of freeform attributes describing either the
//! assistant persona (chatbot) or the human participant (user). Each kind
//! has one protected default that can never be deleted.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sentinel option shown in profile pickers to signal "not yet created".
pub const NEW_PROFILE_OPTION: &str = "New Profile";

/// The two profile kinds. Closed set -- an invalid kind is unrepresentable
/// past the parse boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    Chatbot,
    User,
}

impl ProfileKind {
    pub const ALL: [ProfileKind; 2] = [ProfileKind::Chatbot, ProfileKind::User];

    /// The protected default profile name for this kind.
    ///
    /// The default is a name, not a seeded row: it is always offered as the
    /// active fallback and can never be deleted, but only exists in storage
    /// once explicitly saved.
    pub fn default_name(&self) -> &'static str {
        match self {
            ProfileKind::Chatbot => "Default",
            ProfileKind::User => "Guest",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileKind::Chatbot => write!(f, "chatbot"),
            ProfileKind::User => write!(f, "user"),
        }
    }
}

impl FromStr for ProfileKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chatbot" => Ok(ProfileKind::Chatbot),
            "user" => Ok(ProfileKind::User),
            other => Err(format!("invalid profile kind: '{other}'")),
        }
    }
}

/// A single profile attribute value.
///
/// Closed union of the shapes user-defined attributes may take. Serializes
/// untagged, so the persisted payload reads as plain JSON
/// (`{"mood":"cheerful","age":27}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<AttrValue>),
    Map(ProfileData),
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

/// Profile attribute map. BTreeMap keeps key order deterministic, so the
/// prompt encoding of a given profile is stable across runs.
pub type ProfileData = BTreeMap<String, AttrValue>;

/// A stored profile row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub kind: ProfileKind,
    /// Unique within the kind; upserts are keyed by this.
    pub name: String,
    pub data: ProfileData,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The currently selected profile for one kind: a name plus (possibly
/// unsaved) attribute data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveProfile {
    pub name: String,
    pub data: ProfileData,
}

impl ActiveProfile {
    /// The kind's default with empty data.
    pub fn default_for(kind: ProfileKind) -> Self {
        Self {
            name: kind.default_name().to_string(),
            data: ProfileData::new(),
        }
    }
}

/// Explicit per-conversation context: the active chatbot/user pair and the
/// name of the last saved session, threaded through every operation that
/// needs it instead of living in hidden process-wide state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    pub chatbot: ActiveProfile,
    pub user: ActiveProfile,
    /// Session name recorded by the most recent save/load, if any.
    pub current_session: Option<String>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self {
            chatbot: ActiveProfile::default_for(ProfileKind::Chatbot),
            user: ActiveProfile::default_for(ProfileKind::User),
            current_session: None,
        }
    }
}

impl SessionContext {
    pub fn active(&self, kind: ProfileKind) -> &ActiveProfile {
        match kind {
            ProfileKind::Chatbot => &self.chatbot,
            ProfileKind::User => &self.user,
        }
    }

    pub fn active_mut(&mut self, kind: ProfileKind) -> &mut ActiveProfile {
        match kind {
            ProfileKind::Chatbot => &mut self.chatbot,
            ProfileKind::User => &mut self.user,
        }
    }

    /// Overwrite the active entry for a kind, bypassing persistence.
    /// Used to stage unsaved edits before an explicit save.
    pub fn set_active(&mut self, kind: ProfileKind, name: String, data: ProfileData) {
        *self.active_mut(kind) = ActiveProfile { name, data };
    }

    /// Reset the active entry for a kind to its default with empty data.
    pub fn reset(&mut self, kind: ProfileKind) {
        *self.active_mut(kind) = ActiveProfile::default_for(kind);
    }
}
