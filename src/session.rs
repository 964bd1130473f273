//! Negotiation session entity and its transcript

mod transcript;

pub use transcript::Transcript;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One negotiation: the asking price and when it started and concluded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub price: u64,
    pub start_time: DateTime<Utc>,
    /// Set once, when a bid is accepted
    pub end_time: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(price: u64, start_time: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::new(),
            price,
            start_time,
            end_time: None,
        }
    }

    pub fn is_concluded(&self) -> bool {
        self.end_time.is_some()
    }
}

/// Display identity of whoever sent a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    /// Glyph shown in place of a picture
    pub avatar: String,
    pub avatar_color: String,
}

impl Participant {
    pub fn new(
        name: impl Into<String>,
        avatar: impl Into<String>,
        avatar_color: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            avatar: avatar.into(),
            avatar_color: avatar_color.into(),
        }
    }

    /// The automated counterpart
    pub fn system() -> Self {
        Self::new("system", "", "orange")
    }

    pub fn is_system(&self) -> bool {
        *self == Self::system()
    }
}

/// A transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub session_id: SessionId,
    /// Position in the session transcript
    pub id: usize,
    pub send_time: DateTime<Utc>,
    pub sender: Participant,
    pub text: String,
}
