//! Append-only message log of a session

use super::{Message, Participant, SessionId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct Transcript {
    session_id: SessionId,
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            messages: Vec::new(),
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Append a message. Its id is the transcript length before the append.
    pub fn append(
        &mut self,
        sender: Participant,
        text: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Message {
        debug_assert!(
            self.last().is_none_or(|last| last.send_time <= now),
            "transcript timestamps must not go backwards"
        );
        let message = Message {
            session_id: self.session_id,
            id: self.messages.len(),
            send_time: now,
            sender,
            text: text.into(),
        };
        self.messages.push(message.clone());
        message
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
