//! Effects produced by phase transitions

use crate::session::Participant;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Effects to be executed after a transition, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Counterpart appends a line to the transcript; surfaced as a message action
    Say { text: String },

    /// Participant's bid goes into the transcript (no action)
    RecordBid { sender: Participant, text: String },

    /// Replace the asking price
    SetPrice { price: u64 },

    /// Stamp the session end time
    Conclude,

    /// Schedule a `BidTimerElapsed` event, replacing any pending one
    ArmBidTimer { delay: Duration },

    /// Surface an input wait with an absolute deadline
    AwaitInput { deadline: DateTime<Utc> },

    /// Surface the end of the negotiation
    SignalEnd,
}

impl Effect {
    pub fn say(text: impl Into<String>) -> Self {
        Effect::Say { text: text.into() }
    }

    /// Whether executing this effect yields an outward action
    pub fn produces_action(&self) -> bool {
        matches!(
            self,
            Effect::Say { .. } | Effect::AwaitInput { .. } | Effect::SignalEnd
        )
    }
}
