//! Negotiation phases and the snapshot a transition is evaluated against

use crate::config::NegotiationConfig;
use crate::session::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How far the scripted negotiation has progressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Session created, nothing said yet
    #[default]
    Started,
    Greeted,
    /// Price quoted, wait not yet armed
    PriceSent,
    AwaitingBid,
    /// A bid was recorded and has to be judged
    Evaluating,
    /// Deal closed
    Ended,
}

impl Phase {
    /// Number of phases; bounds the fast-forward loop
    pub const COUNT: usize = 6;

    /// Whether progress depends on the participant or the clock
    pub fn awaits_input(self) -> bool {
        matches!(self, Phase::AwaitingBid)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Started => "started",
            Phase::Greeted => "greeted",
            Phase::PriceSent => "price_sent",
            Phase::AwaitingBid => "awaiting_bid",
            Phase::Evaluating => "evaluating",
            Phase::Ended => "ended",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a transition may look at, captured by the runtime before the step
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub now: DateTime<Utc>,
    /// Current asking price
    pub price: u64,
    pub started_at: DateTime<Utc>,
    /// Most recent transcript entry, if any
    pub last_message: Option<&'a Message>,
    pub config: &'a NegotiationConfig,
}

impl StepContext<'_> {
    /// When the wait for a bid started: the last message, or session start
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_message
            .map_or(self.started_at, |message| message.send_time)
    }
}
