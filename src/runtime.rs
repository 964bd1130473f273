//! Runtime for executing negotiations
//!
//! Owns the single active session, feeds the pure state machine with clock
//! readings and events, executes the effects it returns and publishes the
//! resulting actions.

mod executor;
mod timer;
pub mod traits;


pub use executor::Negotiator;
pub use traits::*;

use crate::session::{Message, SessionId};
use crate::state_machine::Phase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a caller should render for the present step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Show this transcript entry
    Message(Message),
    /// Wait for a bid until `timeout`, then poll again
    AwaitInput { timeout: DateTime<Utc> },
    /// The negotiation is over
    End { end_time: DateTime<Utc> },
}

impl Action {
    pub fn is_end(&self) -> bool {
        matches!(self, Action::End { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NegotiationError {
    #[error("No active negotiation session")]
    NoActiveSession,
    #[error("Session {0} is not the active negotiation session")]
    UnknownSession(SessionId),
    #[error("Not expecting a bid right now (phase: {0})")]
    BidOutOfPhase(Phase),
}
