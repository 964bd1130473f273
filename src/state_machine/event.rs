//! Events that drive a negotiation

use crate::session::Participant;

/// Events that trigger phase transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Caller polled for the next action, or the runtime is fast-forwarding
    Advance,

    /// Deferred re-check armed when the wait for a bid began
    BidTimerElapsed,

    /// Participant answered with a counter-offer
    BidSubmitted { sender: Participant, text: String },
}

impl Event {
    pub fn bid(sender: Participant, text: impl Into<String>) -> Self {
        Event::BidSubmitted {
            sender,
            text: text.into(),
        }
    }
}
