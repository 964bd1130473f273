//! Negotiation state machine
//!
//! Pure transitions in the Elm style: given the current phase, a snapshot of
//! the session and an event, decide the next phase and the effects the
//! runtime has to carry out. Nothing in here reads the clock or touches state.

mod bid;
mod effect;
pub mod event;
mod phase;
pub(crate) mod transition;


pub use bid::{parse_bid, ParsedBid};
pub use effect::Effect;
pub use event::Event;
pub use phase::{Phase, StepContext};
pub use transition::{transition, TransitionError, TransitionResult};
