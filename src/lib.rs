//! Haggle - scripted price negotiation engine
//!
//! A counterpart quotes a price, waits a bounded time for a bid and either
//! accepts it or asks for a better offer. The engine is split into a pure
//! state machine and a runtime that owns the single active session.

pub mod catalog;
pub mod config;
pub mod runtime;
pub mod session;
pub mod state_machine;

pub use config::NegotiationConfig;
pub use runtime::{
    Action, Clock, IdentityProvider, MonotonicClock, NegotiationError, Negotiator, StaticIdentity,
};
pub use session::{Message, Participant, Session, SessionId};
pub use state_machine::Phase;
