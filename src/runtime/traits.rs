//! Trait abstractions for runtime collaborators
//!
//! These traits let tests drive the engine with a hand-cranked clock and a
//! fixed participant.

use crate::session::Participant;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use tokio::time::Instant;

/// Source of timestamps for messages and deadlines
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Supplies the display identity of the human participant
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_participant(&self) -> Participant;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

#[async_trait]
impl<T: IdentityProvider + ?Sized> IdentityProvider for Arc<T> {
    async fn current_participant(&self) -> Participant {
        (**self).current_participant().await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Wall-clock time that never runs backwards.
///
/// Reads the wall clock once and measures everything after that with a
/// monotonic instant, so transcript order and timestamp order always agree.
/// Uses Tokio's instant, which follows a paused test clock.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    anchor_wall: DateTime<Utc>,
    anchor: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            anchor_wall: Utc::now(),
            anchor: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = TimeDelta::from_std(self.anchor.elapsed()).unwrap_or_default();
        self.anchor_wall + elapsed
    }
}

/// Always the same participant
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    participant: Participant,
}

impl StaticIdentity {
    pub fn new(participant: Participant) -> Self {
        Self { participant }
    }
}

impl Default for StaticIdentity {
    fn default() -> Self {
        Self::new(Participant::new("John Doe", "J", "blue"))
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_participant(&self) -> Participant {
        self.participant.clone()
    }
}
