//! Pure phase transition function

use super::bid::{parse_bid, ParsedBid};
use super::{Effect, Event, Phase, StepContext};
use crate::catalog;
use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;
use thiserror::Error;

/// Result of a phase transition
#[derive(Debug, PartialEq, Eq)]
pub struct TransitionResult {
    pub new_phase: Phase,
    pub effects: Vec<Effect>,
    /// Step again right away, without waiting for the caller
    pub advance_again: bool,
}

impl TransitionResult {
    pub fn new(phase: Phase) -> Self {
        Self {
            new_phase: phase,
            effects: vec![],
            advance_again: false,
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn then_advance(mut self) -> Self {
        self.advance_again = true;
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("A bid is only accepted while awaiting one (phase: {0})")]
    NotAwaitingBid(Phase),
    #[error("Bid timer elapsed outside of the bid wait (phase: {0})")]
    StaleTimer(Phase),
}

/// Pure transition function
///
/// Given the same phase, context and event it always produces the same
/// result. Every step that says something asks to be followed by another
/// step, so one call from the runtime runs until the negotiation rests in
/// `AwaitingBid` or `Ended`.
///
/// # Errors
///
/// Returns [`TransitionError::NotAwaitingBid`] for a bid outside
/// `AwaitingBid` and [`TransitionError::StaleTimer`] for a timer that fires
/// outside it.
pub fn transition(
    phase: Phase,
    ctx: &StepContext<'_>,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (phase, event) {
        (Phase::Started, Event::Advance) => Ok(TransitionResult::new(Phase::Greeted)
            .with_effect(Effect::say(catalog::GREETING))
            .then_advance()),

        (Phase::Greeted, Event::Advance) => Ok(TransitionResult::new(Phase::PriceSent)
            .with_effect(Effect::say(catalog::price_quote(ctx.price)))
            .then_advance()),

        // Arm the wait; the timer re-checks shortly after the deadline
        (Phase::PriceSent, Event::Advance) => Ok(TransitionResult::new(Phase::AwaitingBid)
            .with_effect(Effect::AwaitInput {
                deadline: deadline_after(ctx.now, ctx.config.bid_timeout),
            })
            .with_effect(Effect::ArmBidTimer {
                delay: bid_timer_delay(ctx),
            })),

        (Phase::AwaitingBid, Event::Advance) => Ok(await_or_nudge(ctx, false)),

        (Phase::AwaitingBid, Event::BidTimerElapsed) => Ok(await_or_nudge(ctx, true)),

        (Phase::AwaitingBid, Event::BidSubmitted { sender, text }) => {
            Ok(TransitionResult::new(Phase::Evaluating)
                .with_effect(Effect::RecordBid { sender, text })
                .then_advance())
        }

        (Phase::Evaluating, Event::Advance) => Ok(evaluate_bid(ctx)),

        (Phase::Ended, Event::Advance) => {
            Ok(TransitionResult::new(Phase::Ended).with_effect(Effect::SignalEnd))
        }

        (phase, Event::BidSubmitted { .. }) => Err(TransitionError::NotAwaitingBid(phase)),

        (phase, Event::BidTimerElapsed) => Err(TransitionError::StaleTimer(phase)),
    }
}

/// Keep waiting while time remains, otherwise nudge and restart the wait.
///
/// A timer that fired early has already been spent, so `timer_fired` re-arms
/// it for the time that is left.
fn await_or_nudge(ctx: &StepContext<'_>, timer_fired: bool) -> TransitionResult {
    match remaining_bid_time(ctx) {
        Some(remaining) => {
            let result = TransitionResult::new(Phase::AwaitingBid).with_effect(Effect::AwaitInput {
                deadline: ctx.now.checked_add_signed(remaining).unwrap_or(DateTime::<Utc>::MAX_UTC),
            });
            if timer_fired {
                let delay = remaining
                    .to_std()
                    .unwrap_or_default()
                    .saturating_add(ctx.config.bid_timer_grace);
                result.with_effect(Effect::ArmBidTimer { delay })
            } else {
                result
            }
        }
        None => TransitionResult::new(Phase::AwaitingBid)
            .with_effect(Effect::say(catalog::TIMEOUT_NUDGE))
            .with_effect(Effect::ArmBidTimer {
                delay: bid_timer_delay(ctx),
            })
            .then_advance(),
    }
}

/// Judge the bid held by the most recent message
fn evaluate_bid(ctx: &StepContext<'_>) -> TransitionResult {
    let text = ctx.last_message.map_or("", |message| message.text.as_str());

    match parse_bid(text) {
        ParsedBid::Amount(bid) if bid <= ctx.config.winning_threshold => {
            TransitionResult::new(Phase::Ended)
                .with_effect(Effect::SetPrice { price: bid })
                .with_effect(Effect::say(catalog::DEAL_ACCEPTED))
                .with_effect(Effect::Conclude)
                .then_advance()
        }
        parsed => {
            // Back to the quote so the (possibly updated) price is restated
            let mut result = TransitionResult::new(Phase::Greeted);
            if let ParsedBid::Amount(bid) = parsed {
                result = result.with_effect(Effect::SetPrice { price: bid });
            }
            result
                .with_effect(Effect::say(catalog::COUNTER_OFFER_REJECTED))
                .then_advance()
        }
    }
}

/// Time left before the counterpart loses patience, `None` once it is up
fn remaining_bid_time(ctx: &StepContext<'_>) -> Option<TimeDelta> {
    let timeout = TimeDelta::from_std(ctx.config.bid_timeout).unwrap_or(TimeDelta::MAX);
    let elapsed = (ctx.now - ctx.last_activity()).max(TimeDelta::zero());
    timeout
        .checked_sub(&elapsed)
        .filter(|remaining| *remaining > TimeDelta::zero())
}

fn bid_timer_delay(ctx: &StepContext<'_>) -> Duration {
    ctx.config
        .bid_timeout
        .saturating_add(ctx.config.bid_timer_grace)
}

fn deadline_after(now: DateTime<Utc>, wait: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(wait)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
