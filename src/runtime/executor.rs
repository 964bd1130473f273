//! Negotiation runtime executor

use super::timer::BidTimer;
use super::traits::{Clock, MonotonicClock};
use super::{Action, NegotiationError};

use crate::config::NegotiationConfig;
use crate::session::{Message, Participant, Session, SessionId, Transcript};
use crate::state_machine::{transition, Effect, Event, Phase, StepContext, TransitionError};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::broadcast;

const ACTION_CHANNEL_CAPACITY: usize = 64;

/// Drives the one active negotiation session.
///
/// Cheap to clone; clones share the same session. Every operation runs the
/// whole synchronous step chain under one lock, so steps never interleave.
/// Bid timers need a Tokio runtime; without one the wait only advances when
/// polled with [`Negotiator::advance`].
#[derive(Clone)]
pub struct Negotiator {
    shared: Arc<Shared>,
}

struct Shared {
    config: NegotiationConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<EngineState>,
    action_tx: broadcast::Sender<Action>,
}

#[derive(Default)]
struct EngineState {
    active: Option<ActiveSession>,
    /// Last action produced, whoever triggered it
    current_action: Option<Action>,
    timer_generation: u64,
    /// Transcripts of superseded sessions, still readable by id
    archived: HashMap<SessionId, Transcript>,
}

/// A live session together with its execution state
struct ActiveSession {
    session: Session,
    phase: Phase,
    transcript: Transcript,
    bid_timer: Option<BidTimer>,
}

impl ActiveSession {
    fn new(session: Session) -> Self {
        Self {
            transcript: Transcript::new(session.id),
            session,
            phase: Phase::Started,
            bid_timer: None,
        }
    }

    fn arm_bid_timer(&mut self, timer: Option<BidTimer>) {
        self.cancel_bid_timer();
        self.bid_timer = timer;
    }

    fn cancel_bid_timer(&mut self) {
        if let Some(timer) = self.bid_timer.take() {
            timer.cancel();
        }
    }
}

impl Negotiator {
    pub fn new(config: NegotiationConfig) -> Self {
        Self::with_clock(config, Arc::new(MonotonicClock::new()))
    }

    pub fn with_clock(config: NegotiationConfig, clock: Arc<dyn Clock>) -> Self {
        let (action_tx, _) = broadcast::channel(ACTION_CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                config,
                clock,
                state: Mutex::new(EngineState::default()),
                action_tx,
            }),
        }
    }

    /// Start a new negotiation, replacing the previous one.
    ///
    /// The previous session's phase and timer are dropped; its transcript
    /// stays available through [`Negotiator::get_messages`].
    ///
    /// The session is advanced right away, so by the time this returns the
    /// counterpart has greeted, quoted and started waiting for a bid.
    pub fn create_session(&self) -> Session {
        let mut state = self.shared.lock();
        let session = Session::new(self.shared.config.starting_price, self.shared.clock.now());

        if let Some(mut previous) = state.active.take() {
            previous.cancel_bid_timer();
            tracing::info!(
                session_id = %previous.session.id,
                phase = %previous.phase,
                "Superseding negotiation session"
            );
            state
                .archived
                .insert(previous.transcript.session_id(), previous.transcript);
        }
        state.current_action = None;
        state.active = Some(ActiveSession::new(session.clone()));

        tracing::info!(
            session_id = %session.id,
            price = session.price,
            "Negotiation session created"
        );

        if let Err(e) = self.shared.step(&mut state, Event::Advance) {
            tracing::error!(session_id = %session.id, error = %e, "Failed to open negotiation");
        }
        session
    }

    /// Transcript of `session_id`, active or superseded; empty if unknown
    pub fn get_messages(&self, session_id: SessionId) -> Vec<Message> {
        let state = self.shared.lock();
        state
            .active
            .as_ref()
            .filter(|active| active.session.id == session_id)
            .map(|active| &active.transcript)
            .or_else(|| state.archived.get(&session_id))
            .map(|transcript| transcript.messages().to_vec())
            .unwrap_or_default()
    }

    /// Step the active session and return the first action this produced.
    ///
    /// Returns `None` when no session exists. Every action produced on the
    /// way is also published to subscribers.
    pub fn advance(&self) -> Option<Action> {
        let mut state = self.shared.lock();
        if state.active.is_none() {
            tracing::debug!("Advance requested without an active session");
            return None;
        }

        match self.shared.step(&mut state, Event::Advance) {
            Ok(action) => action,
            Err(e) => {
                tracing::error!(error = %e, "Advance failed");
                None
            }
        }
    }

    /// Record a counter-offer from `sender` and evaluate it immediately
    ///
    /// # Errors
    ///
    /// Fails without touching the transcript when there is no session, when
    /// `session_id` is not the active one, or when the session is not waiting
    /// for a bid.
    pub fn submit_bid(
        &self,
        session_id: SessionId,
        sender: Participant,
        text: impl Into<String>,
    ) -> Result<(), NegotiationError> {
        let mut state = self.shared.lock();
        let active = state
            .active
            .as_ref()
            .ok_or(NegotiationError::NoActiveSession)?;
        if active.session.id != session_id {
            return Err(NegotiationError::UnknownSession(session_id));
        }

        self.shared
            .step(&mut state, Event::bid(sender, text))
            .map(|_| ())
            .map_err(|e| match e {
                TransitionError::NotAwaitingBid(phase) | TransitionError::StaleTimer(phase) => {
                    tracing::debug!(session_id = %session_id, error = %e, "Rejected bid");
                    NegotiationError::BidOutOfPhase(phase)
                }
            })
    }

    /// Snapshot of the live session
    pub fn active_session(&self) -> Option<Session> {
        self.shared
            .lock()
            .active
            .as_ref()
            .map(|active| active.session.clone())
    }

    /// Most recent action, including those produced by the bid timer
    pub fn current_action(&self) -> Option<Action> {
        self.shared.lock().current_action.clone()
    }

    /// Receive every action as it is produced
    pub fn subscribe(&self) -> broadcast::Receiver<Action> {
        self.shared.action_tx.subscribe()
    }

    #[cfg(test)]
    pub(crate) fn phase(&self) -> Option<Phase> {
        self.shared.lock().active.as_ref().map(|active| active.phase)
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run transitions starting with `event` until the session rests.
    ///
    /// Chains are bounded by the number of phases; a longer chain means the
    /// transition table loops and is cut off.
    fn step(
        self: &Arc<Self>,
        state: &mut EngineState,
        event: Event,
    ) -> Result<Option<Action>, TransitionError> {
        let EngineState {
            active,
            current_action,
            timer_generation,
            ..
        } = state;
        let Some(active) = active.as_mut() else {
            return Ok(None);
        };

        let mut event = event;
        let mut first_action = None;

        for _ in 0..Phase::COUNT {
            let now = self.clock.now();
            let ctx = StepContext {
                now,
                price: active.session.price,
                started_at: active.session.start_time,
                last_message: active.transcript.last(),
                config: &self.config,
            };
            let result = transition(active.phase, &ctx, event)?;

            if result.new_phase != active.phase {
                tracing::debug!(
                    session_id = %active.session.id,
                    from = %active.phase,
                    to = %result.new_phase,
                    "Phase transition"
                );
            }
            active.phase = result.new_phase;

            for effect in result.effects {
                if let Some(action) = self.execute_effect(active, effect, now, timer_generation) {
                    let _ = self.action_tx.send(action.clone());
                    *current_action = Some(action.clone());
                    first_action.get_or_insert(action);
                }
            }

            if !active.phase.awaits_input() {
                active.cancel_bid_timer();
            }
            if !result.advance_again {
                return Ok(first_action);
            }
            event = Event::Advance;
        }

        tracing::error!(
            session_id = %active.session.id,
            phase = %active.phase,
            "Negotiation did not settle, stopping fast-forward"
        );
        Ok(first_action)
    }

    fn execute_effect(
        self: &Arc<Self>,
        active: &mut ActiveSession,
        effect: Effect,
        now: DateTime<Utc>,
        timer_generation: &mut u64,
    ) -> Option<Action> {
        match effect {
            Effect::Say { text } => {
                let message = active.transcript.append(Participant::system(), text, now);
                Some(Action::Message(message))
            }

            Effect::RecordBid { sender, text } => {
                let message = active.transcript.append(sender, text, now);
                tracing::info!(
                    session_id = %active.session.id,
                    sender = %message.sender.name,
                    bid = %message.text,
                    "Bid received"
                );
                None
            }

            Effect::SetPrice { price } => {
                active.session.price = price;
                None
            }

            Effect::Conclude => {
                if active.session.end_time.is_none() {
                    active.session.end_time = Some(now);
                    tracing::info!(
                        session_id = %active.session.id,
                        price = active.session.price,
                        "Deal closed"
                    );
                }
                None
            }

            Effect::ArmBidTimer { delay } => {
                *timer_generation += 1;
                let generation = *timer_generation;
                let session_id = active.session.id;
                let engine = Arc::downgrade(self);
                let timer = BidTimer::spawn(generation, delay, move || {
                    Shared::on_bid_timer(&engine, session_id, generation);
                });
                active.arm_bid_timer(timer);
                None
            }

            Effect::AwaitInput { deadline } => Some(Action::AwaitInput { timeout: deadline }),

            Effect::SignalEnd => Some(Action::End { end_time: now }),
        }
    }

    /// Deferred re-check of the bid wait.
    ///
    /// No-op unless the engine is alive, the same session is active and this
    /// timer is the one currently armed; the transition then refuses it
    /// outside `AwaitingBid`.
    fn on_bid_timer(engine: &Weak<Self>, session_id: SessionId, generation: u64) {
        let Some(engine) = engine.upgrade() else {
            return;
        };
        let mut state = engine.lock();

        let Some(active) = state.active.as_mut().filter(|active| {
            active.session.id == session_id
                && active
                    .bid_timer
                    .as_ref()
                    .is_some_and(|timer| timer.generation() == generation)
        }) else {
            tracing::debug!(session_id = %session_id, generation, "Ignoring superseded bid timer");
            return;
        };
        // Fired; nothing left to cancel
        active.bid_timer = None;

        match engine.step(&mut state, Event::BidTimerElapsed) {
            Ok(_) => tracing::debug!(session_id = %session_id, "Bid timer elapsed"),
            Err(e) => tracing::debug!(session_id = %session_id, error = %e, "Ignoring stale bid timer"),
        }
    }
}
