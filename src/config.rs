//! Negotiation parameters

use std::time::Duration;

pub const DEFAULT_STARTING_PRICE: u64 = 10_000;
pub const DEFAULT_WINNING_THRESHOLD: u64 = 3_000;
pub const DEFAULT_BID_TIMEOUT: Duration = Duration::from_secs(15);
/// Slack added to the bid timer so it fires strictly after the deadline
pub const DEFAULT_BID_TIMER_GRACE: Duration = Duration::from_millis(1);

/// Tunables for a negotiation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiationConfig {
    /// Asking price of a freshly created session
    pub starting_price: u64,
    /// Highest bid that closes the deal
    pub winning_threshold: u64,
    /// How long the counterpart waits for a bid before nudging
    pub bid_timeout: Duration,
    pub bid_timer_grace: Duration,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            starting_price: DEFAULT_STARTING_PRICE,
            winning_threshold: DEFAULT_WINNING_THRESHOLD,
            bid_timeout: DEFAULT_BID_TIMEOUT,
            bid_timer_grace: DEFAULT_BID_TIMER_GRACE,
        }
    }
}

impl NegotiationConfig {
    /// Read overrides from `HAGGLE_*` environment variables.
    ///
    /// Missing or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let number = |key: &str| -> Option<u64> {
            let raw = lookup(key)?;
            match raw.trim().parse() {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(key, value = %raw, error = %e, "Ignoring invalid config value");
                    None
                }
            }
        };

        Self {
            starting_price: number("HAGGLE_STARTING_PRICE")
                .filter(|price| *price > 0)
                .unwrap_or(defaults.starting_price),
            winning_threshold: number("HAGGLE_WINNING_THRESHOLD")
                .unwrap_or(defaults.winning_threshold),
            bid_timeout: number("HAGGLE_BID_TIMEOUT_MS")
                .map_or(defaults.bid_timeout, Duration::from_millis),
            bid_timer_grace: number("HAGGLE_BID_GRACE_MS")
                .map_or(defaults.bid_timer_grace, Duration::from_millis),
        }
    }
}
