//! Scripted lines spoken by the negotiation counterpart

pub const GREETING: &str = "Hello there!";

pub const TIMEOUT_NUDGE: &str = "Please hurry up!";

pub const COUNTER_OFFER_REJECTED: &str =
    "Thank you. This is quite far from what we expected. So please enter a more improved offer.";

pub const DEAL_ACCEPTED: &str = "Congratulations, you got the deal!";

/// Quote the current asking price and invite a bid
pub fn price_quote(price: u64) -> String {
    format!("The current price is €{price}. What is your bid?")
}
