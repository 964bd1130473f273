//! Reading a counter-offer out of free text

/// Outcome of reading a bid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedBid {
    /// A positive amount
    Amount(u64),
    /// Zero or negative
    NonPositive,
    /// No leading integer at all
    NotANumber,
}

/// Parse the leading integer of `text`.
///
/// Leading whitespace and one sign are accepted, then the longest run of ASCII
/// digits is read; anything after it is ignored (`"2000 EUR"` reads as 2000).
/// Digit runs beyond `u64::MAX` saturate.
pub fn parse_bid(text: &str) -> ParsedBid {
    let trimmed = text.trim_start();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let mut value: u64 = 0;
    let mut seen_digit = false;
    for digit in unsigned.bytes().take_while(u8::is_ascii_digit) {
        seen_digit = true;
        value = value
            .saturating_mul(10)
            .saturating_add(u64::from(digit - b'0'));
    }

    if !seen_digit {
        ParsedBid::NotANumber
    } else if negative || value == 0 {
        ParsedBid::NonPositive
    } else {
        ParsedBid::Amount(value)
    }
}
