//! Coercion rules for free-text calculator fields. Nothing here fails: text
//! that is not a usable number becomes zero, or one for a party size.

/// Parses a numeric field. Empty, non-numeric and non-finite input yields `0.0`.
pub fn parse_number(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Parses a head count. Fractions are truncated; anything below one becomes one.
pub fn parse_party_size(text: &str) -> u32 {
    let value = parse_number(text).trunc();
    if value < 1.0 {
        1
    } else if value > u32::MAX as f64 {
        u32::MAX
    } else {
        value as u32
    }
}

/// Parses an optional field where empty means "not provided".
pub fn parse_optional_number(text: &str) -> Option<f64> {
    if text.trim().is_empty() {
        None
    } else {
        Some(parse_number(text))
    }
}
