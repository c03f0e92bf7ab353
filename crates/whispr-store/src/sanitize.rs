//! Input normalization. Every function here is total: it always produces a
//! best-effort value and leaves rejection to the caller.

use crate::limits::{MAX_ALIAS_LENGTH, MAX_PRICE, MIN_PRICE};

pub const DEFAULT_ALIAS: &str = "Anonymous";

/// Trim surrounding whitespace and keep at most `max_len` characters.
pub fn sanitize_text(text: &str, max_len: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_len) {
        Some((cut, _)) => trimmed[..cut].to_string(),
        None => trimmed.to_string(),
    }
}

/// Clamp a price into `[0, MAX_PRICE]` rounded to cents, half away from zero.
/// Non-finite and negative input becomes 0.
pub fn validate_price(value: f64) -> f64 {
    if !value.is_finite() || value < MIN_PRICE {
        return 0.0;
    }
    if value > MAX_PRICE {
        return MAX_PRICE;
    }
    (value * 100.0).round() / 100.0
}

/// Author alias as displayed next to content; blank becomes "Anonymous".
pub fn sanitize_alias(alias: &str) -> String {
    let alias = sanitize_text(alias, MAX_ALIAS_LENGTH);
    if alias.is_empty() {
        DEFAULT_ALIAS.to_string()
    } else {
        alias
    }
}

/// Floor a client-supplied number into a non-negative counter.
pub fn floor_count(value: Option<f64>) -> u32 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v.floor().min(u32::MAX as f64) as u32,
        _ => 0,
    }
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_trimmed_then_truncated() {
        assert_eq!(sanitize_text("   hello world  ", 5), "hello");
        assert_eq!(sanitize_text("  hi  ", 10), "hi");
        assert_eq!(sanitize_text("", 10), "");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        assert_eq!(sanitize_text("héllo wörld", 7), "héllo w");
        assert_eq!(sanitize_text("🔥🔥🔥", 2), "🔥🔥");
    }

    #[test]
    fn price_round_trip() {
        assert_eq!(validate_price(-5.0), 0.0);
        assert_eq!(validate_price(100.456), 100.46);
        assert_eq!(validate_price(999_999.0), MAX_PRICE);
        assert_eq!(validate_price(f64::NAN), 0.0);
        assert_eq!(validate_price(f64::INFINITY), 0.0);
    }

    #[test]
    fn price_rounds_half_up_to_cents() {
        assert_eq!(validate_price(19.999), 20.0);
        assert_eq!(validate_price(19.994), 19.99);
        assert_eq!(validate_price(0.005), 0.01);
    }

    #[test]
    fn alias_defaults_when_blank() {
        assert_eq!(sanitize_alias("   "), DEFAULT_ALIAS);
        assert_eq!(sanitize_alias(" Nova Dust "), "Nova Dust");
        assert_eq!(char_len(&sanitize_alias(&"x".repeat(90))), MAX_ALIAS_LENGTH);
    }

    #[test]
    fn counts_are_floored_at_zero() {
        assert_eq!(floor_count(Some(3.9)), 3);
        assert_eq!(floor_count(Some(-2.0)), 0);
        assert_eq!(floor_count(Some(f64::NAN)), 0);
        assert_eq!(floor_count(None), 0);
    }
}
