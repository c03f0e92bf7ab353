pub const MAX_CONFESSIONS: usize = 200;
pub const MAX_CRUSHES: usize = 100;
pub const MAX_MARKET_ITEMS: usize = 150;
pub const MAX_COMMENTS: usize = 500;

pub const MAX_CONFESSION_LENGTH: usize = 500;
pub const MIN_CONFESSION_LENGTH: usize = 3;
pub const MAX_CRUSH_MESSAGE_LENGTH: usize = 200;
pub const MIN_CRUSH_ALIAS_LENGTH: usize = 2;
pub const MAX_COMMENT_LENGTH: usize = 280;
pub const MAX_TITLE_LENGTH: usize = 100;
pub const MIN_TITLE_LENGTH: usize = 3;
pub const MAX_DESCRIPTION_LENGTH: usize = 300;
pub const MAX_ALIAS_LENGTH: usize = 40;
pub const MAX_URL_LENGTH: usize = 2048;

pub const MIN_PRICE: f64 = 0.0;
pub const MAX_PRICE: f64 = 99_999.0;
pub const MAX_MARKET_IMAGES: usize = 3;

pub const AVATAR_COUNT: usize = 12;
pub const STARTING_KARMA: u32 = 10;

/// Probability that a freshly sent crush is marked mutual.
pub const MUTUAL_CRUSH_CHANCE: f64 = 0.4;

/// Minimum spacing between two reactions from the same user.
pub const COOLDOWN_MS: i64 = 500;

pub const DEFAULT_LIST_LIMIT: usize = 100;
pub const MAX_CONFESSION_PAGE: usize = 200;
pub const MAX_MARKET_PAGE: usize = 150;
pub const MAX_COMMENT_PAGE: usize = 200;

/// Clamp a client-supplied page size into `[1, max]`.
pub fn clamp_limit(requested: Option<i64>, max: usize) -> usize {
    match requested {
        Some(n) if n < 1 => 1,
        Some(n) => (n as u64).min(max as u64) as usize,
        None => DEFAULT_LIST_LIMIT.min(max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_clamped_server_side() {
        assert_eq!(clamp_limit(None, MAX_CONFESSION_PAGE), 100);
        assert_eq!(clamp_limit(Some(0), MAX_CONFESSION_PAGE), 1);
        assert_eq!(clamp_limit(Some(-7), MAX_MARKET_PAGE), 1);
        assert_eq!(clamp_limit(Some(5_000), MAX_MARKET_PAGE), 150);
        assert_eq!(clamp_limit(Some(42), MAX_COMMENT_PAGE), 42);
    }
}
