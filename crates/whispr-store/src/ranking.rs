//! Trending score: weighted reaction counts with a power-law age decay.
//!
//! Scores depend on the current time, so they are computed on every read and
//! never stored.

use chrono::{DateTime, Utc};
use whispr_types::models::{Confession, ReactionKind};

/// Age in hours at which the decay factor has dropped to `2^-1.3`.
const DECAY_HOURS: f64 = 12.0;
const DECAY_EXPONENT: f64 = 1.3;

pub fn weight(kind: ReactionKind) -> f64 {
    match kind {
        ReactionKind::Fire => 3.0,
        ReactionKind::Heart => 2.0,
        ReactionKind::Laugh => 2.0,
        ReactionKind::Shock => 1.5,
        ReactionKind::Sad => 1.0,
    }
}

pub fn decay(age_hours: f64) -> f64 {
    1.0 / (1.0 + age_hours.max(0.0) / DECAY_HOURS).powf(DECAY_EXPONENT)
}

pub fn trending_score(confession: &Confession, now: DateTime<Utc>) -> f64 {
    let raw: f64 = ReactionKind::ALL
        .iter()
        .map(|kind| confession.reactions.count(*kind) as f64 * weight(*kind))
        .sum();
    let age_ms = (now - confession.created_at).num_milliseconds().max(0);
    raw * decay(age_ms as f64 / 3_600_000.0)
}

/// Order by descending score. The sort is stable, so equal scores keep their
/// incoming relative order.
pub fn sort_trending(confessions: Vec<Confession>, now: DateTime<Utc>) -> Vec<Confession> {
    let mut scored: Vec<(f64, Confession)> = confessions
        .into_iter()
        .map(|c| (trending_score(&c, now), c))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, c)| c).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use uuid::Uuid;
    use whispr_types::models::{ConfessionCategory, Reactions};

    fn confession(age: TimeDelta, fire: usize, sad: usize, now: DateTime<Utc>) -> Confession {
        let mut reactions = Reactions::default();
        for i in 0..fire {
            reactions.fire.insert(format!("f{i}"));
        }
        for i in 0..sad {
            reactions.sad.insert(format!("s{i}"));
        }
        Confession {
            id: Uuid::new_v4(),
            content: "test".into(),
            author_id: "author".into(),
            author_alias: "Echo Pulse".into(),
            author_avatar_index: 0,
            author_karma: 0,
            category: ConfessionCategory::Confession,
            reactions,
            comment_count: 0,
            is_after_dark: false,
            created_at: now - age,
            media: None,
        }
    }

    #[test]
    fn fresh_score_is_weighted_sum() {
        let now = Utc::now();
        let c = confession(TimeDelta::zero(), 2, 1, now);
        assert_eq!(trending_score(&c, now), 7.0);
    }

    #[test]
    fn decay_halves_roughly_every_twelve_hours() {
        assert_eq!(decay(0.0), 1.0);
        let at_12h = decay(12.0);
        assert!((at_12h - 2f64.powf(-1.3)).abs() < 1e-12);
        assert!(decay(24.0) < at_12h);
        assert!(decay(10_000.0) > 0.0);
    }

    #[test]
    fn future_timestamps_do_not_boost() {
        let now = Utc::now();
        let c = confession(TimeDelta::hours(-5), 1, 0, now);
        assert_eq!(trending_score(&c, now), 3.0);
    }

    #[test]
    fn trending_order_is_non_increasing_and_stable() {
        let now = Utc::now();
        let items = vec![
            confession(TimeDelta::hours(1), 0, 0, now),
            confession(TimeDelta::hours(30), 3, 0, now),
            confession(TimeDelta::minutes(5), 3, 0, now),
            confession(TimeDelta::hours(2), 0, 0, now),
        ];
        let quiet_first = items[0].id;
        let quiet_second = items[3].id;

        let sorted = sort_trending(items, now);
        let scores: Vec<f64> = sorted.iter().map(|c| trending_score(c, now)).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(sorted[2].id, quiet_first);
        assert_eq!(sorted[3].id, quiet_second);
    }
}
