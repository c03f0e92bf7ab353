use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};

use crate::limits::COOLDOWN_MS;

/// Entries older than the window are dropped once the map grows past this.
const PRUNE_THRESHOLD: usize = 4096;

/// Per-user reaction rate limit.
///
/// A reaction is admitted when at least the cooldown window has passed since
/// that user's last admitted reaction. Rejections are silent: the caller hands
/// back the current state instead of an error.
#[derive(Debug, Clone)]
pub struct CooldownGuard {
    window: TimeDelta,
    last_reaction_at: HashMap<String, DateTime<Utc>>,
}

impl Default for CooldownGuard {
    fn default() -> Self {
        Self::new(TimeDelta::milliseconds(COOLDOWN_MS))
    }
}

impl CooldownGuard {
    pub fn new(window: TimeDelta) -> Self {
        Self {
            window,
            last_reaction_at: HashMap::new(),
        }
    }

    pub fn is_cooling(&self, user_id: &str, now: DateTime<Utc>) -> bool {
        self.last_reaction_at
            .get(user_id)
            .is_some_and(|last| now - *last < self.window)
    }

    /// Remember an admitted reaction.
    pub fn record(&mut self, user_id: &str, now: DateTime<Utc>) {
        if self.last_reaction_at.len() >= PRUNE_THRESHOLD {
            let window = self.window;
            self.last_reaction_at.retain(|_, last| now - *last < window);
        }
        self.last_reaction_at.insert(user_id.to_string(), now);
    }

    /// Seed from a persisted timestamp so a restart does not reopen the window.
    pub fn restore(&mut self, user_id: &str, last: DateTime<Utc>) {
        self.last_reaction_at.insert(user_id.to_string(), last);
    }
}
