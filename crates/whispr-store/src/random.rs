use std::collections::VecDeque;
use std::sync::Mutex;

use rand::Rng;

/// Source of random choices (alias and avatar assignment, crush mutuality).
pub trait Randomness: Send + Sync {
    /// Uniform index in `0..len`. Returns 0 when `len` is 0.
    fn index(&self, len: usize) -> usize;

    /// True with the given probability.
    fn chance(&self, probability: f64) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl Randomness for ThreadRandom {
    fn index(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        rand::rng().random_range(0..len)
    }

    fn chance(&self, probability: f64) -> bool {
        rand::rng().random_bool(probability.clamp(0.0, 1.0))
    }
}

/// Replays queued outcomes; falls back to index 0 / `false` once drained.
#[derive(Debug, Default)]
pub struct ScriptedRandom {
    indices: Mutex<VecDeque<usize>>,
    chances: Mutex<VecDeque<bool>>,
}

impl ScriptedRandom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indices(self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.indices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(indices);
        self
    }

    pub fn with_chances(self, chances: impl IntoIterator<Item = bool>) -> Self {
        self.chances
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(chances);
        self
    }
}

impl Randomness for ScriptedRandom {
    fn index(&self, len: usize) -> usize {
        let next = self
            .indices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(0);
        if len == 0 { 0 } else { next % len }
    }

    fn chance(&self, _probability: f64) -> bool {
        self.chances
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_random_stays_in_range() {
        let rng = ThreadRandom;
        for _ in 0..100 {
            assert!(rng.index(12) < 12);
        }
        assert_eq!(rng.index(0), 0);
        assert!(!rng.chance(0.0));
        assert!(rng.chance(1.0));
    }

    #[test]
    fn scripted_random_replays_then_defaults() {
        let rng = ScriptedRandom::new().with_indices([3, 14]).with_chances([true]);
        assert_eq!(rng.index(10), 3);
        assert_eq!(rng.index(10), 4);
        assert_eq!(rng.index(10), 0);
        assert!(rng.chance(0.4));
        assert!(!rng.chance(0.4));
    }
}
