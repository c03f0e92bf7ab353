//! Per-device anonymous profiles. The ledger is the only writer of karma.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;
use whispr_types::models::Profile;

use crate::limits::{AVATAR_COUNT, MAX_ALIAS_LENGTH, STARTING_KARMA};
use crate::random::Randomness;
use crate::sanitize::sanitize_text;

pub const ALIASES: [&str; 20] = [
    "Shadow Fox", "Neon Ghost", "Midnight Owl", "Pixel Phantom",
    "Cosmic Drift", "Velvet Storm", "Arctic Flame", "Lucid Haze",
    "Echo Pulse", "Silent Spark", "Crimson Tide", "Cipher Wave",
    "Nova Dust", "Thunder Ink", "Prism Shade", "Astral Blur",
    "Iron Mist", "Onyx Glow", "Twilight Ash", "Crystal Veil",
];

/// Content actions that earn karma.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KarmaAction {
    Confession,
    Reaction,
    Crush,
    MarketListing,
    Comment,
}

impl KarmaAction {
    pub fn delta(&self) -> u32 {
        match self {
            Self::Confession => 5,
            Self::Reaction => 1,
            Self::Crush => 3,
            Self::MarketListing => 3,
            Self::Comment => 1,
        }
    }
}

/// Partial profile update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub alias: Option<String>,
    pub avatar_index: Option<u32>,
    /// Absolute karma value; negative results are floored at 0.
    pub karma: Option<i64>,
}

#[derive(Debug, Default)]
pub struct ProfileLedger {
    profiles: HashMap<String, Profile>,
}

impl ProfileLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_profiles(profiles: impl IntoIterator<Item = Profile>) -> Self {
        let mut ledger = Self::new();
        for profile in profiles {
            ledger.profiles.entry(profile.id.clone()).or_insert(profile);
        }
        ledger
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Profile> {
        self.profiles.get(id)
    }

    /// All profiles, newest first.
    pub fn profiles(&self) -> Vec<Profile> {
        let mut all: Vec<Profile> = self.profiles.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        all
    }

    pub fn create(&mut self, now: DateTime<Utc>, rng: &dyn Randomness) -> Profile {
        let profile = Profile {
            id: Uuid::new_v4().to_string(),
            alias: ALIASES[rng.index(ALIASES.len())].to_string(),
            avatar_index: rng.index(AVATAR_COUNT) as u32,
            karma: STARTING_KARMA,
            confessions_count: 0,
            reactions_given: 0,
            crushes_sent: 0,
            matches_revealed: 0,
            created_at: now,
            last_reaction_at: None,
        };
        self.profiles.insert(profile.id.clone(), profile.clone());
        profile
    }

    pub fn update(&mut self, id: &str, update: ProfileUpdate) -> Option<Profile> {
        self.apply(id, |next| {
            if let Some(alias) = &update.alias {
                let alias = sanitize_text(alias, MAX_ALIAS_LENGTH);
                if !alias.is_empty() {
                    next.alias = alias;
                }
            }
            if let Some(avatar) = update.avatar_index {
                next.avatar_index = avatar.min(AVATAR_COUNT as u32 - 1);
            }
            if let Some(karma) = update.karma {
                next.karma = karma.clamp(0, u32::MAX as i64) as u32;
            }
        })
    }

    /// Draw a new alias that differs from the current one, plus a new avatar.
    pub fn regenerate_alias(&mut self, id: &str, rng: &dyn Randomness) -> Option<Profile> {
        self.apply(id, |next| {
            let candidates: Vec<&str> = ALIASES
                .iter()
                .copied()
                .filter(|alias| *alias != next.alias)
                .collect();
            next.alias = candidates[rng.index(candidates.len())].to_string();
            next.avatar_index = rng.index(AVATAR_COUNT) as u32;
        })
    }

    /// Grant the karma for a completed action and bump its counter.
    pub fn grant(&mut self, id: &str, action: KarmaAction) -> Option<Profile> {
        self.apply(id, |next| grant_into(next, action))
    }

    /// Record an admitted reaction toggle. Karma is granted only when the
    /// reaction was added.
    pub fn record_reaction(&mut self, id: &str, now: DateTime<Utc>, added: bool) -> Option<Profile> {
        self.apply(id, |next| {
            next.last_reaction_at = Some(now);
            if added {
                grant_into(next, KarmaAction::Reaction);
            }
        })
    }

    pub fn record_reveal(&mut self, id: &str) -> Option<Profile> {
        self.apply(id, |next| next.matches_revealed = next.matches_revealed.saturating_add(1))
    }

    /// Compute the next profile from a copy, then store it in one assignment.
    fn apply(&mut self, id: &str, change: impl FnOnce(&mut Profile)) -> Option<Profile> {
        let current = self.profiles.get(id)?;
        let mut next = current.clone();
        change(&mut next);
        self.profiles.insert(id.to_string(), next.clone());
        Some(next)
    }
}

fn grant_into(profile: &mut Profile, action: KarmaAction) {
    profile.karma = profile.karma.saturating_add(action.delta());
    match action {
        KarmaAction::Confession => {
            profile.confessions_count = profile.confessions_count.saturating_add(1)
        }
        KarmaAction::Reaction => profile.reactions_given = profile.reactions_given.saturating_add(1),
        KarmaAction::Crush => profile.crushes_sent = profile.crushes_sent.saturating_add(1),
        KarmaAction::MarketListing | KarmaAction::Comment => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;

    fn ledger_with_profile(rng: &ScriptedRandom) -> (ProfileLedger, Profile) {
        let mut ledger = ProfileLedger::new();
        let profile = ledger.create(Utc::now(), rng);
        (ledger, profile)
    }

    #[test]
    fn new_profile_starts_with_ten_karma() {
        let rng = ScriptedRandom::new().with_indices([2, 7]);
        let (_, profile) = ledger_with_profile(&rng);
        assert_eq!(profile.alias, "Midnight Owl");
        assert_eq!(profile.avatar_index, 7);
        assert_eq!(profile.karma, STARTING_KARMA);
        assert_eq!(profile.confessions_count, 0);
        assert!(profile.last_reaction_at.is_none());
    }

    #[test]
    fn karma_is_floored_at_zero() {
        let rng = ScriptedRandom::new();
        let (mut ledger, profile) = ledger_with_profile(&rng);
        let updated = ledger
            .update(&profile.id, ProfileUpdate { karma: Some(-40), ..Default::default() })
            .unwrap();
        assert_eq!(updated.karma, 0);
    }

    #[test]
    fn update_clamps_avatar_and_ignores_blank_alias() {
        let rng = ScriptedRandom::new();
        let (mut ledger, profile) = ledger_with_profile(&rng);
        let updated = ledger
            .update(
                &profile.id,
                ProfileUpdate {
                    alias: Some("   ".into()),
                    avatar_index: Some(99),
                    karma: None,
                },
            )
            .unwrap();
        assert_eq!(updated.alias, profile.alias);
        assert_eq!(updated.avatar_index, AVATAR_COUNT as u32 - 1);
        assert!(ledger.update("missing", ProfileUpdate::default()).is_none());
    }

    #[test]
    fn regenerated_alias_always_differs() {
        // Index 0 of the remaining pool would be "Shadow Fox" again if the
        // current alias were not excluded.
        let rng = ScriptedRandom::new().with_indices([0, 0, 0, 5]);
        let (mut ledger, profile) = ledger_with_profile(&rng);
        assert_eq!(profile.alias, "Shadow Fox");

        let regenerated = ledger.regenerate_alias(&profile.id, &rng).unwrap();
        assert_eq!(regenerated.alias, "Neon Ghost");
        assert_eq!(regenerated.avatar_index, 5);
        assert_eq!(regenerated.karma, profile.karma);
    }

    #[test]
    fn grants_follow_action_table() {
        let rng = ScriptedRandom::new();
        let (mut ledger, profile) = ledger_with_profile(&rng);
        ledger.grant(&profile.id, KarmaAction::Confession);
        ledger.grant(&profile.id, KarmaAction::Crush);
        ledger.grant(&profile.id, KarmaAction::MarketListing);
        let p = ledger.grant(&profile.id, KarmaAction::Comment).unwrap();
        assert_eq!(p.karma, 10 + 5 + 3 + 3 + 1);
        assert_eq!(p.confessions_count, 1);
        assert_eq!(p.crushes_sent, 1);
    }

    #[test]
    fn profiles_are_never_dropped_as_the_ledger_grows() {
        let rng = ScriptedRandom::new();
        let (mut ledger, first) = ledger_with_profile(&rng);
        for _ in 0..20_000 {
            ledger.create(Utc::now(), &rng);
        }
        assert_eq!(ledger.len(), 20_001);
        assert_eq!(ledger.get(&first.id), Some(&first));

        let reloaded = ProfileLedger::from_profiles(ledger.profiles());
        assert_eq!(reloaded.len(), 20_001);
    }

    #[test]
    fn removed_reaction_updates_timestamp_without_karma() {
        let rng = ScriptedRandom::new();
        let (mut ledger, profile) = ledger_with_profile(&rng);
        let now = Utc::now();

        let p = ledger.record_reaction(&profile.id, now, false).unwrap();
        assert_eq!(p.karma, STARTING_KARMA);
        assert_eq!(p.reactions_given, 0);
        assert_eq!(p.last_reaction_at, Some(now));

        let p = ledger.record_reaction(&profile.id, now, true).unwrap();
        assert_eq!(p.karma, STARTING_KARMA + 1);
        assert_eq!(p.reactions_given, 1);
    }
}
