use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error returned when a wire string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

/// Generates a kebab-case string enum with `as_str`, `ALL`, `FromStr` and `Display`.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(UnknownVariant { kind: $kind, value: other.to_string() }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum!(
    /// Feed category a confession is posted under.
    ConfessionCategory, "confession category" {
        Confession => "confession",
        HotTake => "hot-take",
        Rant => "rant",
        Wholesome => "wholesome",
        AfterDark => "after-dark",
    }
);

wire_enum!(ReactionKind, "reaction type" {
    Fire => "fire",
    Heart => "heart",
    Laugh => "laugh",
    Shock => "shock",
    Sad => "sad",
});

wire_enum!(MarketCategory, "market category" {
    Textbooks => "textbooks",
    Electronics => "electronics",
    Dorm => "dorm",
    Clothing => "clothing",
    Services => "services",
    Tickets => "tickets",
    Other => "other",
});

wire_enum!(ItemCondition, "item condition" {
    New => "new",
    LikeNew => "like-new",
    Good => "good",
    Fair => "fair",
});

wire_enum!(MediaType, "media type" {
    Image => "image",
    Video => "video",
});

wire_enum!(ParentType, "comment parent type" {
    Confession => "confession",
    Market => "market",
});

/// Per-kind sets of user ids that reacted to a confession.
///
/// Every kind is a struct field, so all five kinds are always present and a
/// user id can appear at most once per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reactions {
    pub fire: BTreeSet<String>,
    pub heart: BTreeSet<String>,
    pub laugh: BTreeSet<String>,
    pub shock: BTreeSet<String>,
    pub sad: BTreeSet<String>,
}

impl Reactions {
    pub fn get(&self, kind: ReactionKind) -> &BTreeSet<String> {
        match kind {
            ReactionKind::Fire => &self.fire,
            ReactionKind::Heart => &self.heart,
            ReactionKind::Laugh => &self.laugh,
            ReactionKind::Shock => &self.shock,
            ReactionKind::Sad => &self.sad,
        }
    }

    pub fn get_mut(&mut self, kind: ReactionKind) -> &mut BTreeSet<String> {
        match kind {
            ReactionKind::Fire => &mut self.fire,
            ReactionKind::Heart => &mut self.heart,
            ReactionKind::Laugh => &mut self.laugh,
            ReactionKind::Shock => &mut self.shock,
            ReactionKind::Sad => &mut self.sad,
        }
    }

    pub fn count(&self, kind: ReactionKind) -> usize {
        self.get(kind).len()
    }

    pub fn total(&self) -> usize {
        ReactionKind::ALL.iter().map(|k| self.count(*k)).sum()
    }
}

/// Optional media attached to a confession.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub media_url: String,
    pub media_type: MediaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_thumbnail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confession {
    pub id: Uuid,
    pub content: String,
    pub author_id: String,
    pub author_alias: String,
    pub author_avatar_index: u32,
    pub author_karma: u32,
    pub category: ConfessionCategory,
    pub reactions: Reactions,
    pub comment_count: u32,
    pub is_after_dark: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, flatten, skip_serializing_if = "Option::is_none")]
    pub media: Option<Media>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crush {
    pub id: Uuid,
    pub from_user_id: String,
    pub to_alias: String,
    pub message: String,
    pub is_revealed: bool,
    pub is_mutual: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Always rounded to cents and within `(0, MAX_PRICE]`.
    pub price: f64,
    pub category: MarketCategory,
    pub condition: ItemCondition,
    pub seller_id: String,
    pub seller_alias: String,
    pub seller_karma: u32,
    pub seller_avatar_index: u32,
    pub is_sold: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub parent_id: Uuid,
    pub parent_type: ParentType,
    pub content: String,
    pub author_id: String,
    pub author_alias: String,
    pub author_avatar_index: u32,
    pub author_karma: u32,
    pub created_at: DateTime<Utc>,
    pub likes: u32,
}

/// Anonymous per-device identity. The id is a bearer token the client keeps;
/// nothing ties it to a real person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub alias: String,
    pub avatar_index: u32,
    pub karma: u32,
    pub confessions_count: u32,
    pub reactions_given: u32,
    pub crushes_sent: u32,
    pub matches_revealed: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_reaction_at: Option<DateTime<Utc>>,
}

/// Cosmetic reputation tier derived from karma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KarmaLevel {
    Low,
    Medium,
    High,
    Legendary,
}

impl KarmaLevel {
    pub fn from_karma(karma: u32) -> Self {
        match karma {
            500.. => Self::Legendary,
            200.. => Self::High,
            50.. => Self::Medium,
            _ => Self::Low,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Legendary => "Campus Legend",
            Self::High => "Whispr Elite",
            Self::Medium => "Regular",
            Self::Low => "Newcomer",
        }
    }
}

/// Everything the store persists, in collection order (most recent first).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub confessions: Vec<Confession>,
    #[serde(default)]
    pub crushes: Vec<Crush>,
    #[serde(default)]
    pub market_items: Vec<MarketItem>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_parse_from_wire_names() {
        assert_eq!("hot-take".parse(), Ok(ConfessionCategory::HotTake));
        assert_eq!("after-dark".parse(), Ok(ConfessionCategory::AfterDark));
        assert!("gossip".parse::<ConfessionCategory>().is_err());
        assert_eq!("like-new".parse(), Ok(ItemCondition::LikeNew));
    }

    #[test]
    fn empty_reactions_serialize_all_kinds() {
        let json = serde_json::to_value(Reactions::default()).unwrap();
        for kind in ReactionKind::ALL {
            assert_eq!(json[kind.as_str()], serde_json::json!([]));
        }
    }

    #[test]
    fn karma_levels() {
        assert_eq!(KarmaLevel::from_karma(0), KarmaLevel::Low);
        assert_eq!(KarmaLevel::from_karma(49), KarmaLevel::Low);
        assert_eq!(KarmaLevel::from_karma(50), KarmaLevel::Medium);
        assert_eq!(KarmaLevel::from_karma(200).title(), "Whispr Elite");
        assert_eq!(KarmaLevel::from_karma(9000), KarmaLevel::Legendary);
    }

    #[test]
    fn confession_media_is_flattened() {
        let confession = Confession {
            id: Uuid::nil(),
            content: "look at this".into(),
            author_id: "u1".into(),
            author_alias: "Nova Dust".into(),
            author_avatar_index: 1,
            author_karma: 10,
            category: ConfessionCategory::Rant,
            reactions: Reactions::default(),
            comment_count: 0,
            is_after_dark: false,
            created_at: DateTime::default(),
            media: Some(Media {
                media_url: "/uploads/a.jpg".into(),
                media_type: MediaType::Image,
                media_thumbnail: None,
            }),
        };
        let json = serde_json::to_value(&confession).unwrap();
        assert_eq!(json["mediaUrl"], "/uploads/a.jpg");
        assert_eq!(json["mediaType"], "image");
        assert_eq!(json["commentCount"], 0);
    }
}
