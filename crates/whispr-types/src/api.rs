//! Request and response bodies of the JSON API.
//!
//! Enum-valued fields arrive as plain strings and are validated by the store,
//! so an unknown category is a rejected creation rather than a decode error.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Confession, KarmaLevel, Profile};

// -- Confessions --

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConfessionRequest {
    pub content: String,
    pub author_id: String,
    #[serde(default)]
    pub author_alias: String,
    #[serde(default)]
    pub author_avatar_index: Option<f64>,
    #[serde(default)]
    pub author_karma: Option<f64>,
    pub category: String,
    #[serde(default)]
    pub is_after_dark: Option<bool>,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub media_thumbnail: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleReactionRequest {
    pub user_id: String,
    pub reaction_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToggleReactionResponse {
    pub confession: Confession,
    pub added: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListConfessionsQuery {
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

// -- Crushes --

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCrushRequest {
    pub from_user_id: String,
    pub to_alias: String,
    #[serde(default)]
    pub message: String,
}

// -- Marketplace --

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMarketItemRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub category: String,
    pub condition: String,
    pub seller_id: String,
    #[serde(default)]
    pub seller_alias: String,
    #[serde(default)]
    pub seller_karma: Option<f64>,
    #[serde(default)]
    pub seller_avatar_index: Option<f64>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSoldRequest {
    pub seller_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMarketQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

// -- Comments --

/// Comment body. The parent comes from the route path, so callers of the
/// store fill in exactly one of `confession_id` / `market_item_id`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub confession_id: Option<Uuid>,
    #[serde(default)]
    pub market_item_id: Option<Uuid>,
    pub content: String,
    pub author_id: String,
    #[serde(default)]
    pub author_alias: String,
    #[serde(default)]
    pub author_avatar_index: Option<f64>,
    #[serde(default)]
    pub author_karma: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCommentRequest {
    pub author_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitQuery {
    #[serde(default)]
    pub limit: Option<i64>,
}

// -- Profiles --

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub avatar_index: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub profile: Profile,
    pub karma_level: KarmaLevel,
    pub karma_title: &'static str,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        let level = KarmaLevel::from_karma(profile.karma);
        Self {
            profile,
            karma_level: level,
            karma_title: level.title(),
        }
    }
}

// -- Misc --

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub name: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}
