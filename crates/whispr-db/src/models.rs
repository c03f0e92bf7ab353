//! Database row types. These map directly to SQLite rows and stay separate
//! from the whispr-types models; ids, enums and timestamps are kept as text.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use whispr_types::models::{Comment, Confession, Crush, MarketItem, Media, Profile};

pub struct ConfessionRow {
    pub id: String,
    pub content: String,
    pub author_id: String,
    pub author_alias: String,
    pub author_avatar_index: u32,
    pub author_karma: u32,
    pub category: String,
    /// JSON object of reaction kind to user ids
    pub reactions: String,
    pub comment_count: u32,
    pub is_after_dark: bool,
    pub media_url: Option<String>,
    pub media_type: Option<String>,
    pub media_thumbnail: Option<String>,
    pub created_at: String,
}

pub struct CrushRow {
    pub id: String,
    pub from_user_id: String,
    pub to_alias: String,
    pub message: String,
    pub is_revealed: bool,
    pub is_mutual: bool,
    pub created_at: String,
}

pub struct MarketItemRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub condition: String,
    pub seller_id: String,
    pub seller_alias: String,
    pub seller_karma: u32,
    pub seller_avatar_index: u32,
    pub is_sold: bool,
    /// JSON array
    pub image_urls: String,
    pub created_at: String,
}

pub struct CommentRow {
    pub id: String,
    pub parent_id: String,
    pub parent_type: String,
    pub content: String,
    pub author_id: String,
    pub author_alias: String,
    pub author_avatar_index: u32,
    pub author_karma: u32,
    pub likes: u32,
    pub created_at: String,
}

pub struct ProfileRow {
    pub id: String,
    pub alias: String,
    pub avatar_index: u32,
    pub karma: u32,
    pub confessions_count: u32,
    pub reactions_given: u32,
    pub crushes_sent: u32,
    pub matches_revealed: u32,
    pub last_reaction_at: Option<String>,
    pub created_at: String,
}

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).with_context(|| format!("bad id {raw:?}"))
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .with_context(|| format!("bad timestamp {raw:?}"))
}

fn format_time(at: &DateTime<Utc>) -> String {
    at.to_rfc3339()
}

impl From<&Confession> for ConfessionRow {
    fn from(c: &Confession) -> Self {
        Self {
            id: c.id.to_string(),
            content: c.content.clone(),
            author_id: c.author_id.clone(),
            author_alias: c.author_alias.clone(),
            author_avatar_index: c.author_avatar_index,
            author_karma: c.author_karma,
            category: c.category.as_str().to_string(),
            // Serializing plain string sets cannot fail
            reactions: serde_json::to_string(&c.reactions).unwrap_or_else(|_| "{}".into()),
            comment_count: c.comment_count,
            is_after_dark: c.is_after_dark,
            media_url: c.media.as_ref().map(|m| m.media_url.clone()),
            media_type: c.media.as_ref().map(|m| m.media_type.as_str().to_string()),
            media_thumbnail: c.media.as_ref().and_then(|m| m.media_thumbnail.clone()),
            created_at: format_time(&c.created_at),
        }
    }
}

impl TryFrom<ConfessionRow> for Confession {
    type Error = anyhow::Error;

    fn try_from(row: ConfessionRow) -> Result<Self> {
        let media = match (row.media_url, row.media_type) {
            (Some(media_url), Some(media_type)) => Some(Media {
                media_url,
                media_type: media_type.parse()?,
                media_thumbnail: row.media_thumbnail,
            }),
            (None, _) => None,
            (Some(_), None) => return Err(anyhow!("media url without type")),
        };
        Ok(Self {
            id: parse_id(&row.id)?,
            content: row.content,
            author_id: row.author_id,
            author_alias: row.author_alias,
            author_avatar_index: row.author_avatar_index,
            author_karma: row.author_karma,
            category: row.category.parse()?,
            reactions: serde_json::from_str(&row.reactions).context("bad reactions")?,
            comment_count: row.comment_count,
            is_after_dark: row.is_after_dark,
            created_at: parse_time(&row.created_at)?,
            media,
        })
    }
}

impl From<&Crush> for CrushRow {
    fn from(c: &Crush) -> Self {
        Self {
            id: c.id.to_string(),
            from_user_id: c.from_user_id.clone(),
            to_alias: c.to_alias.clone(),
            message: c.message.clone(),
            is_revealed: c.is_revealed,
            is_mutual: c.is_mutual,
            created_at: format_time(&c.created_at),
        }
    }
}

impl TryFrom<CrushRow> for Crush {
    type Error = anyhow::Error;

    fn try_from(row: CrushRow) -> Result<Self> {
        Ok(Self {
            id: parse_id(&row.id)?,
            from_user_id: row.from_user_id,
            to_alias: row.to_alias,
            message: row.message,
            is_revealed: row.is_revealed,
            is_mutual: row.is_mutual,
            created_at: parse_time(&row.created_at)?,
        })
    }
}

impl From<&MarketItem> for MarketItemRow {
    fn from(i: &MarketItem) -> Self {
        Self {
            id: i.id.to_string(),
            title: i.title.clone(),
            description: i.description.clone(),
            price: i.price,
            category: i.category.as_str().to_string(),
            condition: i.condition.as_str().to_string(),
            seller_id: i.seller_id.clone(),
            seller_alias: i.seller_alias.clone(),
            seller_karma: i.seller_karma,
            seller_avatar_index: i.seller_avatar_index,
            is_sold: i.is_sold,
            image_urls: serde_json::to_string(&i.image_urls).unwrap_or_else(|_| "[]".into()),
            created_at: format_time(&i.created_at),
        }
    }
}

impl TryFrom<MarketItemRow> for MarketItem {
    type Error = anyhow::Error;

    fn try_from(row: MarketItemRow) -> Result<Self> {
        Ok(Self {
            id: parse_id(&row.id)?,
            title: row.title,
            description: row.description,
            price: row.price,
            category: row.category.parse()?,
            condition: row.condition.parse()?,
            seller_id: row.seller_id,
            seller_alias: row.seller_alias,
            seller_karma: row.seller_karma,
            seller_avatar_index: row.seller_avatar_index,
            is_sold: row.is_sold,
            created_at: parse_time(&row.created_at)?,
            image_urls: serde_json::from_str(&row.image_urls).context("bad image urls")?,
        })
    }
}

impl From<&Comment> for CommentRow {
    fn from(c: &Comment) -> Self {
        Self {
            id: c.id.to_string(),
            parent_id: c.parent_id.to_string(),
            parent_type: c.parent_type.as_str().to_string(),
            content: c.content.clone(),
            author_id: c.author_id.clone(),
            author_alias: c.author_alias.clone(),
            author_avatar_index: c.author_avatar_index,
            author_karma: c.author_karma,
            likes: c.likes,
            created_at: format_time(&c.created_at),
        }
    }
}

impl TryFrom<CommentRow> for Comment {
    type Error = anyhow::Error;

    fn try_from(row: CommentRow) -> Result<Self> {
        Ok(Self {
            id: parse_id(&row.id)?,
            parent_id: parse_id(&row.parent_id)?,
            parent_type: row.parent_type.parse()?,
            content: row.content,
            author_id: row.author_id,
            author_alias: row.author_alias,
            author_avatar_index: row.author_avatar_index,
            author_karma: row.author_karma,
            created_at: parse_time(&row.created_at)?,
            likes: row.likes,
        })
    }
}

impl From<&Profile> for ProfileRow {
    fn from(p: &Profile) -> Self {
        Self {
            id: p.id.clone(),
            alias: p.alias.clone(),
            avatar_index: p.avatar_index,
            karma: p.karma,
            confessions_count: p.confessions_count,
            reactions_given: p.reactions_given,
            crushes_sent: p.crushes_sent,
            matches_revealed: p.matches_revealed,
            last_reaction_at: p.last_reaction_at.as_ref().map(format_time),
            created_at: format_time(&p.created_at),
        }
    }
}

impl TryFrom<ProfileRow> for Profile {
    type Error = anyhow::Error;

    fn try_from(row: ProfileRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            alias: row.alias,
            avatar_index: row.avatar_index,
            karma: row.karma,
            confessions_count: row.confessions_count,
            reactions_given: row.reactions_given,
            crushes_sent: row.crushes_sent,
            matches_revealed: row.matches_revealed,
            created_at: parse_time(&row.created_at)?,
            last_reaction_at: row.last_reaction_at.as_deref().map(parse_time).transpose()?,
        })
    }
}
