//! The four bounded collections and their mutations.
//!
//! Collections are kept most-recent-first. Inserts go to the front and the
//! tail is trimmed to the retention cap, so the oldest entries are evicted
//! first. Every mutation computes the complete next entity before a single
//! assignment back into its slot.

use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;
use whispr_types::api::{
    CreateCommentRequest, CreateConfessionRequest, CreateMarketItemRequest, ListConfessionsQuery,
    ListMarketQuery, SendCrushRequest,
};
use whispr_types::models::{
    Comment, Confession, ConfessionCategory, Crush, ItemCondition, MarketCategory, MarketItem,
    Media, MediaType, ParentType, Profile, ReactionKind, Reactions, Snapshot,
};

use crate::clock::is_after_dark;
use crate::cooldown::CooldownGuard;
use crate::error::{Result, StoreError};
use crate::limits::*;
use crate::random::Randomness;
use crate::ranking::sort_trending;
use crate::sanitize::{char_len, floor_count, sanitize_alias, sanitize_text, validate_price};
use crate::seed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Recent,
    Trending,
}

impl SortMode {
    /// Anything other than "trending" reads as recent.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("trending") => Self::Trending,
            _ => Self::Recent,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfessionQuery {
    pub sort: SortMode,
    pub category: Option<ConfessionCategory>,
    pub limit: Option<i64>,
}

impl From<ListConfessionsQuery> for ConfessionQuery {
    fn from(query: ListConfessionsQuery) -> Self {
        Self {
            sort: SortMode::from_param(query.sort.as_deref()),
            // Unknown categories are ignored rather than rejected
            category: query.category.and_then(|c| c.parse().ok()),
            limit: query.limit,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MarketQuery {
    pub category: Option<MarketCategory>,
    pub limit: Option<i64>,
}

impl From<ListMarketQuery> for MarketQuery {
    fn from(query: ListMarketQuery) -> Self {
        Self {
            category: query.category.and_then(|c| c.parse().ok()),
            limit: query.limit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentParent {
    Confession(Uuid),
    Market(Uuid),
}

impl CommentParent {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Confession(id) | Self::Market(id) => *id,
        }
    }

    pub fn parent_type(&self) -> ParentType {
        match self {
            Self::Confession(_) => ParentType::Confession,
            Self::Market(_) => ParentType::Market,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionStatus {
    Added,
    Removed,
    /// Cooldown still active; nothing changed
    Throttled,
    /// Authors cannot react to their own confession; nothing changed
    OwnPost,
}

#[derive(Debug, Clone)]
pub struct ReactionOutcome {
    pub confession: Confession,
    pub kind: ReactionKind,
    pub status: ReactionStatus,
}

impl ReactionOutcome {
    pub fn added(&self) -> bool {
        self.status == ReactionStatus::Added
    }

    /// Whether the reaction sets actually changed.
    pub fn applied(&self) -> bool {
        matches!(self.status, ReactionStatus::Added | ReactionStatus::Removed)
    }
}

/// Author details embedded into content at creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub alias: String,
    pub avatar_index: u32,
    pub karma: u32,
}

impl Author {
    /// Prefer the ledger's profile; fall back to sanitized client values.
    pub fn resolve(profile: Option<&Profile>, alias: &str, avatar: Option<f64>, karma: Option<f64>) -> Self {
        match profile {
            Some(p) => Self {
                alias: p.alias.clone(),
                avatar_index: p.avatar_index,
                karma: p.karma,
            },
            None => Self {
                alias: sanitize_alias(alias),
                avatar_index: floor_count(avatar),
                karma: floor_count(karma),
            },
        }
    }
}

#[derive(Debug, Default)]
pub struct ContentStore {
    confessions: VecDeque<Confession>,
    crushes: VecDeque<Crush>,
    market_items: VecDeque<MarketItem>,
    comments: VecDeque<Comment>,
    cooldown: CooldownGuard,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted state, dropping duplicate ids and anything past
    /// the retention caps.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut store = Self {
            confessions: dedup_capped(snapshot.confessions, MAX_CONFESSIONS, |c| c.id),
            crushes: dedup_capped(snapshot.crushes, MAX_CRUSHES, |c| c.id),
            market_items: dedup_capped(snapshot.market_items, MAX_MARKET_ITEMS, |i| i.id),
            comments: dedup_capped(snapshot.comments, MAX_COMMENTS, |c| c.id),
            cooldown: CooldownGuard::default(),
        };
        for profile in &snapshot.profiles {
            if let Some(last) = profile.last_reaction_at {
                store.cooldown.restore(&profile.id, last);
            }
        }
        store
    }

    /// Copy of all collections; profiles are filled in by the caller.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            confessions: self.confessions.iter().cloned().collect(),
            crushes: self.crushes.iter().cloned().collect(),
            market_items: self.market_items.iter().cloned().collect(),
            comments: self.comments.iter().cloned().collect(),
            profiles: Vec::new(),
        }
    }

    pub fn confession_count(&self) -> usize {
        self.confessions.len()
    }

    pub fn crush_count(&self) -> usize {
        self.crushes.len()
    }

    pub fn market_count(&self) -> usize {
        self.market_items.len()
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    pub fn confession(&self, id: Uuid) -> Option<&Confession> {
        self.confessions.iter().find(|c| c.id == id)
    }

    pub fn market_item(&self, id: Uuid) -> Option<&MarketItem> {
        self.market_items.iter().find(|i| i.id == id)
    }

    // -- Confessions --

    pub fn list_confessions(&self, query: &ConfessionQuery, now: DateTime<Utc>) -> Vec<Confession> {
        let limit = clamp_limit(query.limit, MAX_CONFESSION_PAGE);
        let mut items: Vec<Confession> = self
            .confessions
            .iter()
            .filter(|c| query.category.is_none_or(|cat| c.category == cat))
            .cloned()
            .collect();

        items = match query.sort {
            SortMode::Trending => sort_trending(items, now),
            SortMode::Recent => {
                items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                items
            }
        };
        items.truncate(limit);
        items
    }

    pub fn create_confession(
        &mut self,
        req: &CreateConfessionRequest,
        author: Author,
        now: DateTime<Utc>,
    ) -> Result<Confession> {
        let author_id = require_caller(&req.author_id)?;
        let category: ConfessionCategory = req
            .category
            .parse()
            .map_err(|_| StoreError::Invalid("unknown confession category"))?;
        let media = parse_media(req)?;

        let content = sanitize_text(&req.content, MAX_CONFESSION_LENGTH);
        if char_len(&content) < MIN_CONFESSION_LENGTH && media.is_none() {
            return Err(StoreError::Invalid("confession is too short"));
        }

        let is_after_dark = category == ConfessionCategory::AfterDark
            || req.is_after_dark.unwrap_or_else(|| is_after_dark(now));

        let confession = Confession {
            id: Uuid::new_v4(),
            content,
            author_id,
            author_alias: author.alias,
            author_avatar_index: author.avatar_index,
            author_karma: author.karma,
            category,
            reactions: Reactions::default(),
            comment_count: 0,
            is_after_dark,
            created_at: now,
            media,
        };

        push_capped(&mut self.confessions, confession.clone(), MAX_CONFESSIONS);
        Ok(confession)
    }

    pub fn delete_confession(&mut self, id: Uuid, author_id: &str) -> Result<Confession> {
        let idx = self
            .confessions
            .iter()
            .position(|c| c.id == id && c.author_id == author_id)
            .ok_or(StoreError::NotFound)?;
        self.confessions.remove(idx).ok_or(StoreError::NotFound)
    }

    pub fn toggle_reaction(
        &mut self,
        confession_id: Uuid,
        user_id: &str,
        reaction_type: &str,
        now: DateTime<Utc>,
    ) -> Result<ReactionOutcome> {
        let kind: ReactionKind = reaction_type
            .parse()
            .map_err(|_| StoreError::Invalid("unknown reaction type"))?;
        let user_id = require_caller(user_id)?;

        let idx = self
            .confessions
            .iter()
            .position(|c| c.id == confession_id)
            .ok_or(StoreError::NotFound)?;
        let current = &self.confessions[idx];

        if current.author_id == user_id {
            return Ok(ReactionOutcome {
                confession: current.clone(),
                kind,
                status: ReactionStatus::OwnPost,
            });
        }
        if self.cooldown.is_cooling(&user_id, now) {
            debug!("Reaction from {} throttled", user_id);
            return Ok(ReactionOutcome {
                confession: current.clone(),
                kind,
                status: ReactionStatus::Throttled,
            });
        }

        let mut next = current.clone();
        let users = next.reactions.get_mut(kind);
        let added = if users.remove(&user_id) {
            false
        } else {
            users.insert(user_id.clone());
            true
        };
        self.confessions[idx] = next.clone();
        self.cooldown.record(&user_id, now);

        Ok(ReactionOutcome {
            confession: next,
            kind,
            status: if added { ReactionStatus::Added } else { ReactionStatus::Removed },
        })
    }

    // -- Crushes --

    /// The caller's own crushes, newest first.
    pub fn list_crushes(&self, user_id: &str) -> Vec<Crush> {
        let mut items: Vec<Crush> = self
            .crushes
            .iter()
            .filter(|c| c.from_user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(MAX_CRUSHES);
        items
    }

    pub fn send_crush(
        &mut self,
        req: &SendCrushRequest,
        now: DateTime<Utc>,
        rng: &dyn Randomness,
    ) -> Result<Crush> {
        let from_user_id = require_caller(&req.from_user_id)?;
        let to_alias = sanitize_text(&req.to_alias, MAX_ALIAS_LENGTH);
        if char_len(&to_alias) < MIN_CRUSH_ALIAS_LENGTH {
            return Err(StoreError::Invalid("crush alias is too short"));
        }
        let message = sanitize_text(&req.message, MAX_CRUSH_MESSAGE_LENGTH);

        let target = to_alias.to_lowercase();
        let duplicate = self
            .crushes
            .iter()
            .any(|c| c.from_user_id == from_user_id && c.to_alias.to_lowercase() == target);
        if duplicate {
            return Err(StoreError::Invalid("crush already sent to this alias"));
        }

        let crush = Crush {
            id: Uuid::new_v4(),
            from_user_id,
            to_alias,
            message,
            is_revealed: false,
            // Decided once here and never recomputed
            is_mutual: rng.chance(MUTUAL_CRUSH_CHANCE),
            created_at: now,
        };

        push_capped(&mut self.crushes, crush.clone(), MAX_CRUSHES);
        Ok(crush)
    }

    /// Mark a crush revealed. Returns the crush and whether this call flipped it.
    pub fn reveal_crush(&mut self, id: Uuid, owner_id: &str) -> Result<(Crush, bool)> {
        let idx = self
            .crushes
            .iter()
            .position(|c| c.id == id && c.from_user_id == owner_id)
            .ok_or(StoreError::NotFound)?;
        let current = &self.crushes[idx];
        if current.is_revealed {
            return Ok((current.clone(), false));
        }
        let next = Crush {
            is_revealed: true,
            ..current.clone()
        };
        self.crushes[idx] = next.clone();
        Ok((next, true))
    }

    pub fn delete_crush(&mut self, id: Uuid, owner_id: &str) -> Result<Crush> {
        let idx = self
            .crushes
            .iter()
            .position(|c| c.id == id && c.from_user_id == owner_id)
            .ok_or(StoreError::NotFound)?;
        self.crushes.remove(idx).ok_or(StoreError::NotFound)
    }

    // -- Marketplace --

    pub fn list_market_items(&self, query: &MarketQuery) -> Vec<MarketItem> {
        let limit = clamp_limit(query.limit, MAX_MARKET_PAGE);
        let mut items: Vec<MarketItem> = self
            .market_items
            .iter()
            .filter(|i| query.category.is_none_or(|cat| i.category == cat))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(limit);
        items
    }

    pub fn create_market_item(
        &mut self,
        req: &CreateMarketItemRequest,
        seller: Author,
        now: DateTime<Utc>,
    ) -> Result<MarketItem> {
        let seller_id = require_caller(&req.seller_id)?;
        let title = sanitize_text(&req.title, MAX_TITLE_LENGTH);
        if char_len(&title) < MIN_TITLE_LENGTH {
            return Err(StoreError::Invalid("title is too short"));
        }
        let description = sanitize_text(&req.description, MAX_DESCRIPTION_LENGTH);
        let category: MarketCategory = req
            .category
            .parse()
            .map_err(|_| StoreError::Invalid("unknown market category"))?;
        let condition: ItemCondition = req
            .condition
            .parse()
            .map_err(|_| StoreError::Invalid("unknown item condition"))?;
        let price = validate_price(req.price);
        if price <= 0.0 {
            return Err(StoreError::Invalid("price must be positive"));
        }

        let image_urls = req
            .image_urls
            .iter()
            .map(|url| sanitize_text(url, MAX_URL_LENGTH))
            .filter(|url| !url.is_empty())
            .take(MAX_MARKET_IMAGES)
            .collect();

        let item = MarketItem {
            id: Uuid::new_v4(),
            title,
            description,
            price,
            category,
            condition,
            seller_id,
            seller_alias: seller.alias,
            seller_karma: seller.karma,
            seller_avatar_index: seller.avatar_index,
            is_sold: false,
            created_at: now,
            image_urls,
        };

        push_capped(&mut self.market_items, item.clone(), MAX_MARKET_ITEMS);
        Ok(item)
    }

    pub fn toggle_sold(&mut self, id: Uuid, seller_id: &str) -> Result<MarketItem> {
        let idx = self
            .market_items
            .iter()
            .position(|i| i.id == id && i.seller_id == seller_id)
            .ok_or(StoreError::NotFound)?;
        let current = &self.market_items[idx];
        let next = MarketItem {
            is_sold: !current.is_sold,
            ..current.clone()
        };
        self.market_items[idx] = next.clone();
        Ok(next)
    }

    pub fn delete_market_item(&mut self, id: Uuid, seller_id: &str) -> Result<MarketItem> {
        let idx = self
            .market_items
            .iter()
            .position(|i| i.id == id && i.seller_id == seller_id)
            .ok_or(StoreError::NotFound)?;
        self.market_items.remove(idx).ok_or(StoreError::NotFound)
    }

    // -- Comments --

    pub fn list_comments(&self, parent: CommentParent, limit: Option<i64>) -> Vec<Comment> {
        let limit = clamp_limit(limit, MAX_COMMENT_PAGE);
        let mut items: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| c.parent_id == parent.id() && c.parent_type == parent.parent_type())
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(limit);
        items
    }

    pub fn create_comment(
        &mut self,
        req: &CreateCommentRequest,
        author: Author,
        now: DateTime<Utc>,
    ) -> Result<Comment> {
        let author_id = require_caller(&req.author_id)?;
        let content = sanitize_text(&req.content, MAX_COMMENT_LENGTH);
        if content.is_empty() {
            return Err(StoreError::Invalid("comment is empty"));
        }

        let parent = match (req.confession_id, req.market_item_id) {
            (Some(id), None) => CommentParent::Confession(id),
            (None, Some(id)) => CommentParent::Market(id),
            _ => return Err(StoreError::Invalid("comment needs exactly one parent")),
        };

        // Resolve the parent before touching anything
        let confession_idx = match parent {
            CommentParent::Confession(id) => Some(
                self.confessions
                    .iter()
                    .position(|c| c.id == id)
                    .ok_or(StoreError::NotFound)?,
            ),
            CommentParent::Market(id) => {
                self.market_item(id).ok_or(StoreError::NotFound)?;
                None
            }
        };

        let comment = Comment {
            id: Uuid::new_v4(),
            parent_id: parent.id(),
            parent_type: parent.parent_type(),
            content,
            author_id,
            author_alias: author.alias,
            author_avatar_index: author.avatar_index,
            author_karma: author.karma,
            created_at: now,
            likes: 0,
        };

        if let Some(idx) = confession_idx {
            let current = &self.confessions[idx];
            let next = Confession {
                comment_count: current.comment_count.saturating_add(1),
                ..current.clone()
            };
            self.confessions[idx] = next;
        }
        for evicted in push_capped(&mut self.comments, comment.clone(), MAX_COMMENTS) {
            self.release_comment_count(&evicted);
        }
        Ok(comment)
    }

    pub fn delete_comment(&mut self, id: Uuid, author_id: &str) -> Result<Comment> {
        let idx = self
            .comments
            .iter()
            .position(|c| c.id == id && c.author_id == author_id)
            .ok_or(StoreError::NotFound)?;
        let removed = self.comments.remove(idx).ok_or(StoreError::NotFound)?;
        self.release_comment_count(&removed);
        Ok(removed)
    }

    /// Drop one from the parent confession's counter once a comment is gone.
    fn release_comment_count(&mut self, comment: &Comment) {
        if comment.parent_type != ParentType::Confession {
            return;
        }
        if let Some(slot) = self.confessions.iter_mut().find(|c| c.id == comment.parent_id) {
            let next = Confession {
                comment_count: slot.comment_count.saturating_sub(1),
                ..slot.clone()
            };
            *slot = next;
        }
    }

    // -- Samples --

    /// Insert demo content when the feed is empty. Returns whether it did.
    pub fn seed_if_empty(&mut self, now: DateTime<Utc>) -> bool {
        if !self.confessions.is_empty() {
            return false;
        }
        for confession in seed::sample_confessions(now) {
            push_capped(&mut self.confessions, confession, MAX_CONFESSIONS);
        }
        if self.market_items.is_empty() {
            for item in seed::sample_market_items(now) {
                push_capped(&mut self.market_items, item, MAX_MARKET_ITEMS);
            }
        }
        true
    }
}

fn require_caller(id: &str) -> Result<String> {
    let id = id.trim();
    if id.is_empty() {
        return Err(StoreError::Invalid("missing caller id"));
    }
    Ok(id.to_string())
}

fn parse_media(req: &CreateConfessionRequest) -> Result<Option<Media>> {
    let Some(url) = req
        .media_url
        .as_deref()
        .map(|u| sanitize_text(u, MAX_URL_LENGTH))
        .filter(|u| !u.is_empty())
    else {
        return Ok(None);
    };
    let media_type = match req.media_type.as_deref() {
        Some(t) => t
            .parse()
            .map_err(|_| StoreError::Invalid("unknown media type"))?,
        None => MediaType::Image,
    };
    let media_thumbnail = req
        .media_thumbnail
        .as_deref()
        .map(|t| sanitize_text(t, MAX_URL_LENGTH))
        .filter(|t| !t.is_empty());
    Ok(Some(Media {
        media_url: url,
        media_type,
        media_thumbnail,
    }))
}

/// Insert at the head and trim the tail to `cap`, returning what was evicted.
fn push_capped<T>(items: &mut VecDeque<T>, item: T, cap: usize) -> Vec<T> {
    items.push_front(item);
    if items.len() <= cap {
        return Vec::new();
    }
    debug!("Evicting {} oldest entries past retention cap {}", items.len() - cap, cap);
    items.drain(cap..).collect()
}

fn dedup_capped<T>(items: Vec<T>, cap: usize, id: impl Fn(&T) -> Uuid) -> VecDeque<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(id(item)))
        .take(cap)
        .collect()
}
