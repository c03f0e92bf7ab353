use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Comment, Confession, Crush, MarketItem, ReactionKind};

/// Public projection of a crush. Sender id and message stay private.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrushNotice {
    pub id: Uuid,
    pub to_alias: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Crush> for CrushNotice {
    fn from(crush: &Crush) -> Self {
        Self {
            id: crush.id,
            to_alias: crush.to_alias.clone(),
            created_at: crush.created_at,
        }
    }
}

/// Content mutations pushed to realtime observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum EventKind {
    /// Greeting sent to every newly connected observer
    #[serde(rename = "hello")]
    Hello,

    #[serde(rename = "confession:new")]
    ConfessionCreate(Confession),

    #[serde(rename = "confession:reaction", rename_all = "camelCase")]
    ConfessionReaction {
        confession_id: Uuid,
        reaction_type: ReactionKind,
        added: bool,
    },

    #[serde(rename = "confession:delete")]
    ConfessionDelete { id: Uuid },

    #[serde(rename = "crush:new")]
    CrushCreate(CrushNotice),

    #[serde(rename = "market:new")]
    MarketCreate(MarketItem),

    /// Sold flag toggled
    #[serde(rename = "market:update")]
    MarketUpdate(MarketItem),

    #[serde(rename = "market:delete")]
    MarketDelete { id: Uuid },

    #[serde(rename = "comment:new")]
    CommentCreate(Comment),

    #[serde(rename = "comment:delete", rename_all = "camelCase")]
    CommentDelete { id: Uuid, parent_id: Uuid },
}

/// Event envelope as sent over the wire: `{type, payload, timestamp}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayEvent {
    #[serde(flatten)]
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
}

impl GatewayEvent {
    pub fn new(kind: EventKind, timestamp: DateTime<Utc>) -> Self {
        Self { kind, timestamp }
    }

    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            EventKind::Hello => "hello",
            EventKind::ConfessionCreate(_) => "confession:new",
            EventKind::ConfessionReaction { .. } => "confession:reaction",
            EventKind::ConfessionDelete { .. } => "confession:delete",
            EventKind::CrushCreate(_) => "crush:new",
            EventKind::MarketCreate(_) => "market:new",
            EventKind::MarketUpdate(_) => "market:update",
            EventKind::MarketDelete { .. } => "market:delete",
            EventKind::CommentCreate(_) => "comment:new",
            EventKind::CommentDelete { .. } => "comment:delete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_has_type_payload_and_timestamp() {
        let event = GatewayEvent::new(
            EventKind::ConfessionReaction {
                confession_id: Uuid::nil(),
                reaction_type: ReactionKind::Fire,
                added: true,
            },
            DateTime::default(),
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "confession:reaction");
        assert_eq!(json["payload"]["reactionType"], "fire");
        assert_eq!(json["payload"]["added"], true);
        assert!(json["timestamp"].is_string());
        assert_eq!(event.type_name(), "confession:reaction");
    }

    #[test]
    fn hello_has_no_payload() {
        let json = serde_json::to_value(GatewayEvent::new(EventKind::Hello, DateTime::default())).unwrap();
        assert_eq!(json["type"], "hello");
        assert!(json.get("payload").is_none());
    }
}
