//! Demo content for an empty feed.

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;
use whispr_types::models::{
    Confession, ConfessionCategory, ItemCondition, MarketCategory, MarketItem, ReactionKind,
    Reactions,
};

struct SampleAuthor {
    id: &'static str,
    alias: &'static str,
    avatar_index: u32,
    karma: u32,
}

const AUTHORS: [SampleAuthor; 6] = [
    SampleAuthor { id: "sample1", alias: "Midnight Owl", avatar_index: 2, karma: 145 },
    SampleAuthor { id: "sample2", alias: "Neon Ghost", avatar_index: 5, karma: 89 },
    SampleAuthor { id: "sample3", alias: "Pixel Phantom", avatar_index: 8, karma: 320 },
    SampleAuthor { id: "sample4", alias: "Silent Spark", avatar_index: 11, karma: 67 },
    SampleAuthor { id: "sample5", alias: "Arctic Flame", avatar_index: 3, karma: 234 },
    SampleAuthor { id: "sample6", alias: "Velvet Storm", avatar_index: 7, karma: 456 },
];

struct SampleConfession {
    author: usize,
    content: &'static str,
    category: ConfessionCategory,
    /// Reaction counts in fire, heart, laugh, shock, sad order
    reactions: [usize; 5],
    age_minutes: i64,
}

const CONFESSIONS: [SampleConfession; 6] = [
    SampleConfession {
        author: 0,
        content: "I've been sneaking into the library after hours to study because my roommate won't stop playing music. It's actually become my favorite routine.",
        category: ConfessionCategory::Confession,
        reactions: [2, 3, 0, 0, 0],
        age_minutes: 30,
    },
    SampleConfession {
        author: 1,
        content: "Hot take: the dining hall pasta is actually elite and I'm tired of people pretending it isn't",
        category: ConfessionCategory::HotTake,
        reactions: [4, 0, 3, 0, 0],
        age_minutes: 2 * 60,
    },
    SampleConfession {
        author: 2,
        content: "I accidentally called my professor 'mom' today in a 200-person lecture hall. Considering transferring schools.",
        category: ConfessionCategory::Wholesome,
        reactions: [0, 1, 7, 1, 0],
        age_minutes: 5 * 60,
    },
    SampleConfession {
        author: 3,
        content: "The person who always sits behind me in Psych 101... I think about you every day. Your laugh makes the whole lecture worth attending.",
        category: ConfessionCategory::Confession,
        reactions: [0, 6, 0, 0, 1],
        age_minutes: 8 * 60,
    },
    SampleConfession {
        author: 4,
        content: "Unpopular opinion: 8am classes are actually superior because you have the rest of the day free. Morning people rise up.",
        category: ConfessionCategory::HotTake,
        reactions: [2, 0, 0, 7, 0],
        age_minutes: 12 * 60,
    },
    SampleConfession {
        author: 5,
        content: "3am confession: I've been leaving anonymous encouraging notes on people's cars in the parking lot for the past month. Your smiles when you find them make my whole week.",
        category: ConfessionCategory::AfterDark,
        reactions: [0, 9, 0, 0, 0],
        age_minutes: 14 * 60,
    },
];

struct SampleListing {
    seller: usize,
    title: &'static str,
    description: &'static str,
    price: f64,
    category: MarketCategory,
    condition: ItemCondition,
    age_minutes: i64,
}

const LISTINGS: [SampleListing; 5] = [
    SampleListing {
        seller: 0,
        title: "Organic Chemistry Textbook (7th Ed)",
        description: "Barely used, highlighted a few pages. Cheaper than the bookstore.",
        price: 45.0,
        category: MarketCategory::Textbooks,
        condition: ItemCondition::LikeNew,
        age_minutes: 3 * 60,
    },
    SampleListing {
        seller: 2,
        title: "Mini Fridge - Perfect for Dorm",
        description: "Works perfectly, graduating and need to get rid of it fast. Pick up only.",
        price: 60.0,
        category: MarketCategory::Dorm,
        condition: ItemCondition::Good,
        age_minutes: 6 * 60,
    },
    SampleListing {
        seller: 4,
        title: "TI-84 Plus Calculator",
        description: "Still has all the programs loaded for Calc II. Battery included.",
        price: 35.0,
        category: MarketCategory::Electronics,
        condition: ItemCondition::Good,
        age_minutes: 10 * 60,
    },
    SampleListing {
        seller: 1,
        title: "Concert Tickets - Campus Battle of Bands",
        description: "2 tickets for Friday's show. Can't make it anymore.",
        price: 15.0,
        category: MarketCategory::Tickets,
        condition: ItemCondition::New,
        age_minutes: 60,
    },
    SampleListing {
        seller: 5,
        title: "Essay Proofreading Service",
        description: "English major offering proofreading. 24hr turnaround. DM for details.",
        price: 10.0,
        category: MarketCategory::Services,
        condition: ItemCondition::New,
        age_minutes: 4 * 60,
    },
];

/// Placeholder reactor ids, numbered continuously across kinds.
fn sample_reactions(counts: [usize; 5]) -> Reactions {
    let mut reactions = Reactions::default();
    let mut next = 1;
    for (kind, count) in ReactionKind::ALL.iter().copied().zip(counts) {
        let users = reactions.get_mut(kind);
        for _ in 0..count {
            users.insert(format!("s{next}"));
            next += 1;
        }
    }
    reactions
}

/// Sample confessions, oldest first.
pub fn sample_confessions(now: DateTime<Utc>) -> Vec<Confession> {
    let mut items: Vec<Confession> = CONFESSIONS
        .iter()
        .map(|s| {
            let author = &AUTHORS[s.author];
            Confession {
                id: Uuid::new_v4(),
                content: s.content.to_string(),
                author_id: author.id.to_string(),
                author_alias: author.alias.to_string(),
                author_avatar_index: author.avatar_index,
                author_karma: author.karma,
                category: s.category,
                reactions: sample_reactions(s.reactions),
                // No sample comments are seeded
                comment_count: 0,
                is_after_dark: s.category == ConfessionCategory::AfterDark,
                created_at: now - TimeDelta::minutes(s.age_minutes),
                media: None,
            }
        })
        .collect();
    items.sort_by_key(|c| c.created_at);
    items
}

/// Sample listings, oldest first.
pub fn sample_market_items(now: DateTime<Utc>) -> Vec<MarketItem> {
    let mut items: Vec<MarketItem> = LISTINGS
        .iter()
        .map(|s| {
            let seller = &AUTHORS[s.seller];
            MarketItem {
                id: Uuid::new_v4(),
                title: s.title.to_string(),
                description: s.description.to_string(),
                price: s.price,
                category: s.category,
                condition: s.condition,
                seller_id: seller.id.to_string(),
                seller_alias: seller.alias.to_string(),
                seller_karma: seller.karma,
                seller_avatar_index: seller.avatar_index,
                is_sold: false,
                created_at: now - TimeDelta::minutes(s.age_minutes),
                image_urls: Vec::new(),
            }
        })
        .collect();
    items.sort_by_key(|i| i.created_at);
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_are_oldest_first() {
        let now = Utc::now();
        let confessions = sample_confessions(now);
        assert_eq!(confessions.len(), 6);
        assert!(confessions.windows(2).all(|w| w[0].created_at <= w[1].created_at));
        assert!(confessions.iter().all(|c| c.created_at < now));
        assert!(confessions.iter().all(|c| c.comment_count == 0));

        let items = sample_market_items(now);
        assert_eq!(items.len(), 5);
        assert!(items.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[test]
    fn reactor_ids_are_unique_per_confession() {
        let reactions = sample_reactions([2, 3, 0, 0, 1]);
        assert_eq!(reactions.total(), 6);
        assert!(reactions.fire.contains("s1"));
        assert!(reactions.heart.contains("s3"));
        assert!(reactions.sad.contains("s6"));
    }
}
