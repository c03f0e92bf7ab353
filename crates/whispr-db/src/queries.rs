use crate::Database;
use crate::models::{CommentRow, ConfessionRow, CrushRow, MarketItemRow, ProfileRow};
use anyhow::Result;
use rusqlite::{Connection, Row, Transaction, params};
use tracing::{debug, warn};
use whispr_types::models::Snapshot;

impl Database {
    pub fn load_snapshot(&self) -> Result<Snapshot> {
        self.with_conn(|conn| {
            Ok(Snapshot {
                confessions: load_rows(
                    conn,
                    "confessions",
                    "SELECT id, content, author_id, author_alias, author_avatar_index, author_karma,
                            category, reactions, comment_count, is_after_dark,
                            media_url, media_type, media_thumbnail, created_at
                     FROM confessions ORDER BY position",
                    confession_row,
                )?,
                crushes: load_rows(
                    conn,
                    "crushes",
                    "SELECT id, from_user_id, to_alias, message, is_revealed, is_mutual, created_at
                     FROM crushes ORDER BY position",
                    crush_row,
                )?,
                market_items: load_rows(
                    conn,
                    "market_items",
                    "SELECT id, title, description, price, category, condition, seller_id,
                            seller_alias, seller_karma, seller_avatar_index, is_sold, image_urls, created_at
                     FROM market_items ORDER BY position",
                    market_item_row,
                )?,
                comments: load_rows(
                    conn,
                    "comments",
                    "SELECT id, parent_id, parent_type, content, author_id, author_alias,
                            author_avatar_index, author_karma, likes, created_at
                     FROM comments ORDER BY position",
                    comment_row,
                )?,
                profiles: load_rows(
                    conn,
                    "profiles",
                    "SELECT id, alias, avatar_index, karma, confessions_count, reactions_given,
                            crushes_sent, matches_revealed, last_reaction_at, created_at
                     FROM profiles ORDER BY created_at DESC",
                    profile_row,
                )?,
            })
        })
    }

    /// Replace every table with the snapshot in one transaction.
    pub fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute_batch(
                "DELETE FROM confessions;
                 DELETE FROM crushes;
                 DELETE FROM market_items;
                 DELETE FROM comments;
                 DELETE FROM profiles;",
            )?;
            insert_confessions(&tx, snapshot)?;
            insert_crushes(&tx, snapshot)?;
            insert_market_items(&tx, snapshot)?;
            insert_comments(&tx, snapshot)?;
            insert_profiles(&tx, snapshot)?;
            tx.commit()?;

            debug!(
                "Saved snapshot: {} confessions, {} profiles",
                snapshot.confessions.len(),
                snapshot.profiles.len()
            );
            Ok(())
        })
    }
}

/// Rows that no longer decode into a model are skipped, not fatal.
fn load_rows<R, T>(
    conn: &Connection,
    table: &str,
    sql: &str,
    map: fn(&Row<'_>) -> rusqlite::Result<R>,
) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = anyhow::Error>,
{
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], map)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows
        .into_iter()
        .filter_map(|row| match T::try_from(row) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("Skipping unreadable row in {}: {:#}", table, e);
                None
            }
        })
        .collect())
}

fn confession_row(row: &Row<'_>) -> rusqlite::Result<ConfessionRow> {
    Ok(ConfessionRow {
        id: row.get(0)?,
        content: row.get(1)?,
        author_id: row.get(2)?,
        author_alias: row.get(3)?,
        author_avatar_index: row.get(4)?,
        author_karma: row.get(5)?,
        category: row.get(6)?,
        reactions: row.get(7)?,
        comment_count: row.get(8)?,
        is_after_dark: row.get(9)?,
        media_url: row.get(10)?,
        media_type: row.get(11)?,
        media_thumbnail: row.get(12)?,
        created_at: row.get(13)?,
    })
}

fn crush_row(row: &Row<'_>) -> rusqlite::Result<CrushRow> {
    Ok(CrushRow {
        id: row.get(0)?,
        from_user_id: row.get(1)?,
        to_alias: row.get(2)?,
        message: row.get(3)?,
        is_revealed: row.get(4)?,
        is_mutual: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn market_item_row(row: &Row<'_>) -> rusqlite::Result<MarketItemRow> {
    Ok(MarketItemRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        category: row.get(4)?,
        condition: row.get(5)?,
        seller_id: row.get(6)?,
        seller_alias: row.get(7)?,
        seller_karma: row.get(8)?,
        seller_avatar_index: row.get(9)?,
        is_sold: row.get(10)?,
        image_urls: row.get(11)?,
        created_at: row.get(12)?,
    })
}

fn comment_row(row: &Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        parent_id: row.get(1)?,
        parent_type: row.get(2)?,
        content: row.get(3)?,
        author_id: row.get(4)?,
        author_alias: row.get(5)?,
        author_avatar_index: row.get(6)?,
        author_karma: row.get(7)?,
        likes: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn profile_row(row: &Row<'_>) -> rusqlite::Result<ProfileRow> {
    Ok(ProfileRow {
        id: row.get(0)?,
        alias: row.get(1)?,
        avatar_index: row.get(2)?,
        karma: row.get(3)?,
        confessions_count: row.get(4)?,
        reactions_given: row.get(5)?,
        crushes_sent: row.get(6)?,
        matches_revealed: row.get(7)?,
        last_reaction_at: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn insert_confessions(tx: &Transaction<'_>, snapshot: &Snapshot) -> Result<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO confessions (id, position, content, author_id, author_alias, author_avatar_index,
            author_karma, category, reactions, comment_count, is_after_dark,
            media_url, media_type, media_thumbnail, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
    )?;
    for (position, confession) in snapshot.confessions.iter().enumerate() {
        let r = ConfessionRow::from(confession);
        stmt.execute(params![
            r.id,
            position as i64,
            r.content,
            r.author_id,
            r.author_alias,
            r.author_avatar_index,
            r.author_karma,
            r.category,
            r.reactions,
            r.comment_count,
            r.is_after_dark,
            r.media_url,
            r.media_type,
            r.media_thumbnail,
            r.created_at,
        ])?;
    }
    Ok(())
}

fn insert_crushes(tx: &Transaction<'_>, snapshot: &Snapshot) -> Result<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO crushes (id, position, from_user_id, to_alias, message, is_revealed, is_mutual, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    for (position, crush) in snapshot.crushes.iter().enumerate() {
        let r = CrushRow::from(crush);
        stmt.execute(params![
            r.id,
            position as i64,
            r.from_user_id,
            r.to_alias,
            r.message,
            r.is_revealed,
            r.is_mutual,
            r.created_at,
        ])?;
    }
    Ok(())
}

fn insert_market_items(tx: &Transaction<'_>, snapshot: &Snapshot) -> Result<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO market_items (id, position, title, description, price, category, condition,
            seller_id, seller_alias, seller_karma, seller_avatar_index, is_sold, image_urls, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
    )?;
    for (position, item) in snapshot.market_items.iter().enumerate() {
        let r = MarketItemRow::from(item);
        stmt.execute(params![
            r.id,
            position as i64,
            r.title,
            r.description,
            r.price,
            r.category,
            r.condition,
            r.seller_id,
            r.seller_alias,
            r.seller_karma,
            r.seller_avatar_index,
            r.is_sold,
            r.image_urls,
            r.created_at,
        ])?;
    }
    Ok(())
}

fn insert_comments(tx: &Transaction<'_>, snapshot: &Snapshot) -> Result<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO comments (id, position, parent_id, parent_type, content, author_id, author_alias,
            author_avatar_index, author_karma, likes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )?;
    for (position, comment) in snapshot.comments.iter().enumerate() {
        let r = CommentRow::from(comment);
        stmt.execute(params![
            r.id,
            position as i64,
            r.parent_id,
            r.parent_type,
            r.content,
            r.author_id,
            r.author_alias,
            r.author_avatar_index,
            r.author_karma,
            r.likes,
            r.created_at,
        ])?;
    }
    Ok(())
}

fn insert_profiles(tx: &Transaction<'_>, snapshot: &Snapshot) -> Result<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO profiles (id, alias, avatar_index, karma, confessions_count, reactions_given,
            crushes_sent, matches_revealed, last_reaction_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )?;
    for profile in &snapshot.profiles {
        let r = ProfileRow::from(profile);
        stmt.execute(params![
            r.id,
            r.alias,
            r.avatar_index,
            r.karma,
            r.confessions_count,
            r.reactions_given,
            r.crushes_sent,
            r.matches_revealed,
            r.last_reaction_at,
            r.created_at,
        ])?;
    }
    Ok(())
}
