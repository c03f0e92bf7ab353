use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// `position` keeps each collection's most-recent-first order across restarts.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS confessions (
            id                  TEXT PRIMARY KEY,
            position            INTEGER NOT NULL,
            content             TEXT NOT NULL,
            author_id           TEXT NOT NULL,
            author_alias        TEXT NOT NULL,
            author_avatar_index INTEGER NOT NULL,
            author_karma        INTEGER NOT NULL,
            category            TEXT NOT NULL,
            reactions           TEXT NOT NULL,
            comment_count       INTEGER NOT NULL DEFAULT 0,
            is_after_dark       INTEGER NOT NULL DEFAULT 0,
            media_url           TEXT,
            media_type          TEXT,
            media_thumbnail     TEXT,
            created_at          TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS crushes (
            id              TEXT PRIMARY KEY,
            position        INTEGER NOT NULL,
            from_user_id    TEXT NOT NULL,
            to_alias        TEXT NOT NULL,
            message         TEXT NOT NULL,
            is_revealed     INTEGER NOT NULL DEFAULT 0,
            is_mutual       INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_crushes_sender
            ON crushes(from_user_id);

        CREATE TABLE IF NOT EXISTS market_items (
            id                  TEXT PRIMARY KEY,
            position            INTEGER NOT NULL,
            title               TEXT NOT NULL,
            description         TEXT NOT NULL,
            price               REAL NOT NULL,
            category            TEXT NOT NULL,
            condition           TEXT NOT NULL,
            seller_id           TEXT NOT NULL,
            seller_alias        TEXT NOT NULL,
            seller_karma        INTEGER NOT NULL,
            seller_avatar_index INTEGER NOT NULL,
            is_sold             INTEGER NOT NULL DEFAULT 0,
            image_urls          TEXT NOT NULL DEFAULT '[]',
            created_at          TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS comments (
            id                  TEXT PRIMARY KEY,
            position            INTEGER NOT NULL,
            parent_id           TEXT NOT NULL,
            parent_type         TEXT NOT NULL,
            content             TEXT NOT NULL,
            author_id           TEXT NOT NULL,
            author_alias        TEXT NOT NULL,
            author_avatar_index INTEGER NOT NULL,
            author_karma        INTEGER NOT NULL,
            likes               INTEGER NOT NULL DEFAULT 0,
            created_at          TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_comments_parent
            ON comments(parent_id);

        CREATE TABLE IF NOT EXISTS profiles (
            id                  TEXT PRIMARY KEY,
            alias               TEXT NOT NULL,
            avatar_index        INTEGER NOT NULL,
            karma               INTEGER NOT NULL,
            confessions_count   INTEGER NOT NULL DEFAULT 0,
            reactions_given     INTEGER NOT NULL DEFAULT 0,
            crushes_sent        INTEGER NOT NULL DEFAULT 0,
            matches_revealed    INTEGER NOT NULL DEFAULT 0,
            last_reaction_at    TEXT,
            created_at          TEXT NOT NULL
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
