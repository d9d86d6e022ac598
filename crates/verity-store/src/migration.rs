//! Database schema migrations for SQLite.
//!
//! Each migration is a SQL batch that moves the schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// Idempotent: safe to call on every open.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current, CURRENT_VERSION
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, crate::now_millis()],
            )?;
            tracing::debug!(version, "applied schema migration");
        }

        tx.commit()?;
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: posts, edit ledger, event log.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Current state of every post
        CREATE TABLE posts (
            id INTEGER PRIMARY KEY,           -- sequential, never reused
            owner BLOB NOT NULL,              -- 32 bytes, Ed25519 public key
            locator TEXT NOT NULL,            -- storage network locator
            fingerprint BLOB NOT NULL,        -- 32 bytes, BLAKE3 of content
            signature BLOB NOT NULL,          -- 96 bytes, signer key || signature
            created_at INTEGER NOT NULL       -- registry clock (Unix ms)
        );

        -- Edit ledger: one row per edit, never updated
        CREATE TABLE edits (
            post_id INTEGER NOT NULL REFERENCES posts(id),
            idx INTEGER NOT NULL,             -- 0-based position in history
            prior_fingerprint BLOB NOT NULL,  -- fingerprint overwritten by the edit
            recorded_at INTEGER NOT NULL,
            PRIMARY KEY (post_id, idx)
        );

        -- Notification log, gap-free seq in commit order
        CREATE TABLE events (
            seq INTEGER PRIMARY KEY,
            post_id INTEGER NOT NULL,
            kind TEXT NOT NULL,
            committed_at INTEGER NOT NULL,
            body BLOB NOT NULL                -- CBOR-encoded PostEvent
        );

        CREATE INDEX idx_posts_owner ON posts(owner);
        CREATE INDEX idx_events_post ON events(post_id);

        -- Posts are never destroyed; ledger and log are append-only.
        CREATE TRIGGER posts_no_delete BEFORE DELETE ON posts
        BEGIN SELECT RAISE(ABORT, 'posts cannot be deleted'); END;

        CREATE TRIGGER edits_no_update BEFORE UPDATE ON edits
        BEGIN SELECT RAISE(ABORT, 'edit ledger is append-only'); END;

        CREATE TRIGGER edits_no_delete BEFORE DELETE ON edits
        BEGIN SELECT RAISE(ABORT, 'edit ledger is append-only'); END;

        CREATE TRIGGER events_no_update BEFORE UPDATE ON events
        BEGIN SELECT RAISE(ABORT, 'event log is append-only'); END;

        CREATE TRIGGER events_no_delete BEFORE DELETE ON events
        BEGIN SELECT RAISE(ABORT, 'event log is append-only'); END;
        "#,
    )?;

    Ok(())
}
