//! SQLite implementation of the Store trait.
//!
//! The primary backend. Uses rusqlite with bundled SQLite, wrapped in async
//! via `tokio::task::spawn_blocking`. Every commit is one SQLite transaction.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction as SqlTransaction};
use verity_core::{
    ContentFingerprint, EditEntry, EventRecord, Identity, Post, PostEvent, PostId,
    StorageLocator, Timestamp,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{Store, Transaction};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(e.to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row helpers
// ─────────────────────────────────────────────────────────────────────────────

fn conversion_error(idx: usize, name: &str) -> rusqlite::Error {
    rusqlite::Error::InvalidColumnType(idx, name.into(), Type::Blob)
}

fn blob32(row: &Row<'_>, idx: usize, name: &str) -> rusqlite::Result<[u8; 32]> {
    let bytes: Vec<u8> = row.get(idx)?;
    bytes.try_into().map_err(|_| conversion_error(idx, name))
}

fn to_sql_id(id: PostId) -> i64 {
    id.get() as i64
}

fn from_sql_id(id: i64) -> PostId {
    PostId::new(id as u64)
}

// Columns: id, owner, locator, fingerprint, signature, created_at
fn row_to_post(row: &Row<'_>) -> rusqlite::Result<Post> {
    let locator: String = row.get(2)?;
    let signature: Vec<u8> = row.get(4)?;

    Ok(Post {
        id: from_sql_id(row.get(0)?),
        owner: Identity::from_bytes(blob32(row, 1, "owner")?),
        current_locator: StorageLocator::new(locator)
            .map_err(|_| rusqlite::Error::InvalidColumnType(2, "locator".into(), Type::Text))?,
        current_fingerprint: ContentFingerprint::from_bytes(blob32(row, 3, "fingerprint")?),
        current_signature: Bytes::from(signature),
        created_at: row.get(5)?,
        history: Vec::new(),
    })
}

// Columns: prior_fingerprint, recorded_at
fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<EditEntry> {
    Ok(EditEntry {
        prior_fingerprint: ContentFingerprint::from_bytes(blob32(row, 0, "prior_fingerprint")?),
        recorded_at: row.get(1)?,
    })
}

fn encode_event(event: &PostEvent) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(event, &mut buf).map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(buf)
}

fn decode_event(body: &[u8]) -> Result<PostEvent> {
    ciborium::from_reader(body).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn load_post(conn: &Connection, id: PostId) -> Result<Option<Post>> {
    let post = conn
        .query_row(
            "SELECT id, owner, locator, fingerprint, signature, created_at
             FROM posts WHERE id = ?1",
            params![to_sql_id(id)],
            row_to_post,
        )
        .optional()?;

    match post {
        Some(mut post) => {
            post.history = load_history(conn, id)?;
            Ok(Some(post))
        }
        None => Ok(None),
    }
}

fn load_history(conn: &Connection, id: PostId) -> Result<Vec<EditEntry>> {
    let mut stmt = conn.prepare_cached(
        "SELECT prior_fingerprint, recorded_at FROM edits WHERE post_id = ?1 ORDER BY idx ASC",
    )?;
    let entries = stmt
        .query_map(params![to_sql_id(id)], row_to_entry)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(entries)
}

fn last_id(conn: &Connection) -> Result<Option<PostId>> {
    let max: Option<i64> = conn.query_row("SELECT MAX(id) FROM posts", [], |row| row.get(0))?;
    Ok(max.map(from_sql_id))
}

/// Apply an already-checked transaction inside an open SQLite transaction.
fn apply(sql: &SqlTransaction<'_>, tx: &Transaction) -> Result<()> {
    match tx {
        Transaction::Create { post } => {
            sql.execute(
                "INSERT INTO posts (id, owner, locator, fingerprint, signature, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    to_sql_id(post.id),
                    post.owner.as_bytes().as_slice(),
                    post.current_locator.as_str(),
                    post.current_fingerprint.as_bytes().as_slice(),
                    &post.current_signature[..],
                    post.created_at,
                ],
            )?;
        }
        Transaction::Edit {
            id,
            entry,
            locator,
            fingerprint,
            signature,
            ..
        } => {
            let next_idx: i64 = sql.query_row(
                "SELECT COUNT(*) FROM edits WHERE post_id = ?1",
                params![to_sql_id(*id)],
                |row| row.get(0),
            )?;

            // Ledger first, then the overwrite.
            sql.execute(
                "INSERT INTO edits (post_id, idx, prior_fingerprint, recorded_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    to_sql_id(*id),
                    next_idx,
                    entry.prior_fingerprint.as_bytes().as_slice(),
                    entry.recorded_at,
                ],
            )?;
            sql.execute(
                "UPDATE posts SET locator = ?2, fingerprint = ?3, signature = ?4 WHERE id = ?1",
                params![
                    to_sql_id(*id),
                    locator.as_str(),
                    fingerprint.as_bytes().as_slice(),
                    &signature[..],
                ],
            )?;
        }
        Transaction::Transfer { id, to, .. } => {
            sql.execute(
                "UPDATE posts SET owner = ?2 WHERE id = ?1",
                params![to_sql_id(*id), to.as_bytes().as_slice()],
            )?;
        }
    }
    Ok(())
}

#[async_trait]
impl Store for SqliteStore {
    async fn commit(&self, tx: Transaction, at: Timestamp) -> Result<EventRecord> {
        self.blocking(move |conn| {
            let sql = conn.transaction()?;

            let id = tx.post_id();
            let current = load_post(&sql, id)?;
            tx.check_against(current.as_ref(), last_id(&sql)?)?;

            apply(&sql, &tx)?;

            let event = tx.event();
            let seq: i64 = sql.query_row(
                "SELECT COALESCE(MAX(seq), 0) + 1 FROM events",
                [],
                |row| row.get(0),
            )?;
            sql.execute(
                "INSERT INTO events (seq, post_id, kind, committed_at, body)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![seq, to_sql_id(id), event.name(), at, encode_event(&event)?],
            )?;

            // Dropping `sql` without commit rolls back on any early return.
            sql.commit()?;

            tracing::debug!(seq, post = %id, event = event.name(), "sqlite store commit");
            Ok(EventRecord {
                seq: seq as u64,
                committed_at: at,
                event,
            })
        })
        .await
    }

    async fn get_post(&self, id: PostId) -> Result<Option<Post>> {
        self.blocking(move |conn| load_post(conn, id)).await
    }

    async fn get_history(&self, id: PostId) -> Result<Option<Vec<EditEntry>>> {
        self.blocking(move |conn| {
            let exists: Option<i64> = conn
                .query_row(
                    "SELECT id FROM posts WHERE id = ?1",
                    params![to_sql_id(id)],
                    |row| row.get(0),
                )
                .optional()?;
            match exists {
                Some(_) => Ok(Some(load_history(conn, id)?)),
                None => Ok(None),
            }
        })
        .await
    }

    async fn last_post_id(&self) -> Result<Option<PostId>> {
        self.blocking(|conn| last_id(conn)).await
    }

    async fn posts_by_owner(&self, owner: &Identity) -> Result<Vec<PostId>> {
        let owner = *owner;
        self.blocking(move |conn| {
            let mut stmt = conn.prepare_cached("SELECT id FROM posts WHERE owner = ?1 ORDER BY id ASC")?;
            let ids = stmt
                .query_map(params![owner.as_bytes().as_slice()], |row| row.get::<_, i64>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(ids.into_iter().map(from_sql_id).collect())
        })
        .await
    }

    async fn last_event_at(&self) -> Result<Option<Timestamp>> {
        self.blocking(|conn| {
            Ok(conn
                .query_row(
                    "SELECT committed_at FROM events ORDER BY seq DESC LIMIT 1",
                    [],
                    |row| row.get::<_, i64>(0),
                )
                .optional()?)
        })
        .await
    }

    async fn events_since(&self, after_seq: u64) -> Result<Vec<EventRecord>> {
        let after = i64::try_from(after_seq).unwrap_or(i64::MAX);
        self.blocking(move |conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT seq, committed_at, body FROM events WHERE seq > ?1 ORDER BY seq ASC",
            )?;
            let rows = stmt
                .query_map(params![after], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, Vec<u8>>(2)?,
                    ))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            rows.into_iter()
                .map(|(seq, committed_at, body)| {
                    Ok(EventRecord {
                        seq: seq as u64,
                        committed_at,
                        event: decode_event(&body)?,
                    })
                })
                .collect()
        })
        .await
    }
}
