//! SQLite-backed term store.
//!
//! One `terms` table keyed by `(text, level, modality)`. Absent modality is
//! stored as the empty string so it can participate in the primary key, and
//! surfaced as `None` again on the way out. All writes go through a
//! transaction on a mutex-guarded connection; a second writer waits on the
//! lock rather than interleaving.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use termx_core::{is_canonical_date, Error, Level, NormalizedTerm, Result, TermRecord};

use crate::blob::{decode_embedding, encode_embedding};

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS terms (
    text TEXT NOT NULL,
    level TEXT NOT NULL,
    modality TEXT NOT NULL,
    count INTEGER NOT NULL,
    last_seen_date TEXT,
    embedding BLOB NOT NULL,
    PRIMARY KEY (text, level, modality)
);
";

/// Persistent store for [`TermRecord`]s and their embeddings.
pub struct TermStore {
    conn: Mutex<Connection>,
}

impl TermStore {
    /// Open or create the store at the given SQLite path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path).map_err(store_err)?;
        Self::init(conn)
    }

    /// Open an ephemeral in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(store_err)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.busy_timeout(std::time::Duration::from_secs(5))
            .map_err(store_err)?;
        conn.execute_batch(SCHEMA_SQL).map_err(store_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Insert a new term or merge into the existing row.
    ///
    /// First observation inserts with `count = 1`; later observations
    /// increment the count, keep the later canonical date, and overwrite the
    /// embedding so stored vectors always reflect the active provider
    /// configuration. The read-modify-write runs in one transaction.
    pub fn upsert(&self, term: &NormalizedTerm, embedding: &[f32]) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(store_err)?;

        let modality = term.modality.as_deref().unwrap_or("");
        let existing: Option<(i64, Option<String>)> = tx
            .query_row(
                "SELECT count, last_seen_date FROM terms
                 WHERE text = ?1 AND level = ?2 AND modality = ?3",
                params![term.text, term.level.as_str(), modality],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(store_err)?;

        let blob = encode_embedding(embedding);
        match existing {
            None => {
                tx.execute(
                    "INSERT INTO terms (text, level, modality, count, last_seen_date, embedding)
                     VALUES (?1, ?2, ?3, 1, ?4, ?5)",
                    params![term.text, term.level.as_str(), modality, term.date, blob],
                )
                .map_err(store_err)?;
                debug!(text = %term.text, level = %term.level, "term inserted");
            }
            Some((count, stored_date)) => {
                let merged = merge_last_seen(stored_date.as_deref(), term.date.as_deref());
                tx.execute(
                    "UPDATE terms
                     SET count = ?4, last_seen_date = ?5, embedding = ?6
                     WHERE text = ?1 AND level = ?2 AND modality = ?3",
                    params![
                        term.text,
                        term.level.as_str(),
                        modality,
                        count + 1,
                        merged,
                        blob
                    ],
                )
                .map_err(store_err)?;
                debug!(text = %term.text, count = count + 1, "term aggregated");
            }
        }

        tx.commit().map_err(store_err)
    }

    /// Full scan of all rows with their embeddings.
    pub fn all_vectors(&self) -> Result<Vec<(TermRecord, Vec<f32>)>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT text, level, modality, count, last_seen_date, embedding
                 FROM terms",
            )
            .map_err(store_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Vec<u8>>(5)?,
                ))
            })
            .map_err(store_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(store_err)?;

        rows.into_iter()
            .map(|(text, level, modality, count, last_seen_date, blob)| {
                let record = decode_record(text, &level, modality, count, last_seen_date)?;
                let embedding = decode_embedding(&blob)?;
                Ok((record, embedding))
            })
            .collect()
    }

    /// Records with `count >= threshold`, most frequent first.
    pub fn min_count_filter(&self, threshold: u64) -> Result<Vec<TermRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT text, level, modality, count, last_seen_date
                 FROM terms
                 WHERE count >= ?1
                 ORDER BY count DESC, text ASC",
            )
            .map_err(store_err)?;
        let rows = stmt
            .query_map(params![threshold as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            })
            .map_err(store_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(store_err)?;

        rows.into_iter()
            .map(|(text, level, modality, count, last_seen_date)| {
                decode_record(text, &level, modality, count, last_seen_date)
            })
            .collect()
    }

    /// Number of stored term rows.
    pub fn count(&self) -> Result<u64> {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM terms", [], |row| row.get::<_, i64>(0))
            .map(|n| n as u64)
            .map_err(store_err)
    }
}

fn store_err(err: rusqlite::Error) -> Error {
    Error::Store(err.to_string())
}

fn decode_record(
    text: String,
    level: &str,
    modality: String,
    count: i64,
    last_seen_date: Option<String>,
) -> Result<TermRecord> {
    let level: Level = level
        .parse()
        .map_err(|_| Error::Store(format!("corrupt level value: {level}")))?;
    Ok(TermRecord {
        text,
        level,
        modality: (!modality.is_empty()).then_some(modality),
        count: count.max(0) as u64,
        last_seen_date,
    })
}

/// Later-date-wins merge over canonical 8-digit dates.
///
/// Canonical dates compare lexicographically. A non-canonical stored value
/// is overwritten by any present incoming value; a non-canonical incoming
/// value never displaces a canonical stored one. An absent incoming date
/// keeps whatever is stored.
fn merge_last_seen(stored: Option<&str>, incoming: Option<&str>) -> Option<String> {
    match (stored, incoming) {
        (stored, None) => stored.map(str::to_string),
        (None, Some(incoming)) => Some(incoming.to_string()),
        (Some(stored), Some(incoming)) => {
            let out = match (is_canonical_date(stored), is_canonical_date(incoming)) {
                (true, true) => stored.max(incoming),
                (true, false) => stored,
                (false, _) => incoming,
            };
            Some(out.to_string())
        }
    }
}
