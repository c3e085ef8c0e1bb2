//! SQLite-backed message store.
//!
//! Two tables: `messages` (the queue) and `stats` (monotonic counters).
//! `total_submitted` counts every submission ever made and survives
//! deletes and clears; live counts are derived from the queue itself.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use thiserror::Error;

use signboard_core::message::{sanitize_line, Message, MessageDraft, Stats};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid stored timestamp '{0}'")]
    BadTimestamp(String),
}

/// SQLite store for the message queue.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (and migrate) the database at the given path.
    pub fn open(path: &std::path::Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS messages (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                line1     TEXT NOT NULL,
                line2     TEXT NOT NULL DEFAULT '',
                line3     TEXT NOT NULL DEFAULT '',
                line4     TEXT NOT NULL DEFAULT '',
                shown     INTEGER NOT NULL DEFAULT 0,
                timestamp TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS stats (
                key   TEXT PRIMARY KEY,
                value INTEGER NOT NULL DEFAULT 0
            );

            INSERT OR IGNORE INTO stats (key, value) VALUES ('total_submitted', 0);",
        )?;
        Ok(())
    }

    /// The queue snapshot: unshown first, oldest first.
    pub fn list(&self) -> Result<Vec<Message>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, line1, line2, line3, line4, shown, timestamp
             FROM messages
             ORDER BY shown ASC, timestamp ASC, id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, i64>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut messages = Vec::new();
        for row in rows {
            let (id, line1, line2, line3, line4, shown, raw_ts) = row?;
            let timestamp = parse_timestamp(&raw_ts)?;
            messages.push(Message {
                id,
                line1,
                line2,
                line3,
                line4,
                shown: shown != 0,
                timestamp,
            });
        }
        Ok(messages)
    }

    /// Insert a submission and bump the `total_submitted` counter.
    /// Lines are sanitized again on the way in; clients are not trusted
    /// to have applied the column cap.
    pub fn insert(&self, draft: &MessageDraft) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO messages (line1, line2, line3, line4, shown, timestamp)
             VALUES (?1, ?2, ?3, ?4, 0, ?5)",
            params![
                sanitize_line(&draft.line1),
                sanitize_line(&draft.line2),
                sanitize_line(&draft.line3),
                sanitize_line(&draft.line4),
                Utc::now().to_rfc3339(),
            ],
        )?;
        self.conn.execute(
            "UPDATE stats SET value = value + 1 WHERE key = 'total_submitted'",
            [],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Mark one message as shown. Returns false for an unknown id.
    pub fn mark_shown(&self, id: i64) -> Result<bool, StoreError> {
        let changed = self
            .conn
            .execute("UPDATE messages SET shown = 1 WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Reset every message back to unshown.
    pub fn reset_shown(&self) -> Result<(), StoreError> {
        self.conn.execute("UPDATE messages SET shown = 0", [])?;
        Ok(())
    }

    /// Delete a single message. Returns false for an unknown id.
    pub fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let changed = self
            .conn
            .execute("DELETE FROM messages WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Empty the queue. Counters are untouched.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM messages", [])?;
        Ok(())
    }

    pub fn stats(&self) -> Result<Stats, StoreError> {
        let total_submitted: u64 = self.conn.query_row(
            "SELECT value FROM stats WHERE key = 'total_submitted'",
            [],
            |row| row.get(0),
        )?;
        let total_messages: u64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
        let shown_messages: u64 = self.conn.query_row(
            "SELECT COUNT(*) FROM messages WHERE shown = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(Stats {
            total_submitted,
            total_messages,
            shown_messages,
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StoreError::BadTimestamp(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(line1: &str) -> MessageDraft {
        MessageDraft::new(line1, "", "", "").unwrap()
    }

    #[test]
    fn insert_assigns_ids_and_bumps_total_submitted() {
        let store = Store::open_memory().unwrap();
        let a = store.insert(&draft("first")).unwrap();
        let b = store.insert(&draft("second")).unwrap();
        assert!(b > a);

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_submitted, 2);
        assert_eq!(stats.total_messages, 2);
        assert_eq!(stats.shown_messages, 0);
    }

    #[test]
    fn insert_sanitizes_untrusted_lines() {
        let store = Store::open_memory().unwrap();
        // Bypass the draft constructor's sanitize to simulate a raw client.
        let raw = MessageDraft {
            line1: "way more than fourteen characters".into(),
            line2: String::new(),
            line3: String::new(),
            line4: String::new(),
        };
        store.insert(&raw).unwrap();
        let messages = store.list().unwrap();
        assert_eq!(messages[0].line1, "WAY MORE THAN ");
    }

    #[test]
    fn list_orders_unshown_first_then_oldest() {
        let store = Store::open_memory().unwrap();
        let a = store.insert(&draft("a")).unwrap();
        let b = store.insert(&draft("b")).unwrap();
        let c = store.insert(&draft("c")).unwrap();
        store.mark_shown(a).unwrap();

        let ids: Vec<i64> = store.list().unwrap().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![b, c, a]);
    }

    #[test]
    fn mark_shown_and_reset_round_trip() {
        let store = Store::open_memory().unwrap();
        let id = store.insert(&draft("hello")).unwrap();
        assert!(store.mark_shown(id).unwrap());
        assert!(!store.mark_shown(9999).unwrap());
        assert_eq!(store.stats().unwrap().shown_messages, 1);

        store.reset_shown().unwrap();
        assert_eq!(store.stats().unwrap().shown_messages, 0);
    }

    #[test]
    fn delete_and_clear_leave_total_submitted_alone() {
        let store = Store::open_memory().unwrap();
        let id = store.insert(&draft("a")).unwrap();
        store.insert(&draft("b")).unwrap();

        assert!(store.delete(id).unwrap());
        assert!(!store.delete(id).unwrap());
        store.clear().unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_messages, 0);
        assert_eq!(stats.total_submitted, 2);
    }

    #[test]
    fn opens_a_file_backed_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signboard.db");
        {
            let store = Store::open(&path).unwrap();
            store.insert(&draft("persisted")).unwrap();
        }
        let store = Store::open(&path).unwrap();
        assert_eq!(store.list().unwrap().len(), 1);
    }
}
