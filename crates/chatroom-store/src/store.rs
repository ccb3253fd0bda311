use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::db::init_db;
use crate::error::{Result, StoreError};
use crate::types::{Event, Message};

/// Append-only message and event logs backed by one SQLite connection.
///
/// The `Mutex` makes every append a single writer critical section: id,
/// sequence and timestamp are all assigned while the lock is held, so the
/// order of `seq` matches the order callers observed their appends complete.
pub struct MessageStore {
    db: Mutex<Connection>,
}

impl MessageStore {
    /// Wrap an open connection, creating the tables if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    #[instrument(skip(self, body), fields(body_len = body.len()))]
    pub fn append_message(&self, sender: &str, body: &str) -> Result<Message> {
        let db = self.lock()?;
        let id = Uuid::now_v7().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        db.execute(
            "INSERT INTO messages (id, sender, body, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![id, sender, body, now],
        )?;
        let seq = db.last_insert_rowid();
        debug!(message_id = %id, seq, "message appended");

        Ok(Message {
            id,
            seq,
            sender: sender.to_string(),
            body: body.to_string(),
            created_at: now,
        })
    }

    #[instrument(skip(self))]
    pub fn append_event(&self, sender: &str, description: &str) -> Result<Event> {
        let db = self.lock()?;
        let id = Uuid::now_v7().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        db.execute(
            "INSERT INTO events (id, sender, description, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![id, sender, description, now],
        )?;
        let seq = db.last_insert_rowid();
        debug!(event_id = %id, seq, "event appended");

        Ok(Event {
            id,
            seq,
            sender: sender.to_string(),
            description: description.to_string(),
            created_at: now,
        })
    }

    /// The `limit` most recent messages, oldest first.
    pub fn recent_messages(&self, limit: usize) -> Result<Vec<Message>> {
        let db = self.lock()?;
        let mut stmt = db.prepare_cached(
            "SELECT id, seq, sender, body, created_at
             FROM messages
             ORDER BY seq DESC
             LIMIT ?1",
        )?;
        let mut msgs = stmt
            .query_map(rusqlite::params![limit as i64], row_to_message)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        // Reverse so oldest first
        msgs.reverse();
        Ok(msgs)
    }

    /// Audit events for one sender, newest first.
    pub fn events_for_sender(&self, sender: &str, limit: usize) -> Result<Vec<Event>> {
        let db = self.lock()?;
        let mut stmt = db.prepare_cached(
            "SELECT id, seq, sender, description, created_at
             FROM events
             WHERE sender = ?1
             ORDER BY seq DESC
             LIMIT ?2",
        )?;
        let events = stmt
            .query_map(rusqlite::params![sender, limit as i64], |row| {
                Ok(Event {
                    id: row.get(0)?,
                    seq: row.get(1)?,
                    sender: row.get(2)?,
                    description: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(events)
    }

    pub fn message_count(&self) -> Result<u64> {
        let db = self.lock()?;
        let n: i64 = db.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
        Ok(n as u64)
    }

    pub fn event_count(&self) -> Result<u64> {
        let db = self.lock()?;
        let n: i64 = db.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        Ok(n as u64)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.db.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        seq: row.get(1)?,
        sender: row.get(2)?,
        body: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MessageStore {
        MessageStore::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn append_assigns_distinct_ids_and_increasing_seq() {
        let store = store();
        let a = store.append_message("Alice", "hello").unwrap();
        let b = store.append_message("Alice", "hello").unwrap();

        assert_ne!(a.id, b.id);
        assert!(b.seq > a.seq);
        assert_eq!(store.message_count().unwrap(), 2);
    }

    #[test]
    fn recent_messages_is_chronological_and_capped() {
        let store = store();
        for i in 0..60 {
            store.append_message("Bob", &format!("msg {i}")).unwrap();
        }

        let recent = store.recent_messages(50).unwrap();
        assert_eq!(recent.len(), 50);
        assert_eq!(recent.first().unwrap().body, "msg 10");
        assert_eq!(recent.last().unwrap().body, "msg 59");
        assert!(recent.windows(2).all(|w| w[0].seq < w[1].seq));
    }

    #[test]
    fn events_are_filtered_by_sender_newest_first() {
        let store = store();
        store.append_event("Alice", "Sent a message").unwrap();
        store.append_event("Bob", "Sent a message").unwrap();
        let last = store.append_event("Alice", "Sent a message").unwrap();

        let events = store.events_for_sender("Alice", 10).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, last.id);
        assert!(events.iter().all(|e| e.sender == "Alice"));
        assert_eq!(store.event_count().unwrap(), 3);
    }

    #[test]
    fn init_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        let store = MessageStore::new(conn).unwrap();
        store.append_message("Carol", "still works").unwrap();
        assert_eq!(store.recent_messages(50).unwrap().len(), 1);
    }
}
