use serde::{Deserialize, Serialize};

/// One chat message. Created once, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// UUIDv7 string, unique per row.
    pub id: String,
    /// Insertion order within the `messages` table.
    pub seq: i64,
    /// Free-text label chosen by the client; not a verified identity.
    pub sender: String,
    pub body: String,
    /// RFC 3339 UTC.
    pub created_at: String,
}

/// Audit record written after an accepted send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub seq: i64,
    pub sender: String,
    pub description: String,
    pub created_at: String,
}
