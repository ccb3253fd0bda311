//! `chatroom-store`: append-only SQLite logs for chat messages and audit events.
//!
//! Both tables order rows by an `AUTOINCREMENT` sequence, so insertion
//! order is creation order even when two rows share a timestamp. Rows are
//! never updated or deleted.

pub mod db;
pub mod error;
pub mod store;
pub mod types;

pub use error::{Result, StoreError};
pub use store::MessageStore;
pub use types::{Event, Message};
