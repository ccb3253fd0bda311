//! Shared configuration and error types for the chatroom workspace.

pub mod config;
pub mod error;

pub use config::ChatroomConfig;
pub use error::{ChatroomError, Result};
