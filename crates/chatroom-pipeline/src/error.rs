use chatroom_core::ChatroomError;
use chatroom_store::StoreError;
use chatroom_wiki::LookupError;
use thiserror::Error;

/// Failures surfaced to whoever called the send path or the feed query.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The message was stored; the audit event was not.
    #[error("sender is blocked: {sender}")]
    BlockedSender { sender: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Terminal failure of one detached lookup job. Only ever logged.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("posting result failed: {0}")]
    Post(#[from] ChatError),
}

impl From<ChatError> for ChatroomError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::BlockedSender { sender } => ChatroomError::BlockedSender { sender },
            ChatError::Store(e) => ChatroomError::Database(e.to_string()),
        }
    }
}
