use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A writer panicked while holding the connection.
    #[error("store connection poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;
