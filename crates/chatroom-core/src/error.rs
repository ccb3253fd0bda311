use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatroomError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Method not found: {method}")]
    MethodNotFound { method: String },

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Sender is blocked: {sender}")]
    BlockedSender { sender: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },
}

impl ChatroomError {
    /// Short error code string sent to clients in WS RES frames.
    pub fn code(&self) -> &'static str {
        match self {
            ChatroomError::Config(_) => "CONFIG_ERROR",
            ChatroomError::MethodNotFound { .. } => "METHOD_NOT_FOUND",
            ChatroomError::InvalidParams(_) => "INVALID_PARAMS",
            ChatroomError::BlockedSender { .. } => "BLOCKED_SENDER",
            ChatroomError::Database(_) => "DATABASE_ERROR",
            ChatroomError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
        }
    }
}

pub type Result<T> = std::result::Result<T, ChatroomError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_frame_reports_size_and_limit() {
        let err = ChatroomError::PayloadTooLarge {
            size: 200_000,
            max: 131_072,
        };
        assert_eq!(err.code(), "PAYLOAD_TOO_LARGE");
        assert_eq!(
            err.to_string(),
            "Payload too large: 200000 bytes (max 131072)"
        );
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            ChatroomError::MethodNotFound {
                method: "x".to_string()
            }
            .code(),
            "METHOD_NOT_FOUND"
        );
        assert_eq!(ChatroomError::Config("bad".to_string()).code(), "CONFIG_ERROR");
    }
}
