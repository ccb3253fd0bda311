//! Edge validation shared by the WS `chat.send` method and `POST /messages`.

use chatroom_core::{ChatroomError, Result};
use chatroom_store::Message;

use crate::app::AppState;

/// Trim both fields, reject blanks, then hand off to the send pipeline.
pub async fn send(app: &AppState, sender: &str, body: &str) -> Result<Message> {
    let sender = sender.trim();
    let body = body.trim();

    if sender.is_empty() {
        return Err(ChatroomError::InvalidParams(
            "sender cannot be empty".to_string(),
        ));
    }
    if body.is_empty() {
        return Err(ChatroomError::InvalidParams(
            "body cannot be empty".to_string(),
        ));
    }

    Ok(app.pipeline.send_message(sender, body).await?)
}
