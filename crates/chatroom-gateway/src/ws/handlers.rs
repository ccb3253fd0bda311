//! Concrete WS method handler functions.
//!
//! Each function extracts its parameters, calls the pipeline, and returns a
//! `ResFrame`. `dispatch::route` is the only caller. Subscription methods
//! live in `message.rs` because they change per-connection state.

use chatroom_core::ChatroomError;
use chatroom_protocol::{
    frames::ResFrame,
    payloads::{EventsParams, FeedParams, SendParams},
};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::app::AppState;

/// Deserialize method params; an absent `params` is treated as `{}`.
pub fn parse_params<T: DeserializeOwned>(
    params: Option<&serde_json::Value>,
) -> Result<T, ChatroomError> {
    let value = params
        .cloned()
        .unwrap_or_else(|| serde_json::Value::Object(Default::default()));
    serde_json::from_value(value).map_err(|e| ChatroomError::InvalidParams(e.to_string()))
}

pub fn error_frame(req_id: &str, e: &ChatroomError) -> ResFrame {
    ResFrame::err(req_id, e.code(), &e.to_string())
}

// ---------------------------------------------------------------------------
// chat.send
// ---------------------------------------------------------------------------

/// Handler for `chat.send`.
///
/// Params: `{ "sender": string, "body": string }`
///
/// Returns the stored message. The blocked sender gets `BLOCKED_SENDER`
/// even though its message was stored.
pub async fn handle_chat_send(
    params: Option<&serde_json::Value>,
    req_id: &str,
    app: &AppState,
) -> ResFrame {
    let params: SendParams = match parse_params(params) {
        Ok(p) => p,
        Err(e) => return error_frame(req_id, &e),
    };

    match crate::chat::send(app, &params.sender, &params.body).await {
        Ok(message) => ResFrame::ok(req_id, serde_json::json!({ "message": message })),
        Err(e) => {
            warn!(error = %e, "chat.send failed");
            error_frame(req_id, &e)
        }
    }
}

// ---------------------------------------------------------------------------
// messages.list
// ---------------------------------------------------------------------------

/// Handler for `messages.list`.
///
/// Params: `{ "filter"?: string }`
pub async fn handle_messages_list(
    params: Option<&serde_json::Value>,
    req_id: &str,
    app: &AppState,
) -> ResFrame {
    let params: FeedParams = match parse_params(params) {
        Ok(p) => p,
        Err(e) => return error_frame(req_id, &e),
    };

    match app.pipeline.get_messages(params.filter.as_deref()) {
        Ok(messages) => ResFrame::ok(req_id, serde_json::json!({ "messages": messages })),
        Err(e) => {
            warn!(error = %e, "messages.list failed");
            error_frame(req_id, &e.into())
        }
    }
}

// ---------------------------------------------------------------------------
// events.list
// ---------------------------------------------------------------------------

/// Handler for `events.list`.
///
/// Params: `{ "sender": string, "limit"?: number }`
///
/// Returns the sender's audit events, newest first.
pub async fn handle_events_list(
    params: Option<&serde_json::Value>,
    req_id: &str,
    app: &AppState,
) -> ResFrame {
    const DEFAULT_LIMIT: usize = 20;
    const MAX_LIMIT: usize = 100;

    let params: EventsParams = match parse_params(params) {
        Ok(p) => p,
        Err(e) => return error_frame(req_id, &e),
    };
    let limit = params.limit.map(|n| n.min(MAX_LIMIT)).unwrap_or(DEFAULT_LIMIT);

    match app.pipeline.events_for_sender(&params.sender, limit) {
        Ok(events) => ResFrame::ok(req_id, serde_json::json!({ "events": events })),
        Err(e) => {
            warn!(error = %e, "events.list failed");
            error_frame(req_id, &e.into())
        }
    }
}

// ---------------------------------------------------------------------------
// room.stats
// ---------------------------------------------------------------------------

/// Handler for `room.stats`: distinct senders and message count in the
/// current feed window.
pub async fn handle_room_stats(req_id: &str, app: &AppState) -> ResFrame {
    match app.pipeline.room_stats() {
        Ok(stats) => ResFrame::ok(req_id, stats),
        Err(e) => {
            warn!(error = %e, "room.stats failed");
            error_frame(req_id, &e.into())
        }
    }
}
