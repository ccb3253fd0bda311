//! Plain HTTP access to the room, for scripts and clients without a WS stack.
//!
//! - `POST /messages` `{"sender": "Alice", "body": "hello"}` → `{"message": {...}}`
//! - `GET /messages?filter=ali` → `{"messages": [...]}`
//! - `GET /messages/stream?filter=ali` → SSE, one `messages.snapshot` per change

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use chatroom_core::ChatroomError;
use chatroom_protocol::{
    methods::EVENT_MESSAGES_SNAPSHOT,
    payloads::{FeedParams, SendParams},
};
use futures_util::{Stream, StreamExt};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::app::AppState;

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub error: String,
}

type HttpError = (StatusCode, Json<ErrorBody>);

fn http_error(e: ChatroomError) -> HttpError {
    let status = match e {
        ChatroomError::InvalidParams(_) => StatusCode::BAD_REQUEST,
        ChatroomError::BlockedSender { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorBody {
            code: e.code(),
            error: e.to_string(),
        }),
    )
}

/// POST /messages
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendParams>,
) -> Result<Json<Value>, HttpError> {
    match crate::chat::send(&state, &req.sender, &req.body).await {
        Ok(message) => Ok(Json(json!({ "message": message }))),
        Err(e) => {
            warn!(error = %e, "POST /messages failed");
            Err(http_error(e))
        }
    }
}

/// GET /messages
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FeedParams>,
) -> Result<Json<Value>, HttpError> {
    state
        .pipeline
        .get_messages(params.filter.as_deref())
        .map(|messages| Json(json!({ "messages": messages })))
        .map_err(|e| http_error(e.into()))
}

/// GET /messages/stream: live feed over server-sent events.
pub async fn stream_messages(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FeedParams>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let snapshots = state.pipeline.subscribe(params.filter).filter_map(|snapshot| async move {
        match snapshot {
            Ok(messages) => Event::default()
                .event(EVENT_MESSAGES_SNAPSHOT)
                .json_data(json!({ "messages": messages }))
                .ok()
                .map(Ok),
            Err(e) => {
                warn!(error = %e, "feed snapshot failed");
                None
            }
        }
    });
    Sse::new(snapshots).keep_alive(KeepAlive::default())
}
