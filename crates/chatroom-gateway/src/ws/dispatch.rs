use chatroom_core::ChatroomError;
use chatroom_protocol::{frames::ResFrame, methods};

use crate::app::AppState;
use crate::ws::handlers;

/// Route a stateless WS method call to its handler.
///
/// `messages.subscribe` / `messages.unsubscribe` never reach this function;
/// `message.rs` intercepts them.
pub async fn route(
    method: &str,
    params: Option<&serde_json::Value>,
    req_id: &str,
    app: &AppState,
) -> ResFrame {
    match method {
        methods::PING => ResFrame::ok(req_id, serde_json::json!({ "pong": true })),

        methods::CHAT_SEND => handlers::handle_chat_send(params, req_id, app).await,

        methods::MESSAGES_LIST => handlers::handle_messages_list(params, req_id, app).await,

        methods::EVENTS_LIST => handlers::handle_events_list(params, req_id, app).await,

        methods::ROOM_STATS => handlers::handle_room_stats(req_id, app).await,

        other => handlers::error_frame(
            req_id,
            &ChatroomError::MethodNotFound {
                method: other.to_string(),
            },
        ),
    }
}
