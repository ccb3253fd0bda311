use axum::{
    extract::{ws::Message, ws::WebSocket, State, WebSocketUpgrade},
    response::IntoResponse,
};
use chatroom_core::config::{HEARTBEAT_INTERVAL_SECS, MAX_PAYLOAD_BYTES};
use chatroom_core::ChatroomError;
use chatroom_protocol::{
    frames::{ErrorShape, EventFrame},
    methods::{EVENT_ERROR, EVENT_TICK},
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::AppState;
use crate::ws::message::{self, FeedSubscription};
use crate::ws::{hello, send};

/// WS connection states: no backwards transitions.
pub enum ConnState {
    Open,
    Closing,
}

/// Axum handler: upgrades HTTP to WebSocket at GET /ws.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| run_connection(socket, state))
}

/// Per-connection event loop: lives for the entire WS session.
async fn run_connection(socket: WebSocket, state: Arc<AppState>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    info!(conn_id = %conn_id, "new WS connection");

    let (mut tx, mut rx) = socket.split();
    if send::json(&mut tx, &hello::hello_event(&conn_id)).await.is_err() {
        return;
    }
    state.ws_clients.insert(conn_id.clone(), chrono::Utc::now());

    let mut feed: Option<FeedSubscription> = None;

    let mut tick = tokio::time::interval(std::time::Duration::from_secs(HEARTBEAT_INTERVAL_SECS));
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            msg = rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if text.len() > MAX_PAYLOAD_BYTES {
                            let err = ChatroomError::PayloadTooLarge {
                                size: text.len(),
                                max: MAX_PAYLOAD_BYTES,
                            };
                            warn!(conn_id, error = %err, "closing connection");
                            let _ = send::json(&mut tx, &error_event(&err, state.next_seq())).await;
                            break;
                        }
                        let conn_state = message::handle(
                            &conn_id, text.as_str(), &mut feed, &mut tx, &state,
                        ).await;
                        if matches!(conn_state, ConnState::Closing) { break; }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = tx.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!(conn_id, error = %e, "WS read error");
                        break;
                    }
                    _ => {}
                }
            }

            changed = next_change(&mut feed) => {
                if changed {
                    let filter = feed.as_ref().and_then(|f| f.filter.clone());
                    if message::push_snapshot(&conn_id, filter.as_deref(), &mut tx, &state).await.is_err() {
                        break;
                    }
                } else {
                    feed = None;
                }
            }

            _ = tick.tick() => {
                let ev = EventFrame::new(
                    EVENT_TICK,
                    serde_json::json!({ "ts": chrono::Utc::now().timestamp_millis() }),
                ).with_seq(state.next_seq());
                if send::json(&mut tx, &ev).await.is_err() {
                    break;
                }
            }
        }
    }

    state.ws_clients.remove(&conn_id);
    info!(conn_id, "WS connection closed");
}

fn error_event(err: &ChatroomError, seq: u64) -> EventFrame {
    EventFrame::new(
        EVENT_ERROR,
        ErrorShape {
            code: err.code().to_string(),
            message: err.to_string(),
        },
    )
    .with_seq(seq)
}

/// Resolves when the subscribed feed changes. Pending forever without a
/// subscription; `false` if the change signal went away.
async fn next_change(feed: &mut Option<FeedSubscription>) -> bool {
    match feed {
        Some(sub) => sub.changes.changed().await.is_ok(),
        None => std::future::pending().await,
    }
}
