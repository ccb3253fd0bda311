use axum::{
    routing::{get, post},
    Router,
};
use chatroom_core::config::ChatroomConfig;
use chatroom_pipeline::ChatPipeline;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Central shared state: passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: ChatroomConfig,
    pub event_seq: AtomicU64,
    pub pipeline: ChatPipeline,
    /// Active WS connections: conn_id -> connect time.
    pub ws_clients: DashMap<String, DateTime<Utc>>,
}

impl AppState {
    pub fn new(config: ChatroomConfig, pipeline: ChatPipeline) -> Self {
        Self {
            config,
            event_seq: AtomicU64::new(0),
            pipeline,
            ws_clients: DashMap::new(),
        }
    }

    /// Monotonically increasing sequence for pushed events.
    pub fn next_seq(&self) -> u64 {
        self.event_seq.fetch_add(1, Ordering::Relaxed)
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/ws", get(crate::ws::connection::ws_handler))
        .route(
            "/messages",
            post(crate::http::messages::post_message).get(crate::http::messages::list_messages),
        )
        .route(
            "/messages/stream",
            get(crate::http::messages::stream_messages),
        )
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::cors::CorsLayer::permissive())
}

/// In-memory state for handler tests. The lookup queue receiver is dropped,
/// so `/wiki` jobs are logged and discarded.
#[cfg(test)]
pub fn test_state() -> AppState {
    let store =
        chatroom_store::MessageStore::new(rusqlite::Connection::open_in_memory().unwrap()).unwrap();
    let (pipeline, _rx) = ChatPipeline::new(Arc::new(store), 4);
    AppState::new(ChatroomConfig::default(), pipeline)
}
