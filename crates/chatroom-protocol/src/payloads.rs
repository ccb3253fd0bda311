use serde::{Deserialize, Serialize};

/// Server → Client: first event on every WS session.
/// Sent as: `EVENT hello { protocol: 1, server: {...}, policy: {...} }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hello {
    pub protocol: u32,
    pub server: ServerInfo,
    pub policy: ClientPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
    pub conn_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientPolicy {
    pub max_message_size: usize,
    /// Number of most recent messages a feed snapshot covers.
    pub feed_window: usize,
    pub heartbeat_secs: u64,
}

/// Params for `chat.send`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendParams {
    pub sender: String,
    pub body: String,
}

/// Params for `messages.list` and `messages.subscribe`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FeedParams {
    #[serde(default)]
    pub filter: Option<String>,
}

/// Params for `events.list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsParams {
    pub sender: String,
    #[serde(default)]
    pub limit: Option<usize>,
}
