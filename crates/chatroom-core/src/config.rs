use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: u32 = 1;
pub const DEFAULT_PORT: u16 = 3210;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const MAX_PAYLOAD_BYTES: usize = 128 * 1024; // 128 KB hard cap per frame
pub const HEARTBEAT_INTERVAL_SECS: u64 = 30; // tick event cadence

pub const DEFAULT_WIKI_ENDPOINT: &str = "https://en.wikipedia.org/w/api.php";
pub const DEFAULT_BOT_NAME: &str = "Wikipedia";
/// Pending lookups buffered between the send path and the lookup worker.
pub const DEFAULT_LOOKUP_QUEUE: usize = 256;

/// Top-level config (chatroom.toml + CHATROOM_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatroomConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub wiki: WikiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Summary lookup used by `/wiki <topic>` messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiConfig {
    /// MediaWiki `api.php` URL, without query string.
    #[serde(default = "default_wiki_endpoint")]
    pub endpoint: String,
    /// Sender label used when the lookup result is posted back to the room.
    #[serde(default = "default_bot_name")]
    pub bot_name: String,
    /// Upper bound for a single lookup request. Unset means the HTTP
    /// client's own defaults apply.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_lookup_queue")]
    pub queue_capacity: usize,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_wiki_endpoint(),
            bot_name: default_bot_name(),
            timeout_secs: None,
            queue_capacity: DEFAULT_LOOKUP_QUEUE,
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_wiki_endpoint() -> String {
    DEFAULT_WIKI_ENDPOINT.to_string()
}
fn default_bot_name() -> String {
    DEFAULT_BOT_NAME.to_string()
}
fn default_lookup_queue() -> usize {
    DEFAULT_LOOKUP_QUEUE
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.chatroom/chatroom.db", home)
}

impl ChatroomConfig {
    /// Load config from a TOML file with CHATROOM_* env var overrides.
    ///
    /// Path: explicit argument, else ~/.chatroom/chatroom.toml. A missing
    /// file is not an error; every field has a default.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        Self::figment(&path)
            .extract()
            .map_err(|e| crate::error::ChatroomError::Config(e.to_string()))
    }

    fn figment(path: &str) -> Figment {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("CHATROOM_").split("_"))
    }

    /// `bind:port` string for the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.gateway.bind, self.gateway.port)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.chatroom/chatroom.toml", home)
}
