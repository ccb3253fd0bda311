use std::net::SocketAddr;
use std::sync::Arc;

use chatroom_core::config::ChatroomConfig;
use chatroom_pipeline::{ChatPipeline, LookupWorker};
use chatroom_store::MessageStore;
use chatroom_wiki::WikiClient;
use clap::Parser;
use tracing::info;

mod app;
mod chat;
mod http;
mod ws;

/// Real-time chat room gateway: WebSocket + HTTP, SQLite-backed.
#[derive(Parser, Debug)]
#[command(name = "chatroom-gateway", version, about)]
struct Cli {
    /// Config file (default: $CHATROOM_CONFIG, then ~/.chatroom/chatroom.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Override gateway.bind
    #[arg(long)]
    bind: Option<String>,

    /// Override gateway.port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "chatroom_gateway=info,chatroom_pipeline=info,chatroom_wiki=info,tower_http=debug"
                    .into()
            }),
        )
        .init();

    let cli = Cli::parse();

    // load config: --config > CHATROOM_CONFIG env > ~/.chatroom/chatroom.toml
    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var("CHATROOM_CONFIG").ok());
    let mut config = ChatroomConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        ChatroomConfig::default()
    });
    if let Some(bind) = cli.bind {
        config.gateway.bind = bind;
    }
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }

    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening SQLite database");

    let db = rusqlite::Connection::open(db_path)?;
    db.execute_batch("PRAGMA journal_mode=WAL;")?;
    let store = Arc::new(MessageStore::new(db)?);
    info!("database migrations complete");

    let lookup = WikiClient::from_config(&config.wiki)?;
    info!(endpoint = %config.wiki.endpoint, bot = %config.wiki.bot_name, "summary lookup configured");

    // Lookup queue: send pipeline → LookupWorker → detached lookup tasks
    let (pipeline, lookup_rx) = ChatPipeline::new(store, config.wiki.queue_capacity);
    let worker = LookupWorker::new(
        lookup_rx,
        pipeline.clone(),
        Arc::new(lookup),
        config.wiki.bot_name.clone(),
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(worker.run(shutdown_rx));

    let addr: SocketAddr = config.listen_addr().parse()?;
    let state = Arc::new(app::AppState::new(config, pipeline));
    let router = app::build_router(state);

    info!("chatroom gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // signal lookup worker to stop; in-flight lookups finish on their own
    let _ = shutdown_tx.send(true);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

/// Ensure the parent directory for a file path exists.
fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}
