use chatroom_protocol::{
    frames::{EventFrame, InboundFrame, ReqFrame, ResFrame},
    methods::{EVENT_MESSAGES_SNAPSHOT, MESSAGES_SUBSCRIBE, MESSAGES_UNSUBSCRIBE},
    payloads::FeedParams,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::app::AppState;
use crate::ws::connection::ConnState;
use crate::ws::send::WsSink;
use crate::ws::{dispatch, handlers, send};

/// Live feed attached to one connection.
pub struct FeedSubscription {
    pub filter: Option<String>,
    pub changes: watch::Receiver<u64>,
}

/// Process one inbound WS text frame. Returns the new connection state.
pub async fn handle(
    conn_id: &str,
    text: &str,
    feed: &mut Option<FeedSubscription>,
    tx: &mut WsSink,
    app: &Arc<AppState>,
) -> ConnState {
    let frame: InboundFrame = match serde_json::from_str(text) {
        Ok(f) => f,
        Err(e) => {
            warn!(conn_id, error = %e, "malformed frame");
            return ConnState::Open;
        }
    };

    let Some(req) = frame.into_req() else {
        debug!(conn_id, "ignoring non-request frame");
        return ConnState::Open;
    };

    let sent = match req.method.as_str() {
        MESSAGES_SUBSCRIBE => subscribe(conn_id, req, feed, tx, app).await,
        MESSAGES_UNSUBSCRIBE => {
            *feed = None;
            info!(conn_id, "feed unsubscribed");
            let res = ResFrame::ok(&req.id, serde_json::json!({ "subscribed": false }));
            send::json(tx, &res).await
        }
        _ => {
            let res = dispatch::route(&req.method, req.params.as_ref(), &req.id, app).await;
            send::json(tx, &res).await
        }
    };

    match sent {
        Ok(()) => ConnState::Open,
        Err(_) => ConnState::Closing,
    }
}

/// `messages.subscribe { filter? }`: acknowledge, then push the first
/// snapshot right away. Later snapshots follow every store change.
/// Re-subscribing replaces the previous filter.
async fn subscribe(
    conn_id: &str,
    req: ReqFrame,
    feed: &mut Option<FeedSubscription>,
    tx: &mut WsSink,
    app: &Arc<AppState>,
) -> Result<(), axum::Error> {
    let params: FeedParams = match handlers::parse_params(req.params.as_ref()) {
        Ok(p) => p,
        Err(e) => return send::json(tx, &handlers::error_frame(&req.id, &e)).await,
    };

    let sub = FeedSubscription {
        filter: params.filter,
        changes: app.pipeline.changes(),
    };
    info!(conn_id, filter = ?sub.filter, "feed subscribed");

    let res = ResFrame::ok(&req.id, serde_json::json!({ "subscribed": true }));
    send::json(tx, &res).await?;
    push_snapshot(conn_id, sub.filter.as_deref(), tx, app).await?;
    *feed = Some(sub);
    Ok(())
}

/// Re-run the feed query and push the result as a `messages.snapshot` event.
/// A failed query is logged and skipped; the next change retries it.
pub async fn push_snapshot(
    conn_id: &str,
    filter: Option<&str>,
    tx: &mut WsSink,
    app: &AppState,
) -> Result<(), axum::Error> {
    let messages = match app.pipeline.get_messages(filter) {
        Ok(m) => m,
        Err(e) => {
            warn!(conn_id, error = %e, "feed snapshot failed");
            return Ok(());
        }
    };
    let ev = EventFrame::new(
        EVENT_MESSAGES_SNAPSHOT,
        serde_json::json!({ "messages": messages, "filter": filter }),
    )
    .with_seq(app.next_seq());
    send::json(tx, &ev).await
}
