use chatroom_core::config::{HEARTBEAT_INTERVAL_SECS, MAX_PAYLOAD_BYTES, PROTOCOL_VERSION};
use chatroom_pipeline::FEED_WINDOW;
use chatroom_protocol::{
    frames::EventFrame,
    methods::EVENT_HELLO,
    payloads::{ClientPolicy, Hello, ServerInfo},
};

/// The `hello` event that opens every WS session.
pub fn hello_event(conn_id: &str) -> EventFrame {
    EventFrame::new(EVENT_HELLO, hello_payload(conn_id))
}

pub fn hello_payload(conn_id: &str) -> Hello {
    Hello {
        protocol: PROTOCOL_VERSION,
        server: ServerInfo {
            name: "chatroom".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            conn_id: conn_id.to_string(),
        },
        policy: ClientPolicy {
            max_message_size: MAX_PAYLOAD_BYTES,
            feed_window: FEED_WINDOW,
            heartbeat_secs: HEARTBEAT_INTERVAL_SECS,
        },
    }
}
