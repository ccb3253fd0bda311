// Wire format checks for the frames browser clients depend on.

use chatroom_protocol::frames::{EventFrame, InboundFrame, ResFrame};
use chatroom_protocol::methods;
use chatroom_protocol::payloads::{ClientPolicy, FeedParams, Hello, SendParams, ServerInfo};

#[test]
fn req_frame_parses_with_params() {
    let json = r#"{"type":"req","id":"abc-123","method":"chat.send","params":{"sender":"Alice","body":"hello"}}"#;
    let frame: InboundFrame = serde_json::from_str(json).unwrap();

    let req = frame.into_req().unwrap();
    assert_eq!(req.method, methods::CHAT_SEND);
    assert_eq!(req.id, "abc-123");

    let params: SendParams = serde_json::from_value(req.params.unwrap()).unwrap();
    assert_eq!(params.sender, "Alice");
    assert_eq!(params.body, "hello");
}

#[test]
fn req_frame_without_params() {
    let json = r#"{"type":"req","id":"1","method":"room.stats"}"#;
    let req = serde_json::from_str::<InboundFrame>(json)
        .unwrap()
        .into_req()
        .unwrap();
    assert!(req.params.is_none());
}

#[test]
fn res_ok_serialization() {
    let res = ResFrame::ok("req-1", serde_json::json!({"pong": true}));
    let json = serde_json::to_string(&res).unwrap();

    assert!(json.contains(r#""type":"res""#));
    assert!(json.contains(r#""ok":true"#));
    assert!(json.contains(r#""pong":true"#));
    // error field must be absent on success
    assert!(!json.contains(r#""error""#));
}

#[test]
fn res_err_serialization() {
    let res = ResFrame::err("req-2", "BLOCKED_SENDER", "Sender is blocked: evil");
    let json = serde_json::to_string(&res).unwrap();

    assert!(json.contains(r#""ok":false"#));
    assert!(json.contains(r#""BLOCKED_SENDER""#));
    // payload must be absent on error
    assert!(!json.contains(r#""payload""#));
}

#[test]
fn snapshot_event_with_seq() {
    let ev = EventFrame::new(
        methods::EVENT_MESSAGES_SNAPSHOT,
        serde_json::json!({"messages": []}),
    )
    .with_seq(42);
    let json = serde_json::to_string(&ev).unwrap();

    assert!(json.contains(r#""type":"event""#));
    assert!(json.contains(r#""event":"messages.snapshot""#));
    assert!(json.contains(r#""seq":42"#));
}

#[test]
fn feed_params_filter_is_optional() {
    let params: FeedParams = serde_json::from_str("{}").unwrap();
    assert!(params.filter.is_none());

    let params: FeedParams = serde_json::from_str(r#"{"filter":"ali"}"#).unwrap();
    assert_eq!(params.filter.as_deref(), Some("ali"));
}

#[test]
fn hello_carries_protocol_and_window() {
    let hello = Hello {
        protocol: 1,
        server: ServerInfo {
            name: "chatroom".into(),
            version: "0.1.0".into(),
            conn_id: "c-1".into(),
        },
        policy: ClientPolicy {
            max_message_size: 1024,
            feed_window: 50,
            heartbeat_secs: 30,
        },
    };
    let json = serde_json::to_string(&hello).unwrap();
    assert!(json.contains(r#""protocol":1"#));
    assert!(json.contains(r#""feed_window":50"#));
}

#[test]
fn inbound_frame_ignores_non_req() {
    let json = r#"{"type":"event","event":"tick","payload":{}}"#;
    let frame: InboundFrame = serde_json::from_str(json).unwrap();
    assert!(frame.into_req().is_none(), "event frame must not parse as req");
}
