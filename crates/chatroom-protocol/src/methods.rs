// Well-known WS method and event names.

pub const PING: &str = "ping";

// chat
pub const CHAT_SEND: &str = "chat.send";

// feed
pub const MESSAGES_LIST: &str = "messages.list";
pub const MESSAGES_SUBSCRIBE: &str = "messages.subscribe";
pub const MESSAGES_UNSUBSCRIBE: &str = "messages.unsubscribe";

// audit
pub const EVENTS_LIST: &str = "events.list";

// room
pub const ROOM_STATS: &str = "room.stats";

// server → client events
pub const EVENT_HELLO: &str = "hello";
pub const EVENT_TICK: &str = "tick";
pub const EVENT_MESSAGES_SNAPSHOT: &str = "messages.snapshot";
/// Sent right before the server drops a connection.
pub const EVENT_ERROR: &str = "error";
