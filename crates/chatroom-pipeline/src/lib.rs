//! `chatroom-pipeline`: the send path, the `/wiki` lookup jobs it spawns,
//! and the live message feed.
//!
//! # Flow
//!
//! 1. [`ChatPipeline::send_message`] appends the message and wakes feed
//!    subscribers.
//! 2. A body starting with `"/wiki "` enqueues a [`LookupJob`].
//! 3. [`LookupWorker`] pulls jobs off the queue and runs each one as its own
//!    detached task. The result is posted back through `send_message` under
//!    the bot sender.
//! 4. Subscribers re-run the feed query whenever the message log changes.

pub mod command;
pub mod error;
pub mod feed;
pub mod pipeline;
pub mod worker;

pub use error::{ChatError, JobError};
pub use feed::{FeedNotifier, RoomStats};
pub use pipeline::ChatPipeline;
pub use worker::{LookupJob, LookupWorker};

/// Sender label whose sends are rejected after the message is stored.
pub const BLOCKED_SENDER: &str = "evil";
/// Description recorded on the audit event of every accepted send.
pub const SENT_DESCRIPTION: &str = "Sent a message";
/// Body posted by the bot when the lookup finds nothing.
pub const NOT_FOUND_BODY: &str = "Info not found";
/// Feed snapshots cover at most this many of the newest messages.
pub const FEED_WINDOW: usize = 50;
