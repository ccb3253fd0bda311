use chatroom_store::Message;
use serde::Serialize;
use tokio::sync::watch;

/// Change signal for the message log.
///
/// Holds a version counter rather than the data: subscribers wake on a bump
/// and re-run their own (possibly filtered) query, so every delivery is a
/// consistent snapshot of the store at read time. Intermediate versions may
/// be coalesced if a subscriber is slow.
pub struct FeedNotifier {
    tx: watch::Sender<u64>,
}

impl FeedNotifier {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self { tx }
    }

    /// Bump the version. Never fails, even with no subscribers.
    pub fn notify(&self) {
        self.tx.send_modify(|v| *v += 1);
    }

    pub fn watch(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }

    #[cfg(test)]
    fn version(&self) -> u64 {
        *self.tx.borrow()
    }
}

impl Default for FeedNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep messages whose sender contains `filter`, ignoring case. A missing or
/// blank filter keeps everything. Applied to an already-capped window.
pub fn apply_filter(messages: Vec<Message>, filter: Option<&str>) -> Vec<Message> {
    let needle = match filter.map(str::trim) {
        Some(f) if !f.is_empty() => f.to_lowercase(),
        _ => return messages,
    };
    messages
        .into_iter()
        .filter(|m| m.sender.to_lowercase().contains(&needle))
        .collect()
}

/// Header counters over the current feed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoomStats {
    /// Distinct senders in the window.
    pub users: usize,
    pub messages: usize,
}

impl RoomStats {
    pub fn from_window(messages: &[Message]) -> Self {
        let mut senders: Vec<&str> = messages.iter().map(|m| m.sender.as_str()).collect();
        senders.sort_unstable();
        senders.dedup();
        Self {
            users: senders.len(),
            messages: messages.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(seq: i64, sender: &str) -> Message {
        Message {
            id: format!("id-{seq}"),
            seq,
            sender: sender.to_string(),
            body: "hi".to_string(),
            created_at: String::new(),
        }
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let window = vec![msg(1, "Alice"), msg(2, "Bob"), msg(3, "alicia")];
        let kept = apply_filter(window, Some("ALI"));
        let seqs: Vec<i64> = kept.iter().map(|m| m.seq).collect();
        assert_eq!(seqs, vec![1, 3]);
    }

    #[test]
    fn blank_filter_keeps_everything() {
        let window = vec![msg(1, "Alice"), msg(2, "Bob")];
        assert_eq!(apply_filter(window.clone(), None).len(), 2);
        assert_eq!(apply_filter(window, Some("   ")).len(), 2);
    }

    #[test]
    fn stats_count_distinct_senders() {
        let window = vec![msg(1, "Alice"), msg(2, "Bob"), msg(3, "Alice")];
        assert_eq!(
            RoomStats::from_window(&window),
            RoomStats {
                users: 2,
                messages: 3
            }
        );
    }

    #[tokio::test]
    async fn notify_wakes_watchers() {
        let feed = FeedNotifier::new();
        let mut rx = feed.watch();
        feed.notify();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 1);
        assert_eq!(feed.version(), 1);
    }
}
