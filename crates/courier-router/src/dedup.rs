//! Suppression of re-delivered messages.
//!
//! The platform retries a webhook callback when the first delivery is not
//! answered in time, so the same message can arrive several times within a
//! few seconds. A [`DuplicateChecker`] lets the router drop the repeats.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use courier_core::InMessage;

/// Default time a message id is remembered.
pub const DEFAULT_TTL: Duration = Duration::from_secs(15);

/// Default minimum interval between two purges of expired ids.
pub const DEFAULT_CLEAR_INTERVAL: Duration = Duration::from_secs(5);

/// Remembers recently seen message keys.
pub trait DuplicateChecker: Send + Sync + 'static {
    /// Records `key` and returns `true` if it was already seen recently.
    fn is_duplicate(&self, key: &str) -> bool;
}

/// Identity of a message for duplicate detection.
///
/// Ordinary messages carry a `MsgId`; events do not, so they are identified
/// by creation time, sender and event fields instead.
pub fn dedup_key(message: &InMessage) -> String {
    match message.msg_id {
        Some(id) => id.to_string(),
        None => format!(
            "{}-{}-{}-{}",
            message.create_time.unwrap_or_default(),
            message.from_user.as_deref().unwrap_or(""),
            message.event.as_deref().unwrap_or(""),
            message.event_key.as_deref().unwrap_or(""),
        ),
    }
}

/// In-process [`DuplicateChecker`] with expiring entries.
///
/// Expired keys are purged lazily, at most once per clear interval.
pub struct MemoryDuplicateChecker {
    ttl: Duration,
    clear_interval: Duration,
    state: Mutex<SeenKeys>,
}

struct SeenKeys {
    seen: HashMap<String, Instant>,
    last_clear: Instant,
}

impl Default for MemoryDuplicateChecker {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CLEAR_INTERVAL)
    }
}

impl MemoryDuplicateChecker {
    pub fn new(ttl: Duration, clear_interval: Duration) -> Self {
        Self {
            ttl,
            clear_interval,
            state: Mutex::new(SeenKeys {
                seen: HashMap::new(),
                last_clear: Instant::now(),
            }),
        }
    }

    /// Number of keys currently remembered, expired or not.
    pub fn len(&self) -> usize {
        self.state.lock().seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DuplicateChecker for MemoryDuplicateChecker {
    fn is_duplicate(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut state = self.state.lock();

        if now.duration_since(state.last_clear) >= self.clear_interval {
            let ttl = self.ttl;
            state.seen.retain(|_, seen_at| now.duration_since(*seen_at) < ttl);
            state.last_clear = now;
        }

        match state.seen.get(key) {
            Some(seen_at) if now.duration_since(*seen_at) < self.ttl => true,
            _ => {
                state.seen.insert(key.to_owned(), now);
                false
            }
        }
    }
}

impl std::fmt::Debug for MemoryDuplicateChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDuplicateChecker")
            .field("ttl", &self.ttl)
            .field("clear_interval", &self.clear_interval)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_sighting_is_duplicate() {
        let checker = MemoryDuplicateChecker::default();
        assert!(!checker.is_duplicate("1001"));
        assert!(checker.is_duplicate("1001"));
        assert!(!checker.is_duplicate("1002"));
    }

    #[test]
    fn keys_expire_after_ttl() {
        let checker = MemoryDuplicateChecker::new(Duration::from_millis(20), Duration::ZERO);
        assert!(!checker.is_duplicate("k"));
        std::thread::sleep(Duration::from_millis(40));

        assert!(!checker.is_duplicate("k"));
        assert_eq!(checker.len(), 1);
    }

    #[test]
    fn purge_drops_expired_keys() {
        let checker = MemoryDuplicateChecker::new(Duration::from_millis(10), Duration::ZERO);
        checker.is_duplicate("a");
        checker.is_duplicate("b");
        std::thread::sleep(Duration::from_millis(30));

        checker.is_duplicate("c");
        assert_eq!(checker.len(), 1);
    }

    #[test]
    fn key_prefers_msg_id() {
        let message = InMessage::new().with_msg_id(42).with_from_user("o_user");
        assert_eq!(dedup_key(&message), "42");
    }

    #[test]
    fn event_key_is_built_from_fields() {
        let message = InMessage::new()
            .with_create_time(1_700_000_000)
            .with_from_user("o_user")
            .with_event("CLICK")
            .with_event_key("menu_help");
        assert_eq!(dedup_key(&message), "1700000000-o_user-CLICK-menu_help");
    }
}
