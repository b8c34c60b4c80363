//! Bounded recency cache: a short in-memory tail of recent messages per
//! (platform, id) key, with time-based expiry.
//!
//! Best-effort view only; historical queries go through `HistoryPort`.
//! Sweeping runs off an external periodic signal, not per read, so `get`
//! still checks timestamps as a safety net against stale-but-unswept tails.

use crate::domain::Message;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Cache key: platform tag plus a user or channel identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub platform: String,
    pub id: String,
}

impl CacheKey {
    pub fn new(platform: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            id: id.into(),
        }
    }
}

/// Per-key bounded, time-windowed message store. Newest first.
pub struct RecencyCache {
    capacity: usize,
    expire_after: Duration,
    entries: HashMap<CacheKey, VecDeque<Message>>,
}

impl RecencyCache {
    pub fn new(capacity: usize, expire_after: Duration) -> Self {
        Self {
            capacity,
            expire_after,
            entries: HashMap::new(),
        }
    }

    /// Append a message to the key's tail and trim to capacity
    /// (oldest dropped first).
    pub fn put(&mut self, key: CacheKey, message: Message) {
        let tail = self.entries.entry(key).or_default();
        tail.push_front(message);
        tail.truncate(self.capacity);
    }

    /// Current tail for the key, newest first. Entries older than the expiry
    /// window are excluded even if a sweep has not caught them yet.
    pub fn get(&self, key: &CacheKey, now: DateTime<Utc>) -> Vec<Message> {
        let horizon = now - self.expire_after;
        self.entries
            .get(key)
            .map(|tail| {
                tail.iter()
                    .filter(|m| m.timestamp > horizon)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drop every message older than the expiry window; keys whose tail
    /// becomes empty are removed entirely.
    pub fn sweep(&mut self, now: DateTime<Utc>) {
        let horizon = now - self.expire_after;
        let before: usize = self.entries.values().map(|t| t.len()).sum();
        for tail in self.entries.values_mut() {
            tail.retain(|m| m.timestamp > horizon);
        }
        self.entries.retain(|_, tail| !tail.is_empty());
        let after: usize = self.entries.values().map(|t| t.len()).sum();
        if before != after {
            debug!(swept = before - after, keys = self.entries.len(), "cache sweep");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Periodic sweep driver. Runs until the cache is dropped by every other
/// holder; spawn it next to ingestion.
pub async fn run_sweeper(cache: Arc<Mutex<RecencyCache>>, interval: std::time::Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // first tick fires immediately
    loop {
        ticker.tick().await;
        if let Ok(mut cache) = cache.lock() {
            cache.sweep(Utc::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn msg(id: u32, ts: DateTime<Utc>) -> Message {
        Message {
            id: id.to_string(),
            sender_id: "u1".to_string(),
            sender_name: "u1-name".to_string(),
            platform: "onebot".to_string(),
            channel_id: "g1".to_string(),
            content: format!("msg {}", id),
            segments: vec![],
            timestamp: ts,
        }
    }

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap()
    }

    #[test]
    fn capacity_plus_one_drops_the_oldest() {
        let mut cache = RecencyCache::new(3, Duration::hours(1));
        let key = CacheKey::new("onebot", "u1");
        for i in 0..4 {
            cache.put(key.clone(), msg(i, at(i)));
        }
        let tail = cache.get(&key, at(5));
        assert_eq!(tail.len(), 3);
        // newest first, message 0 gone
        let ids: Vec<&str> = tail.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
    }

    #[test]
    fn sweep_removes_expired_and_empty_keys() {
        let mut cache = RecencyCache::new(10, Duration::minutes(10));
        let stale = CacheKey::new("onebot", "stale");
        let live = CacheKey::new("onebot", "live");
        cache.put(stale.clone(), msg(1, at(0)));
        cache.put(live.clone(), msg(2, at(0)));
        cache.put(live.clone(), msg(3, at(25)));

        cache.sweep(at(30));

        assert!(cache.get(&stale, at(30)).is_empty());
        assert_eq!(cache.len(), 1); // stale key removed, not left empty
        let tail = cache.get(&live, at(30));
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].id, "3");
    }

    #[test]
    fn get_excludes_stale_entries_before_any_sweep() {
        let mut cache = RecencyCache::new(10, Duration::minutes(10));
        let key = CacheKey::new("onebot", "u1");
        cache.put(key.clone(), msg(1, at(0)));
        cache.put(key.clone(), msg(2, at(29)));

        // No sweep ran; the timestamp check still filters.
        let tail = cache.get(&key, at(30));
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].id, "2");
    }

    #[test]
    fn get_unknown_key_is_empty() {
        let cache = RecencyCache::new(10, Duration::minutes(10));
        assert!(cache.get(&CacheKey::new("onebot", "nobody"), at(0)).is_empty());
    }
}
