//! Domain entities. Pure data structures for the core business.
//!
//! No platform/IO types here — these are mapped from adapters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single chat message as observed at the ingestion boundary.
/// Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub platform: String,
    pub channel_id: String,
    /// Raw textual content. Used as a fallback when `segments` is empty.
    pub content: String,
    /// Structured content segments, in message order.
    #[serde(default)]
    pub segments: Vec<Segment>,
    pub timestamp: DateTime<Utc>,
}

/// A structured piece of message content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Segment {
    Text { text: String },
    Reply,
    Mention,
    /// Platform emoji/sticker, tagged by its platform-specific id.
    Emoji { id: String },
}

/// Per-user counters and derived ratios for one analysis run.
///
/// Raw counters accumulate message by message; the derived ratios are
/// recomputed from the final counters in a finishing pass, never
/// incrementally, so a full pass stays idempotent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub user_id: String,
    pub nickname: String,
    pub message_count: u32,
    pub char_count: u32,
    pub reply_count: u32,
    pub mention_count: u32,
    /// emoji id -> times this user sent it
    pub emoji_counts: HashMap<String, u32>,
    /// hour-of-day (0..24) -> message count
    pub hour_counts: [u32; 24],
    pub last_active: DateTime<Utc>,
    /// chars per message, one decimal
    pub avg_chars: f64,
    /// share of messages in hours [0, 6), two decimals
    pub night_ratio: f64,
    /// replies per message, two decimals
    pub reply_ratio: f64,
    /// group-wide emoji total over this user's message count, two decimals
    pub emoji_ratio: f64,
}

impl UserStats {
    pub fn new(user_id: String, nickname: String, first_seen: DateTime<Utc>) -> Self {
        Self {
            user_id,
            nickname,
            message_count: 0,
            char_count: 0,
            reply_count: 0,
            mention_count: 0,
            emoji_counts: HashMap::new(),
            hour_counts: [0; 24],
            last_active: first_seen,
            avg_chars: 0.0,
            night_ratio: 0.0,
            reply_ratio: 0.0,
            emoji_ratio: 0.0,
        }
    }
}

/// Group-level totals plus the ranked user list. Derived once per analysis
/// run, read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateResult {
    pub total_messages: u32,
    pub total_chars: u32,
    pub participant_count: u32,
    pub total_emojis: u32,
    /// hour-of-day -> total count across all users
    pub hour_totals: [u32; 24],
    /// Rendered as "H:00-H+1:00"; ties go to the lowest hour.
    pub most_active_hour: String,
    /// Descending by message count; ties keep first-appearance order.
    pub ranked_users: Vec<UserStats>,
}

/// A discussion topic extracted by the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub title: String,
    /// At most 5 contributor ids/names.
    pub contributors: Vec<String>,
    pub detail: String,
}

/// A per-user title awarded by the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTitle {
    pub user: String,
    pub title: String,
    /// Personality-type label (MBTI-style tag).
    pub personality: String,
    pub reason: String,
}

/// A memorable quote picked by the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldenQuote {
    pub content: String,
    pub sender: String,
    pub reason: String,
}

/// Final output of the core: statistics plus the three extraction lists.
/// Handed to the rendering boundary as a value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub group_id: String,
    /// Human-readable generation timestamp (UTC).
    pub generated_at: String,
    pub total_messages: u32,
    pub total_chars: u32,
    pub participant_count: u32,
    pub total_emojis: u32,
    pub most_active_hour: String,
    /// Truncated to the configured report size; consumers never re-rank.
    pub top_users: Vec<UserStats>,
    /// Nickname of the ranked head, if any user was seen.
    pub most_active_user: Option<String>,
    pub topics: Vec<Topic>,
    pub user_titles: Vec<UserTitle>,
    pub golden_quotes: Vec<GoldenQuote>,
}
