//! Statistics aggregation: one pass over a message window, then a finishing
//! pass that derives ratios from the final counters.
//!
//! Pure and deterministic — no IO, no clock reads. Ranking ties are broken
//! by first-appearance order in the input.

use crate::domain::{AggregateResult, Message, Segment, UserStats};
use chrono::Timelike;
use std::collections::HashMap;

/// Hours counted as "night" for the night ratio: [0, 6).
const NIGHT_HOURS_END: u32 = 6;

/// Aggregate a message window into per-user stats and group totals.
///
/// Users are created lazily on their first message, so every present user
/// has `message_count >= 1` and the ratio divisions are always defined.
pub fn aggregate(messages: &[Message]) -> AggregateResult {
    let mut stats: HashMap<String, UserStats> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();
    let mut hour_totals = [0u32; 24];
    let mut total_emojis = 0u32;

    for msg in messages {
        let user = stats.entry(msg.sender_id.clone()).or_insert_with(|| {
            first_seen.push(msg.sender_id.clone());
            UserStats::new(msg.sender_id.clone(), msg.sender_name.clone(), msg.timestamp)
        });

        user.message_count += 1;
        user.last_active = msg.timestamp;

        let hour = msg.timestamp.hour() as usize;
        user.hour_counts[hour] += 1;
        hour_totals[hour] += 1;

        if msg.segments.is_empty() {
            // No structured segments: count the raw text instead.
            user.char_count += msg.content.chars().count() as u32;
        } else {
            for segment in &msg.segments {
                match segment {
                    Segment::Text { text } => {
                        user.char_count += text.chars().count() as u32;
                    }
                    Segment::Reply => user.reply_count += 1,
                    Segment::Mention => user.mention_count += 1,
                    Segment::Emoji { id } => {
                        *user.emoji_counts.entry(id.clone()).or_insert(0) += 1;
                        total_emojis += 1;
                    }
                }
            }
        }
    }

    // Finishing pass: derive every ratio from the final counters.
    for user in stats.values_mut() {
        let n = user.message_count as f64;
        user.avg_chars = round1(user.char_count as f64 / n);
        let night: u32 = user.hour_counts[..NIGHT_HOURS_END as usize].iter().sum();
        user.night_ratio = round2(night as f64 / n);
        user.reply_ratio = round2(user.reply_count as f64 / n);
        // Numerator is the group-wide emoji total, not the user's own count.
        user.emoji_ratio = round2(total_emojis as f64 / n);
    }

    let total_messages = messages.len() as u32;
    let total_chars = stats.values().map(|u| u.char_count).sum();
    let participant_count = stats.len() as u32;

    // Stable sort over first-seen order pins the tie-break.
    let mut ranked_users: Vec<UserStats> = first_seen
        .iter()
        .map(|id| stats[id].clone())
        .collect();
    ranked_users.sort_by(|a, b| b.message_count.cmp(&a.message_count));

    AggregateResult {
        total_messages,
        total_chars,
        participant_count,
        total_emojis,
        hour_totals,
        most_active_hour: most_active_hour(&hour_totals),
        ranked_users,
    }
}

/// Hour bucket with the highest total, rendered as "H:00-H+1:00".
/// Strict greater-than keeps the lowest hour on ties.
fn most_active_hour(hour_totals: &[u32; 24]) -> String {
    let mut best = 0usize;
    for (hour, &count) in hour_totals.iter().enumerate() {
        if count > hour_totals[best] {
            best = hour;
        }
    }
    format!("{}:00-{}:00", best, best + 1)
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn msg(id: u32, sender: &str, hour: u32, segments: Vec<Segment>) -> Message {
        Message {
            id: id.to_string(),
            sender_id: sender.to_string(),
            sender_name: format!("{}-name", sender),
            platform: "onebot".to_string(),
            channel_id: "group-1".to_string(),
            content: "hello".to_string(),
            segments,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, hour, 30, 0).unwrap(),
        }
    }

    fn text(s: &str) -> Segment {
        Segment::Text {
            text: s.to_string(),
        }
    }

    #[test]
    fn counts_are_permutation_invariant() {
        let mut messages = vec![
            msg(1, "a", 10, vec![text("alpha")]),
            msg(2, "b", 3, vec![text("beta"), Segment::Reply]),
            msg(3, "a", 23, vec![Segment::Emoji { id: "1".into() }]),
            msg(4, "c", 0, vec![text("gamma"), Segment::Mention]),
        ];
        let forward = aggregate(&messages);
        messages.reverse();
        let backward = aggregate(&messages);

        assert_eq!(forward.total_messages, backward.total_messages);
        assert_eq!(forward.total_chars, backward.total_chars);
        assert_eq!(forward.total_emojis, backward.total_emojis);
        assert_eq!(forward.participant_count, backward.participant_count);
        for user in &forward.ranked_users {
            let other = backward
                .ranked_users
                .iter()
                .find(|u| u.user_id == user.user_id)
                .unwrap();
            assert_eq!(user.message_count, other.message_count);
            assert_eq!(user.char_count, other.char_count);
            assert_eq!(user.night_ratio, other.night_ratio);
            assert_eq!(user.emoji_ratio, other.emoji_ratio);
        }
    }

    #[test]
    fn emoji_ratio_uses_group_total() {
        // "a" sends 4 emojis, "b" sends none; both send 2 messages.
        let messages = vec![
            msg(1, "a", 12, vec![
                Segment::Emoji { id: "1".into() },
                Segment::Emoji { id: "1".into() },
            ]),
            msg(2, "a", 12, vec![
                Segment::Emoji { id: "2".into() },
                Segment::Emoji { id: "3".into() },
            ]),
            msg(3, "b", 12, vec![text("no emoji here")]),
            msg(4, "b", 12, vec![text("still none")]),
        ];
        let result = aggregate(&messages);
        assert_eq!(result.total_emojis, 4);

        let b = result
            .ranked_users
            .iter()
            .find(|u| u.user_id == "b")
            .unwrap();
        // Group total (4) over b's message count (2), not b's own zero.
        assert_eq!(b.emoji_ratio, 2.0);
    }

    #[test]
    fn ranking_ties_keep_first_seen_order() {
        let messages = vec![
            msg(1, "late-winner", 9, vec![text("x")]),
            msg(2, "tied-first", 9, vec![text("x")]),
            msg(3, "tied-second", 9, vec![text("x")]),
            msg(4, "late-winner", 9, vec![text("x")]),
        ];
        let result = aggregate(&messages);
        let order: Vec<&str> = result
            .ranked_users
            .iter()
            .map(|u| u.user_id.as_str())
            .collect();
        assert_eq!(order, vec!["late-winner", "tied-first", "tied-second"]);
    }

    #[test]
    fn empty_segments_fall_back_to_raw_content() {
        let mut m = msg(1, "a", 8, vec![]);
        m.content = "四个字啊".to_string();
        let result = aggregate(&[m]);
        // chars(), not bytes
        assert_eq!(result.total_chars, 4);
        assert_eq!(result.ranked_users[0].avg_chars, 4.0);
    }

    #[test]
    fn ratios_come_from_the_finishing_pass() {
        let messages = vec![
            msg(1, "a", 2, vec![text("ab"), Segment::Reply]),
            msg(2, "a", 3, vec![text("abc")]),
            msg(3, "a", 14, vec![text("a")]),
        ];
        let result = aggregate(&messages);
        let a = &result.ranked_users[0];
        assert_eq!(a.avg_chars, 2.0);
        assert_eq!(a.night_ratio, 0.67);
        assert_eq!(a.reply_ratio, 0.33);
    }

    #[test]
    fn most_active_hour_ties_resolve_to_lowest() {
        let messages = vec![
            msg(1, "a", 5, vec![text("x")]),
            msg(2, "b", 21, vec![text("x")]),
        ];
        let result = aggregate(&messages);
        assert_eq!(result.most_active_hour, "5:00-6:00");
    }

    #[test]
    fn empty_window_produces_empty_aggregate() {
        let result = aggregate(&[]);
        assert_eq!(result.total_messages, 0);
        assert_eq!(result.participant_count, 0);
        assert!(result.ranked_users.is_empty());
        assert_eq!(result.most_active_hour, "0:00-1:00");
    }
}
