//! Analysis service. Runs the full pipeline for one message window:
//! aggregate first, then fan out the three extractions, then assemble the
//! report.
//!
//! Aggregation always completes before any prompt is built, because prompts
//! are rendered from aggregate output.

use crate::domain::{AnalysisReport, Message};
use crate::usecases::aggregator::aggregate;
use crate::usecases::extraction_service::ExtractionService;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

pub struct AnalysisService {
    extraction: Arc<ExtractionService>,
    /// Ranked-user truncation for the report, applied exactly once here.
    top_users: usize,
}

impl AnalysisService {
    pub fn new(extraction: Arc<ExtractionService>, top_users: usize) -> Self {
        Self {
            extraction,
            top_users,
        }
    }

    /// Analyze one group's message window. Always produces a report: if
    /// every extraction kind fails the lists are empty and the statistics
    /// still stand.
    pub async fn analyze(&self, group_id: &str, messages: &[Message]) -> AnalysisReport {
        info!(group_id, messages = messages.len(), "starting analysis");

        let aggregate = aggregate(messages);
        let (topics, user_titles, golden_quotes) =
            self.extraction.extract_all(messages, &aggregate).await;

        let mut top_users = aggregate.ranked_users;
        top_users.truncate(self.top_users);
        let most_active_user = top_users.first().map(|u| u.nickname.clone());

        info!(
            group_id,
            participants = aggregate.participant_count,
            topics = topics.len(),
            titles = user_titles.len(),
            quotes = golden_quotes.len(),
            "analysis complete"
        );

        AnalysisReport {
            group_id: group_id.to_string(),
            generated_at: Utc::now().format("%Y-%m-%d %H:%M").to_string(),
            total_messages: aggregate.total_messages,
            total_chars: aggregate.total_chars,
            participant_count: aggregate.participant_count,
            total_emojis: aggregate.total_emojis,
            most_active_hour: aggregate.most_active_hour,
            top_users,
            most_active_user,
            topics,
            user_titles,
            golden_quotes,
        }
    }
}
