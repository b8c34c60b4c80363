//! In-memory history repository. Stand-in for the durable message store,
//! used by the demo binary and tests.

use crate::domain::{DomainError, Message};
use crate::ports::HistoryPort;
use chrono::{DateTime, Utc};
use std::sync::Mutex;

/// Keeps every ingested message and serves windowed queries, ascending by
/// timestamp (the ordering contract the core relies on).
pub struct MemoryHistoryRepo {
    messages: Mutex<Vec<Message>>,
}

impl MemoryHistoryRepo {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn ingest(&self, message: Message) -> Result<(), DomainError> {
        let mut messages = self
            .messages
            .lock()
            .map_err(|e| DomainError::Repo(e.to_string()))?;
        messages.push(message);
        Ok(())
    }
}

impl Default for MemoryHistoryRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl HistoryPort for MemoryHistoryRepo {
    async fn fetch_history(
        &self,
        channel_id: &str,
        platform: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Message>, DomainError> {
        let messages = self
            .messages
            .lock()
            .map_err(|e| DomainError::Repo(e.to_string()))?;
        let mut hits: Vec<Message> = messages
            .iter()
            .filter(|m| {
                m.channel_id == channel_id
                    && m.platform == platform
                    && m.timestamp >= start
                    && m.timestamp < end
            })
            .cloned()
            .collect();
        hits.sort_by_key(|m| m.timestamp);
        hits.truncate(limit);
        Ok(hits)
    }
}
