//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{DomainError, Message};
use chrono::{DateTime, Utc};

/// LLM endpoint gateway. Model discovery and chat completion.
#[async_trait::async_trait]
pub trait LlmPort: Send + Sync {
    /// Fetch the model identifiers the endpoint advertises.
    async fn list_models(&self) -> Result<Vec<String>, DomainError>;

    /// Send one completion request (single user-role message) and return the
    /// raw completion text.
    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, DomainError>;
}

/// Message history port. Owned by the persistence layer; the core consumes
/// the returned sequence as-is (ascending by timestamp, never re-sorted).
#[async_trait::async_trait]
pub trait HistoryPort: Send + Sync {
    async fn fetch_history(
        &self,
        channel_id: &str,
        platform: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Message>, DomainError>;
}
