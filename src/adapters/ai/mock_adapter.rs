//! Mock LLM adapter for development without API calls.
//!
//! Returns canned fenced-yaml completions and simulates network latency.

use crate::domain::DomainError;
use crate::ports::LlmPort;
use std::time::Duration;
use tracing::info;

/// Mock LLM gateway. Picks a canned answer by sniffing the prompt for the
/// extraction kind's placeholder text.
pub struct MockLlmAdapter {
    /// Simulated network delay in milliseconds.
    delay_ms: u64,
}

impl MockLlmAdapter {
    pub fn new() -> Self {
        Self { delay_ms: 100 }
    }

    pub fn with_delay(delay_ms: u64) -> Self {
        Self { delay_ms }
    }
}

impl Default for MockLlmAdapter {
    fn default() -> Self {
        Self::new()
    }
}

const MOCK_TOPICS: &str = "```yaml
- title: \"[MOCK] Weekend plans\"
  contributors: [alice, bob]
  detail: Deciding where to hike on Saturday.
- title: \"[MOCK] Build breakage\"
  contributors: [carol]
  detail: The CI pipeline was red all morning.
```";

const MOCK_TITLES: &str = "```yaml
- user: alice
  title: \"[MOCK] Night Owl\"
  personality: INTP
  reason: Most messages land between midnight and dawn.
```";

const MOCK_QUOTES: &str = "```yaml
- content: \"[MOCK] It compiles, ship it.\"
  sender: bob
  reason: Peak engineering optimism.
```";

#[async_trait::async_trait]
impl LlmPort for MockLlmAdapter {
    async fn list_models(&self) -> Result<Vec<String>, DomainError> {
        info!("[MOCK] advertising models");
        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        Ok(vec!["mock-qwen-7b".to_string()])
    }

    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        _temperature: f32,
    ) -> Result<String, DomainError> {
        info!(model, prompt_len = prompt.len(), "[MOCK] simulating completion");
        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;

        let body = if prompt.contains("golden quotes") {
            MOCK_QUOTES
        } else if prompt.contains("titles") {
            MOCK_TITLES
        } else {
            MOCK_TOPICS
        };
        Ok(body.to_string())
    }
}
