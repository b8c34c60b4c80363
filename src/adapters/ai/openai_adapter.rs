//! OpenAI-compatible adapter for the LLM transport.
//!
//! Works against OpenAI, Azure OpenAI, Ollama and any other endpoint
//! speaking the `/models` + `/chat/completions` protocol. Implements
//! `LlmPort`.

use crate::domain::DomainError;
use crate::ports::LlmPort;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// OpenAI-compatible LLM gateway.
pub struct OpenAiAdapter {
    client: reqwest::Client,
    /// API base, e.g. "https://api.openai.com/v1" (no trailing slash).
    base_url: String,
    /// Can be empty for local endpoints.
    api_key: String,
}

impl OpenAiAdapter {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, DomainError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().to_string();
        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, body = %truncate(&body), "LLM API returned error");
        Err(DomainError::Transport { status, body })
    }
}

/// Chat completion request body.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: String,
}

/// `GET /models` response body.
#[derive(Deserialize)]
struct ModelsResponse {
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}

#[async_trait::async_trait]
impl LlmPort for OpenAiAdapter {
    async fn list_models(&self) -> Result<Vec<String>, DomainError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| DomainError::Transport {
                status: "request failed".to_string(),
                body: e.to_string(),
            })?;

        let response = Self::check_status(response).await?;
        let models: ModelsResponse =
            response
                .json()
                .await
                .map_err(|e| DomainError::Transport {
                    status: "bad discovery payload".to_string(),
                    body: e.to_string(),
                })?;

        let ids: Vec<String> = models.data.into_iter().map(|m| m.id).collect();
        debug!(advertised = ids.len(), "model discovery complete");
        Ok(ids)
    }

    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, DomainError> {
        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::Transport {
                status: "request failed".to_string(),
                body: e.to_string(),
            })?;

        let response = Self::check_status(response).await?;
        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Transport {
                status: "bad completion payload".to_string(),
                body: e.to_string(),
            })?;

        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default();
        debug!(raw_len = content.len(), "completion received");
        Ok(content)
    }
}

fn truncate(text: &str) -> String {
    text.chars().take(200).collect()
}
