//! Application configuration. LLM endpoint, analysis knobs, cache tuning.

use serde::Deserialize;

/// Default bounded tail length per cache key.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// LLM API base URL. Read from CHAT_INSIGHT_API_URL.
    #[serde(default)]
    pub api_url: Option<String>,

    /// LLM API key (can be empty for local endpoints). Read from CHAT_INSIGHT_API_KEY.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Explicit model identifier. Absent = endpoint discovery. Read from CHAT_INSIGHT_MODEL.
    #[serde(default)]
    pub model: Option<String>,

    /// Completion sampling temperature. Read from CHAT_INSIGHT_TEMPERATURE.
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Max topics requested per analysis. Read from CHAT_INSIGHT_MAX_TOPICS.
    #[serde(default)]
    pub max_topics: Option<usize>,

    /// Max golden quotes requested per analysis. Read from CHAT_INSIGHT_MAX_GOLDEN_QUOTES.
    #[serde(default)]
    pub max_golden_quotes: Option<usize>,

    /// Ranked-user truncation for the report. Read from CHAT_INSIGHT_TOP_USERS.
    #[serde(default)]
    pub top_users: Option<usize>,

    /// Recency cache tail length per key. Read from CHAT_INSIGHT_CACHE_CAPACITY.
    #[serde(default)]
    pub cache_capacity: Option<usize>,

    /// Recency cache expiry window in seconds. Read from CHAT_INSIGHT_CACHE_EXPIRE_SECS.
    #[serde(default)]
    pub cache_expire_secs: Option<u64>,

    /// Cache sweep interval in seconds. Read from CHAT_INSIGHT_SWEEP_INTERVAL_SECS.
    #[serde(default)]
    pub sweep_interval_secs: Option<u64>,

    /// Minimum window size worth analyzing (caller-side precondition).
    /// Read from CHAT_INSIGHT_MIN_MESSAGES.
    #[serde(default)]
    pub min_messages: Option<usize>,

    // ─────────────────────────────────────────────────────────────────────────
    // Prompt template overrides (optional; defaults live in ExtractionConfig)
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(default)]
    pub topics_prompt: Option<String>,

    #[serde(default)]
    pub titles_prompt: Option<String>,

    #[serde(default)]
    pub quotes_prompt: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("CHAT_INSIGHT"));
        if let Ok(path) = std::env::var("CHAT_INSIGHT_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// API base URL. Defaults to the OpenAI endpoint.
    pub fn api_url_or_default(&self) -> String {
        self.api_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string())
    }

    pub fn api_key_or_default(&self) -> String {
        self.api_key.clone().unwrap_or_default()
    }

    /// Returns true if a real LLM endpoint is usable (API key present).
    pub fn is_llm_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    pub fn temperature_or_default(&self) -> f32 {
        self.temperature.unwrap_or(0.7)
    }

    pub fn max_topics_or_default(&self) -> usize {
        self.max_topics.unwrap_or(5)
    }

    pub fn max_golden_quotes_or_default(&self) -> usize {
        self.max_golden_quotes.unwrap_or(3)
    }

    pub fn top_users_or_default(&self) -> usize {
        self.top_users.unwrap_or(10)
    }

    pub fn cache_capacity_or_default(&self) -> usize {
        self.cache_capacity.unwrap_or(DEFAULT_CACHE_CAPACITY)
    }

    pub fn cache_expire_secs_or_default(&self) -> u64 {
        self.cache_expire_secs.unwrap_or(3600)
    }

    pub fn sweep_interval_secs_or_default(&self) -> u64 {
        self.sweep_interval_secs.unwrap_or(600)
    }

    pub fn min_messages_or_default(&self) -> usize {
        self.min_messages.unwrap_or(10)
    }
}
