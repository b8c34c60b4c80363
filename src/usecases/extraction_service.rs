//! Extraction orchestrator: renders prompts, resolves a model, and runs the
//! three extraction kinds (topics, user titles, golden quotes) concurrently.
//!
//! Each kind is its own task with its own failure domain: an error aborts
//! only that kind and is downgraded to an empty list at the join point, so
//! the report always degrades to statistics-only content at worst.

use crate::adapters::ai::yaml_block;
use crate::domain::{AggregateResult, DomainError, GoldenQuote, Message, Segment, Topic, UserTitle};
use crate::ports::LlmPort;
use crate::usecases::model_resolver::ModelResolver;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Upper bound on contributors kept per topic. Excess rows are truncated at
/// decode time, not rejected.
const MAX_TOPIC_CONTRIBUTORS: usize = 5;

const DEFAULT_TOPICS_PROMPT: &str = "\
You are summarizing a group chat. From the messages below, identify up to \
{maxTopics} discussion topics. For each topic give a short title, the main \
contributors (names or ids), and one or two sentences of detail.

Messages:
{messages}

Answer with a single fenced yaml block containing a list of records with \
fields `title`, `contributors` (list), `detail`.";

const DEFAULT_TITLES_PROMPT: &str = "\
You are awarding playful titles to group chat members based on their \
activity profile. For each user below, invent one title, guess a \
personality type label, and justify it in one sentence.

Users:
{users}

Answer with a single fenced yaml block containing a list of records with \
fields `user`, `title`, `personality`, `reason`.";

const DEFAULT_QUOTES_PROMPT: &str = "\
You are picking golden quotes from a group chat: memorable, funny or sharp \
one-liners. Pick at most {maxGoldenQuotes} from the messages below and \
justify each pick in one sentence.

Messages:
{messages}

Answer with a single fenced yaml block containing a list of records with \
fields `content`, `sender`, `reason`.";

/// Prompt templates and sampling knobs. Templates carry the named
/// placeholders {messages}, {users}, {maxTopics}, {maxGoldenQuotes}.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub temperature: f32,
    pub max_topics: usize,
    pub max_golden_quotes: usize,
    pub topics_prompt: String,
    pub titles_prompt: String,
    pub quotes_prompt: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_topics: 5,
            max_golden_quotes: 3,
            topics_prompt: DEFAULT_TOPICS_PROMPT.to_string(),
            titles_prompt: DEFAULT_TITLES_PROMPT.to_string(),
            quotes_prompt: DEFAULT_QUOTES_PROMPT.to_string(),
        }
    }
}

/// Orchestrates the three LLM extraction kinds over one message window.
pub struct ExtractionService {
    llm: Arc<dyn LlmPort>,
    resolver: ModelResolver,
    config: ExtractionConfig,
}

// Wire rows. Decoded from the fenced yaml block, then mapped to domain.
#[derive(Debug, Deserialize)]
struct TopicRow {
    title: String,
    #[serde(default)]
    contributors: Vec<String>,
    #[serde(default)]
    detail: String,
}

#[derive(Debug, Deserialize)]
struct TitleRow {
    user: String,
    title: String,
    #[serde(default)]
    personality: String,
    #[serde(default)]
    reason: String,
}

#[derive(Debug, Deserialize)]
struct QuoteRow {
    content: String,
    sender: String,
    #[serde(default)]
    reason: String,
}

impl ExtractionService {
    /// `configured_model`: explicit model identifier; `None` enables
    /// endpoint discovery on first use.
    pub fn new(
        llm: Arc<dyn LlmPort>,
        configured_model: Option<String>,
        config: ExtractionConfig,
    ) -> Self {
        let resolver = ModelResolver::new(llm.clone(), configured_model);
        Self {
            llm,
            resolver,
            config,
        }
    }

    /// Run all three extraction kinds concurrently. Failures are isolated:
    /// each kind degrades to an empty list on its own error.
    pub async fn extract_all(
        &self,
        messages: &[Message],
        aggregate: &AggregateResult,
    ) -> (Vec<Topic>, Vec<UserTitle>, Vec<GoldenQuote>) {
        let (topics, titles, quotes) = tokio::join!(
            self.extract_topics(messages),
            self.extract_user_titles(aggregate),
            self.extract_golden_quotes(messages),
        );

        (
            topics.unwrap_or_else(|e| degraded("topics", e)),
            titles.unwrap_or_else(|e| degraded("user_titles", e)),
            quotes.unwrap_or_else(|e| degraded("golden_quotes", e)),
        )
    }

    pub async fn extract_topics(&self, messages: &[Message]) -> Result<Vec<Topic>, DomainError> {
        let prompt = self
            .config
            .topics_prompt
            .replace("{messages}", &render_corpus(messages))
            .replace("{maxTopics}", &self.config.max_topics.to_string());
        let raw = self.request(&prompt).await?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<TopicRow> = yaml_block::parse_records(&raw)?;
        info!(topics = rows.len(), "topic extraction complete");
        Ok(rows
            .into_iter()
            .map(|r| Topic {
                title: r.title,
                contributors: r
                    .contributors
                    .into_iter()
                    .take(MAX_TOPIC_CONTRIBUTORS)
                    .collect(),
                detail: r.detail,
            })
            .collect())
    }

    pub async fn extract_user_titles(
        &self,
        aggregate: &AggregateResult,
    ) -> Result<Vec<UserTitle>, DomainError> {
        let prompt = self
            .config
            .titles_prompt
            .replace("{users}", &render_user_lines(aggregate));
        let raw = self.request(&prompt).await?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<TitleRow> = yaml_block::parse_records(&raw)?;
        info!(titles = rows.len(), "user title extraction complete");
        Ok(rows
            .into_iter()
            .map(|r| UserTitle {
                user: r.user,
                title: r.title,
                personality: r.personality,
                reason: r.reason,
            })
            .collect())
    }

    pub async fn extract_golden_quotes(
        &self,
        messages: &[Message],
    ) -> Result<Vec<GoldenQuote>, DomainError> {
        let prompt = self
            .config
            .quotes_prompt
            .replace("{messages}", &render_corpus(messages))
            .replace(
                "{maxGoldenQuotes}",
                &self.config.max_golden_quotes.to_string(),
            );
        let raw = self.request(&prompt).await?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<QuoteRow> = yaml_block::parse_records(&raw)?;
        info!(quotes = rows.len(), "golden quote extraction complete");
        Ok(rows
            .into_iter()
            .map(|r| GoldenQuote {
                content: r.content,
                sender: r.sender,
                reason: r.reason,
            })
            .collect())
    }

    async fn request(&self, prompt: &str) -> Result<String, DomainError> {
        let model = self.resolver.resolve().await?;
        let raw = self
            .llm
            .complete(&model, prompt, self.config.temperature)
            .await?;
        debug!(model = %model, raw_len = raw.len(), "completion received");
        Ok(raw)
    }
}

fn degraded<T>(kind: &str, error: DomainError) -> Vec<T> {
    warn!(kind, error = %error, "extraction failed; degrading to empty list");
    Vec::new()
}

/// Newline-joined "`sender(id): text`" lines for the {messages} placeholder.
fn render_corpus(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}({}): {}", m.sender_name, m.sender_id, message_text(m)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn message_text(message: &Message) -> String {
    if message.segments.is_empty() {
        return message.content.replace('\n', " ");
    }
    let mut text = String::new();
    for segment in &message.segments {
        match segment {
            Segment::Text { text: t } => text.push_str(t),
            Segment::Mention => text.push_str("@…"),
            Segment::Reply | Segment::Emoji { .. } => {}
        }
    }
    text.replace('\n', " ")
}

/// Per-user summary lines for the {users} placeholder.
fn render_user_lines(aggregate: &AggregateResult) -> String {
    aggregate
        .ranked_users
        .iter()
        .map(|u| {
            format!(
                "{}({}): {} messages, avg {} chars, emoji ratio {}, night ratio {}, reply ratio {}",
                u.nickname,
                u.user_id,
                u.message_count,
                u.avg_chars,
                u.emoji_ratio,
                u.night_ratio,
                u.reply_ratio
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::aggregator::aggregate;
    use chrono::{TimeZone, Utc};

    fn msg(id: u32, sender: &str, text: &str) -> Message {
        Message {
            id: id.to_string(),
            sender_id: sender.to_string(),
            sender_name: format!("{}-name", sender),
            platform: "onebot".to_string(),
            channel_id: "g1".to_string(),
            content: text.to_string(),
            segments: vec![],
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    /// Scripts one canned completion for every request.
    struct ScriptedLlm {
        completion: Result<String, ()>,
    }

    impl ScriptedLlm {
        fn replying(body: &str) -> Arc<Self> {
            Arc::new(Self {
                completion: Ok(body.to_string()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                completion: Err(()),
            })
        }
    }

    #[async_trait::async_trait]
    impl LlmPort for ScriptedLlm {
        async fn list_models(&self) -> Result<Vec<String>, DomainError> {
            Ok(vec!["qwen-14b".to_string()])
        }

        async fn complete(
            &self,
            _model: &str,
            _prompt: &str,
            _temperature: f32,
        ) -> Result<String, DomainError> {
            self.completion.clone().map_err(|_| DomainError::Transport {
                status: "500".to_string(),
                body: "boom".to_string(),
            })
        }
    }

    fn service(llm: Arc<ScriptedLlm>) -> ExtractionService {
        ExtractionService::new(llm, None, ExtractionConfig::default())
    }

    #[tokio::test]
    async fn empty_completion_short_circuits_to_empty_list() {
        let svc = service(ScriptedLlm::replying("   \n"));
        let topics = svc.extract_topics(&[msg(1, "a", "hi")]).await.unwrap();
        assert!(topics.is_empty());
    }

    #[tokio::test]
    async fn topics_decode_and_contributors_are_capped() {
        let body = "```yaml\n\
- title: Release planning\n  \
contributors: [a, b, c, d, e, f, g]\n  \
detail: Who ships what and when.\n\
```";
        let svc = service(ScriptedLlm::replying(body));
        let topics = svc.extract_topics(&[msg(1, "a", "hi")]).await.unwrap();
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].title, "Release planning");
        assert_eq!(topics[0].contributors.len(), 5);
    }

    #[tokio::test]
    async fn missing_block_aborts_the_task() {
        let svc = service(ScriptedLlm::replying("no fence in sight"));
        let err = svc
            .extract_golden_quotes(&[msg(1, "a", "hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::MissingStructuredBlock));
    }

    #[tokio::test]
    async fn user_titles_decode_from_block() {
        let body = "```yaml\n\
- user: a-name\n  \
title: Night Owl\n  \
personality: INTP\n  \
reason: Posts almost exclusively after midnight.\n\
```";
        let svc = service(ScriptedLlm::replying(body));
        let agg = aggregate(&[msg(1, "a", "hi")]);
        let titles = svc.extract_user_titles(&agg).await.unwrap();
        assert_eq!(titles.len(), 1);
        assert_eq!(titles[0].title, "Night Owl");
        assert_eq!(titles[0].personality, "INTP");
    }

    #[tokio::test]
    async fn failures_are_isolated_at_the_join() {
        let svc = service(ScriptedLlm::failing());
        let messages = vec![msg(1, "a", "hi"), msg(2, "b", "yo")];
        let agg = aggregate(&messages);
        let (topics, titles, quotes) = svc.extract_all(&messages, &agg).await;
        assert!(topics.is_empty());
        assert!(titles.is_empty());
        assert!(quotes.is_empty());
    }

    #[test]
    fn corpus_lines_carry_sender_and_id() {
        let corpus = render_corpus(&[msg(1, "a", "hello there")]);
        assert_eq!(corpus, "a-name(a): hello there");
    }

    #[test]
    fn user_lines_carry_the_summary_fields() {
        let agg = aggregate(&[msg(1, "a", "hello")]);
        let lines = render_user_lines(&agg);
        assert!(lines.starts_with("a-name(a): 1 messages"));
        assert!(lines.contains("avg 5 chars"));
        assert!(lines.contains("night ratio 0"));
    }
}
