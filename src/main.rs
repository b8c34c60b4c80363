//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run
//! one analysis over a message window and print the report.
//!
//! No business logic here. Rendering below is the stand-in for the external
//! rendering collaborator; the core only hands over the report value.

use chat_insight::adapters::ai::{MockLlmAdapter, OpenAiAdapter};
use chat_insight::adapters::persistence::MemoryHistoryRepo;
use chat_insight::domain::{AnalysisReport, Message};
use chat_insight::ports::{HistoryPort, LlmPort};
use chat_insight::shared::AppConfig;
use chat_insight::usecases::{
    recency_cache, AnalysisService, CacheKey, ExtractionConfig, ExtractionService, RecencyCache,
};
use chrono::{Duration, Utc};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = AppConfig::load().unwrap_or_default();

    let llm: Arc<dyn LlmPort> = if cfg.is_llm_configured() {
        info!(url = %cfg.api_url_or_default(), "using OpenAI-compatible endpoint");
        Arc::new(OpenAiAdapter::new(
            cfg.api_url_or_default(),
            cfg.api_key_or_default(),
        ))
    } else {
        warn!("CHAT_INSIGHT_API_KEY not set; using mock LLM adapter");
        Arc::new(MockLlmAdapter::new())
    };

    let mut extraction_cfg = ExtractionConfig {
        temperature: cfg.temperature_or_default(),
        max_topics: cfg.max_topics_or_default(),
        max_golden_quotes: cfg.max_golden_quotes_or_default(),
        ..ExtractionConfig::default()
    };
    if let Some(t) = cfg.topics_prompt.clone() {
        extraction_cfg.topics_prompt = t;
    }
    if let Some(t) = cfg.titles_prompt.clone() {
        extraction_cfg.titles_prompt = t;
    }
    if let Some(t) = cfg.quotes_prompt.clone() {
        extraction_cfg.quotes_prompt = t;
    }

    let extraction = Arc::new(ExtractionService::new(
        llm,
        cfg.model.clone(),
        extraction_cfg,
    ));
    let analysis = AnalysisService::new(extraction, cfg.top_users_or_default());

    // Ingestion path: history repo is the source of truth, the recency cache
    // keeps a short per-key tail beside it.
    let repo = Arc::new(MemoryHistoryRepo::new());
    let cache = Arc::new(Mutex::new(RecencyCache::new(
        cfg.cache_capacity_or_default(),
        Duration::seconds(cfg.cache_expire_secs_or_default() as i64),
    )));
    tokio::spawn(recency_cache::run_sweeper(
        cache.clone(),
        std::time::Duration::from_secs(cfg.sweep_interval_secs_or_default()),
    ));

    let (platform, group_id) = ("onebot", "demo-group");
    for message in load_messages(platform, group_id)? {
        if let Ok(mut cache) = cache.lock() {
            cache.put(
                CacheKey::new(platform, message.channel_id.clone()),
                message.clone(),
            );
        }
        repo.ingest(message)?;
    }

    let now = Utc::now();
    let window = repo
        .fetch_history(group_id, platform, now - Duration::hours(24), now, 1000)
        .await?;

    // Caller-side precondition: too few messages is a user-visible refusal,
    // not a degraded report.
    if window.len() < cfg.min_messages_or_default() {
        anyhow::bail!(
            "only {} messages in the window; need at least {}",
            window.len(),
            cfg.min_messages_or_default()
        );
    }

    let report = analysis.analyze(group_id, &window).await;
    println!("{}", render_report(&report));
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Demo window: either a JSON file of messages (first CLI argument) or a
/// small built-in sample.
fn load_messages(platform: &str, group_id: &str) -> anyhow::Result<Vec<Message>> {
    if let Some(path) = std::env::args().nth(1) {
        let data = std::fs::read_to_string(&path)?;
        let messages: Vec<Message> = serde_json::from_str(&data)?;
        info!(path, count = messages.len(), "loaded message window");
        return Ok(messages);
    }

    let now = Utc::now();
    let sample = [
        ("alice", "Morning! Anyone up for a hike on Saturday?"),
        ("bob", "Only if the forecast improves."),
        ("carol", "CI has been red all morning, looking into it."),
        ("alice", "Trail near the lake is supposed to be great."),
        ("bob", "It compiles, ship it."),
        ("carol", "Found it: a flaky integration test."),
        ("alice", "So, Saturday 9am?"),
        ("bob", "Fine, 9am. Bring coffee."),
        ("carol", "Green again. I'm in for the hike too."),
        ("alice", "Great, see you all there."),
    ];
    Ok(sample
        .iter()
        .enumerate()
        .map(|(i, (sender, text))| Message {
            id: i.to_string(),
            sender_id: sender.to_string(),
            sender_name: sender.to_string(),
            platform: platform.to_string(),
            channel_id: group_id.to_string(),
            content: text.to_string(),
            segments: vec![],
            timestamp: now - Duration::minutes((sample.len() - i) as i64),
        })
        .collect())
}

/// Plain-text rendering for the terminal. Lives with the binary on purpose:
/// the core imposes no serialization on the report.
fn render_report(report: &AnalysisReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# Group report: {} ({})\n\n",
        report.group_id, report.generated_at
    ));
    out.push_str(&format!(
        "{} messages, {} chars, {} participants, {} emojis, busiest {}\n\n",
        report.total_messages,
        report.total_chars,
        report.participant_count,
        report.total_emojis,
        report.most_active_hour
    ));

    out.push_str("## Top users\n");
    for user in &report.top_users {
        out.push_str(&format!(
            "- {} — {} messages (avg {} chars, night {})\n",
            user.nickname, user.message_count, user.avg_chars, user.night_ratio
        ));
    }

    if !report.topics.is_empty() {
        out.push_str("\n## Topics\n");
        for topic in &report.topics {
            out.push_str(&format!(
                "- {} [{}]: {}\n",
                topic.title,
                topic.contributors.join(", "),
                topic.detail
            ));
        }
    }

    if !report.user_titles.is_empty() {
        out.push_str("\n## Titles\n");
        for title in &report.user_titles {
            out.push_str(&format!(
                "- {}: {} ({}) — {}\n",
                title.user, title.title, title.personality, title.reason
            ));
        }
    }

    if !report.golden_quotes.is_empty() {
        out.push_str("\n## Golden quotes\n");
        for quote in &report.golden_quotes {
            out.push_str(&format!(
                "- \"{}\" — {} ({})\n",
                quote.content, quote.sender, quote.reason
            ));
        }
    }

    out
}
