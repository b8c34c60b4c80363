//! Model resolution: explicitly configured identifier, or endpoint discovery
//! with a marker-preference scan. Memoized after the first success so the
//! three extraction tasks of one run share a single discovery call.

use crate::domain::DomainError;
use crate::ports::LlmPort;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Known model families, scanned in priority order against the advertised
/// identifiers (case-insensitive substring match).
const PREFERRED_MODEL_MARKERS: &[&str] = &["qwen", "deepseek", "glm", "llama", "mistral", "gpt"];

pub struct ModelResolver {
    llm: Arc<dyn LlmPort>,
    configured: Option<String>,
    resolved: OnceCell<String>,
}

impl ModelResolver {
    pub fn new(llm: Arc<dyn LlmPort>, configured: Option<String>) -> Self {
        Self {
            llm,
            configured,
            resolved: OnceCell::new(),
        }
    }

    /// Resolve a usable model identifier.
    ///
    /// A configured model wins outright, with no discovery call. Otherwise
    /// the advertised list is fetched once and scanned against
    /// `PREFERRED_MODEL_MARKERS`; if no marker matches, the first advertised
    /// identifier is the last resort.
    pub async fn resolve(&self) -> Result<String, DomainError> {
        if let Some(model) = &self.configured {
            return Ok(model.clone());
        }

        let model = self
            .resolved
            .get_or_try_init(|| async {
                let advertised = self.llm.list_models().await.map_err(|e| {
                    warn!(error = %e, "model discovery failed");
                    DomainError::NoUsableModel
                })?;
                if advertised.is_empty() {
                    return Err(DomainError::NoUsableModel);
                }
                let picked = pick_preferred(&advertised);
                info!(model = %picked, advertised = advertised.len(), "model resolved");
                Ok(picked)
            })
            .await?;

        Ok(model.clone())
    }
}

fn pick_preferred(advertised: &[String]) -> String {
    for marker in PREFERRED_MODEL_MARKERS {
        if let Some(hit) = advertised
            .iter()
            .find(|id| id.to_lowercase().contains(marker))
        {
            return hit.clone();
        }
    }
    advertised[0].clone()
}
