//! Application use cases. Orchestrate domain logic via ports.

pub mod aggregator;
pub mod analysis_service;
pub mod extraction_service;
pub mod model_resolver;
pub mod recency_cache;

pub use aggregator::aggregate;
pub use analysis_service::AnalysisService;
pub use extraction_service::{ExtractionConfig, ExtractionService};
pub use model_resolver::ModelResolver;
pub use recency_cache::{CacheKey, RecencyCache};
