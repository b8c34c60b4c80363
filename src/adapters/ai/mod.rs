//! AI adapter module. Implements LlmPort for LLM integration.
//!
//! Provides an OpenAI-compatible adapter, a mock adapter for development,
//! and the structured-block parsing utilities.

pub mod mock_adapter;
pub mod openai_adapter;
pub mod yaml_block;

pub use mock_adapter::MockLlmAdapter;
pub use openai_adapter::OpenAiAdapter;
