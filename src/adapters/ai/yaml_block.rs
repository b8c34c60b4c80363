//! Structured-block utilities for LLM responses.
//!
//! Completions are expected to embed exactly one fenced ```yaml block with a
//! list of records. Model output is not guaranteed well-formed, so decoding
//! is a two-stage pipeline: a permissive regex repair pass first, then a
//! strict serde decode that fails loudly. The two stages are never merged so
//! the repair rules stay independently testable.

use crate::domain::DomainError;
use regex::Regex;
use serde::de::DeserializeOwned;

/// Locate the single fenced yaml block in a completion body.
pub fn extract_block(response: &str) -> Result<String, DomainError> {
    let fence = Regex::new(r"(?s)```ya?ml\s*\n(.*?)```").expect("valid regex");
    fence
        .captures(response)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or(DomainError::MissingStructuredBlock)
}

/// Collapse spurious blank lines the model sometimes inserts between an
/// item's continuation lines and the next `- ` marker. Targeted
/// normalization only, not a general yaml fixer.
pub fn repair_list_breaks(block: &str) -> String {
    let breaks = Regex::new(r"\n(?:[ \t]*\n)+([ \t]*-[ \t])").expect("valid regex");
    breaks.replace_all(block, "\n$1").into_owned()
}

/// Strict decode of a (repaired) block into a list of records.
pub fn decode_records<T: DeserializeOwned>(block: &str) -> Result<Vec<T>, DomainError> {
    serde_yaml::from_str(block).map_err(|e| DomainError::Decode(e.to_string()))
}

/// Full pipeline: locate, repair, decode.
pub fn parse_records<T: DeserializeOwned>(response: &str) -> Result<Vec<T>, DomainError> {
    let block = extract_block(response)?;
    decode_records(&repair_list_breaks(&block))
}
