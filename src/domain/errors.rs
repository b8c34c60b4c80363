//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Non-success status (or connection failure) from the LLM endpoint.
    #[error("LLM transport error: {status}: {body}")]
    Transport { status: String, body: String },

    /// Model discovery returned nothing usable and none was configured.
    #[error("no usable model advertised by the endpoint")]
    NoUsableModel,

    /// The completion text carried no fenced structured-data block.
    #[error("response contains no structured data block")]
    MissingStructuredBlock,

    /// Block present but did not parse into the expected record shape.
    #[error("structured block decode failed: {0}")]
    Decode(String),

    #[error("repository error: {0}")]
    Repo(String),
}
