//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;

pub use entities::{
    AggregateResult, AnalysisReport, GoldenQuote, Message, Segment, Topic, UserStats, UserTitle,
};
pub use errors::DomainError;
