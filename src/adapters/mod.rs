//! Infrastructure adapters. Implement outbound ports.
//!
//! LLM transport and message persistence. Map errors to DomainError.

pub mod ai;
pub mod persistence;
