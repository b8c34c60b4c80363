//! Shared application concerns. Configuration.

pub mod config;

pub use config::AppConfig;
