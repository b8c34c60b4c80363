//! Persistence adapters. Implement HistoryPort.

pub mod memory_repo;

pub use memory_repo::MemoryHistoryRepo;
