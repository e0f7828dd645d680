//! Core types shared by the P4 provenance reporter crates.

pub mod config;
pub mod error;
pub mod ids;

pub use config::{HistoryRetention, QueueConfig, ReporterConfig};
pub use error::{P4ProvError, Result};
pub use ids::AgentId;
