//! Error types for the reporter infrastructure
//!
//! Per-message decoding failures live in `p4prov-reporter` and sink failures
//! in `p4prov-provenance`; this type covers configuration and caller input.

use thiserror::Error;

/// Main error type for reporter infrastructure
#[derive(Error, Debug)]
pub enum P4ProvError {
    /// Configuration value could not be interpreted
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid argument provided by a caller
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, P4ProvError>;
