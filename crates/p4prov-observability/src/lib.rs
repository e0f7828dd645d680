//! Observability helpers (tracing setup, spans).

pub mod spans;
pub mod tracing_setup;

pub use spans::*;
pub use tracing_setup::*;
