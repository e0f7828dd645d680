//! Shared fixtures for reporter test suites.

pub mod graph;
pub mod messages;

pub use graph::{GraphTally, graph_records};
