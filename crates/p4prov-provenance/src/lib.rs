//! Provenance graph model and storage sinks.
//!
//! This crate provides the vertex/edge types of the P4 provenance graph,
//! the vocabulary used to annotate them, and a pluggable sink interface with
//! an in-memory implementation and a JSON-lines file writer.

pub mod builders;
pub mod document;
pub mod error;
pub mod jsonl_store;
pub mod store;
pub mod types;
pub mod vocabulary;

pub use document::ProvDocument;
pub use error::ProvenanceError;
pub use jsonl_store::JsonLinesProvenanceWriter;
pub use store::{InMemoryProvenanceStore, ProvenanceSink};
pub use types::{
    Activity, Agent, Annotations, Edge, EdgeId, Entity, ProvActivityId, ProvAgentId,
    ProvEntityId, ProvNodeRef, Used, Vertex, WasAssociatedWith, WasDerivedFrom, WasGeneratedBy,
};
