//! Sink interface and in-memory implementation.
//!
//! Sinks are the owner of record for vertices and edges. Submission is
//! fire-and-forget from the reporter's point of view: callers use the
//! `*_with_logging` variants and never see a sink failure.

use crate::document::ProvDocument;
use crate::error::{ProvenanceError, Result};
use crate::types::{Edge, Vertex};
use async_trait::async_trait;
use tokio::sync::RwLock;

#[async_trait]
pub trait ProvenanceSink: Send + Sync {
    async fn submit_vertex(&self, vertex: Vertex) -> Result<()>;

    async fn submit_edge(&self, edge: Edge) -> Result<()>;

    /// Push buffered records to durable storage.
    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    async fn submit_vertex_with_logging(&self, vertex: Vertex) {
        let kind = vertex.kind();
        let vertex_id = vertex.id().to_string();
        if let Err(err) = self.submit_vertex(vertex).await {
            tracing::error!(error = %err, kind, vertex_id = %vertex_id, "Failed to submit provenance vertex");
        }
    }

    async fn submit_edge_with_logging(&self, edge: Edge) {
        let kind = edge.kind();
        let edge_id = edge.id().to_string();
        if let Err(err) = self.submit_edge(edge).await {
            tracing::error!(error = %err, kind, edge_id = %edge_id, "Failed to submit provenance edge");
        }
    }
}

/// Keeps the whole graph in a `ProvDocument`.
#[derive(Debug, Default)]
pub struct InMemoryProvenanceStore {
    document: RwLock<ProvDocument>,
}

impl InMemoryProvenanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything submitted so far.
    pub async fn document(&self) -> ProvDocument {
        self.document.read().await.clone()
    }

    pub async fn vertex_count(&self) -> usize {
        self.document.read().await.vertex_count()
    }

    pub async fn edge_count(&self) -> usize {
        self.document.read().await.edge_count()
    }
}

#[async_trait]
impl ProvenanceSink for InMemoryProvenanceStore {
    async fn submit_vertex(&self, vertex: Vertex) -> Result<()> {
        let kind = vertex.kind();
        let id = vertex.id().to_string();
        let mut document = self.document.write().await;
        if document.contains_vertex(&id) {
            return Err(ProvenanceError::DuplicateId { kind: kind.to_string(), id });
        }
        document.insert_vertex(vertex);
        Ok(())
    }

    async fn submit_edge(&self, edge: Edge) -> Result<()> {
        let mut document = self.document.write().await;
        if document.contains_edge(edge.id()) {
            return Err(ProvenanceError::DuplicateId {
                kind: edge.kind().to_string(),
                id: edge.id().to_string(),
            });
        }
        document.insert_edge(edge);
        Ok(())
    }
}
