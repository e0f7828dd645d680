//! JSON-lines provenance writer.
//!
//! Each vertex or edge becomes one JSON object per line, shaped like the
//! storage record used by graph export pipelines:
//! `{"kind", "hash", "sourceVertexHash", "destinationVertexHash", "annotations"}`.
//! The vertex/edge id doubles as its hash. Vertex records omit the two
//! endpoint fields.

use crate::error::Result;
use crate::store::ProvenanceSink;
use crate::types::{Annotations, Edge, Vertex};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageRecord {
    pub kind: String,
    pub hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_vertex_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_vertex_hash: Option<String>,
    pub annotations: Annotations,
}

impl From<&Vertex> for StorageRecord {
    fn from(vertex: &Vertex) -> Self {
        Self {
            kind: vertex.kind().to_string(),
            hash: vertex.id().to_string(),
            source_vertex_hash: None,
            destination_vertex_hash: None,
            annotations: vertex.annotations().clone(),
        }
    }
}

impl From<&Edge> for StorageRecord {
    fn from(edge: &Edge) -> Self {
        Self {
            kind: edge.kind().to_string(),
            hash: edge.id().to_string(),
            source_vertex_hash: Some(edge.source().id().to_string()),
            destination_vertex_hash: Some(edge.destination().id().to_string()),
            annotations: edge.annotations().clone(),
        }
    }
}

pub struct JsonLinesProvenanceWriter {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl JsonLinesProvenanceWriter {
    /// Open `path` for appending, creating it if needed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path).await?;
        tracing::info!(path = %path.display(), "Opened JSON-lines provenance sink");
        Ok(Self { path, writer: Mutex::new(BufWriter::new(file)) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_record(&self, record: &StorageRecord) -> Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        Ok(())
    }
}

#[async_trait]
impl ProvenanceSink for JsonLinesProvenanceWriter {
    async fn submit_vertex(&self, vertex: Vertex) -> Result<()> {
        self.write_record(&StorageRecord::from(&vertex)).await
    }

    async fn submit_edge(&self, edge: Edge) -> Result<()> {
        self.write_record(&StorageRecord::from(&edge)).await
    }

    async fn flush(&self) -> Result<()> {
        self.writer.lock().await.flush().await?;
        Ok(())
    }
}
