use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvenanceError {
    #[error("provenance storage error: {0}")]
    Storage(#[from] Box<dyn std::error::Error + Send + Sync>),
    #[error("provenance sink I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("provenance serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate provenance {kind} id: {id}")]
    DuplicateId { kind: String, id: String },
}

pub type Result<T> = std::result::Result<T, ProvenanceError>;
