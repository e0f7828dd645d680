use p4prov_core::AgentId;
use thiserror::Error;

/// Per-message failure taxonomy. None of these are fatal to the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    #[error("malformed message: {reason}")]
    MalformedMessage { reason: String },
    #[error("invalid {entity_type} payload: {reason}")]
    InvalidPayload { entity_type: String, reason: String },
    #[error("unknown event type '{0}'")]
    UnknownEventType(String),
    #[error("unrecognized operation '{0}'")]
    UnrecognizedOperation(String),
    #[error("no activity registered for agent {agent_id}")]
    MissingCorrelation { agent_id: AgentId },
}

impl MessageError {
    /// Stable label used for statistics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            MessageError::MalformedMessage { .. } => "malformed_message",
            MessageError::InvalidPayload { .. } => "invalid_payload",
            MessageError::UnknownEventType(_) => "unknown_event_type",
            MessageError::UnrecognizedOperation(_) => "unrecognized_operation",
            MessageError::MissingCorrelation { .. } => "missing_correlation",
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        MessageError::MalformedMessage { reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, MessageError>;
