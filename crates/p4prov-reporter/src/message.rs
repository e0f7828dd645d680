//! Telemetry message grammar.
//!
//! Messages are single lines of `|`-separated fields at fixed positions:
//!
//! ```text
//! ACTIVITY|<name>|<agent_id>|<timestamp>|<activity_type>
//! AGENT|<name>|<agent_id>|<timestamp>|<agent_type>
//! ENTITY|<name>|<agent_id>|<timestamp>|<entity_type>|<operation>|<json_payload>
//! ```
//!
//! Tags are decoded once into closed enums so the dispatcher can match
//! exhaustively.

use crate::error::{MessageError, Result};
use crate::payload::EntityPayload;
use p4prov_core::AgentId;
use p4prov_provenance::vocabulary::{entity_types, event_types, operations};
use std::fmt;

pub const FIELD_SEPARATOR: char = '|';

pub const INDEX_EVENT_TYPE: usize = 0;
pub const INDEX_NAME: usize = 1;
pub const INDEX_AGENT_ID: usize = 2;
pub const INDEX_TIMESTAMP: usize = 3;
pub const INDEX_TYPE: usize = 4;
pub const INDEX_CALL_TYPE: usize = 5;
pub const INDEX_ENTITY_DATA: usize = 6;

const HEADER_FIELD_COUNT: usize = INDEX_TYPE + 1;
const ENTITY_FIELD_COUNT: usize = INDEX_ENTITY_DATA + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Activity,
    Agent,
    Entity,
}

impl EventKind {
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag {
            event_types::ACTIVITY => Ok(EventKind::Activity),
            event_types::AGENT => Ok(EventKind::Agent),
            event_types::ENTITY => Ok(EventKind::Entity),
            other => Err(MessageError::UnknownEventType(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Activity => event_types::ACTIVITY,
            EventKind::Agent => event_types::AGENT,
            EventKind::Entity => event_types::ENTITY,
        }
    }

    /// Minimum number of fields a message of this kind must carry.
    pub fn required_fields(&self) -> usize {
        match self {
            EventKind::Activity | EventKind::Agent => HEADER_FIELD_COUNT,
            EventKind::Entity => ENTITY_FIELD_COUNT,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The call type of an ENTITY message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Read,
    Write,
    Add,
}

impl Operation {
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag {
            operations::READ => Ok(Operation::Read),
            operations::WRITE => Ok(Operation::Write),
            operations::ADD => Ok(Operation::Add),
            other => Err(MessageError::UnrecognizedOperation(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Read => operations::READ,
            Operation::Write => operations::WRITE,
            Operation::Add => operations::ADD,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Register,
    PacketIn,
    PacketOut,
    TableRule,
    MatRule,
}

impl EntityKind {
    /// Unrecognized tags are treated as register cells.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            entity_types::PACKET_IN => EntityKind::PacketIn,
            entity_types::PACKET_OUT => EntityKind::PacketOut,
            entity_types::TABLE_RULE => EntityKind::TableRule,
            entity_types::MAT_RULE => EntityKind::MatRule,
            _ => EntityKind::Register,
        }
    }

    /// Whether writes to this kind go through change detection.
    pub fn is_stateful(&self) -> bool {
        matches!(self, EntityKind::Register)
    }
}

/// Fields shared by every event kind.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageHeader {
    pub name: String,
    pub agent_id: AgentId,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentMessage {
    pub header: MessageHeader,
    pub agent_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityMessage {
    pub header: MessageHeader,
    pub activity_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityMessage {
    pub header: MessageHeader,
    /// Raw wire tag, kept verbatim for annotation.
    pub entity_type: String,
    pub kind: EntityKind,
    pub operation: Operation,
    pub payload: EntityPayload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryMessage {
    Activity(ActivityMessage),
    Agent(AgentMessage),
    Entity(EntityMessage),
}

impl TelemetryMessage {
    pub fn kind(&self) -> EventKind {
        match self {
            TelemetryMessage::Activity(_) => EventKind::Activity,
            TelemetryMessage::Agent(_) => EventKind::Agent,
            TelemetryMessage::Entity(_) => EventKind::Entity,
        }
    }

    pub fn header(&self) -> &MessageHeader {
        match self {
            TelemetryMessage::Activity(message) => &message.header,
            TelemetryMessage::Agent(message) => &message.header,
            TelemetryMessage::Entity(message) => &message.header,
        }
    }
}

/// Decode one raw telemetry line.
pub fn decode_message(raw: &str) -> Result<TelemetryMessage> {
    let line = raw.trim();
    if line.is_empty() {
        return Err(MessageError::malformed("empty message"));
    }

    // The payload is the last field and may itself contain separators.
    let fields: Vec<&str> = line.splitn(ENTITY_FIELD_COUNT, FIELD_SEPARATOR).collect();
    let kind = EventKind::from_tag(fields[INDEX_EVENT_TYPE])?;
    if fields.len() < kind.required_fields() {
        return Err(MessageError::malformed(format!(
            "{} message needs {} fields, found {}",
            kind,
            kind.required_fields(),
            fields.len()
        )));
    }

    let header = decode_header(&fields)?;
    let message = match kind {
        EventKind::Agent => TelemetryMessage::Agent(AgentMessage {
            header,
            agent_type: fields[INDEX_TYPE].to_string(),
        }),
        EventKind::Activity => TelemetryMessage::Activity(ActivityMessage {
            header,
            activity_type: fields[INDEX_TYPE].to_string(),
        }),
        EventKind::Entity => {
            let entity_type = fields[INDEX_TYPE];
            let entity_kind = EntityKind::from_tag(entity_type);
            let operation = Operation::from_tag(fields[INDEX_CALL_TYPE])?;
            let payload =
                EntityPayload::decode(entity_kind, entity_type, fields[INDEX_ENTITY_DATA])?;
            TelemetryMessage::Entity(EntityMessage {
                header,
                entity_type: entity_type.to_string(),
                kind: entity_kind,
                operation,
                payload,
            })
        }
    };
    Ok(message)
}

fn decode_header(fields: &[&str]) -> Result<MessageHeader> {
    let name = fields[INDEX_NAME];
    if name.is_empty() {
        return Err(MessageError::malformed("empty name field"));
    }
    let agent_id = fields[INDEX_AGENT_ID];
    if agent_id.is_empty() {
        return Err(MessageError::malformed("empty agent_id field"));
    }
    Ok(MessageHeader {
        name: name.to_string(),
        agent_id: AgentId::new(agent_id),
        timestamp: fields[INDEX_TIMESTAMP].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::RegisterCell;

    #[test]
    fn decodes_agent_message() {
        let message = decode_message("AGENT|S1|1|t0|Switch\r\n").unwrap();
        assert_eq!(
            message,
            TelemetryMessage::Agent(AgentMessage {
                header: MessageHeader {
                    name: "S1".to_string(),
                    agent_id: AgentId::new("1"),
                    timestamp: "t0".to_string(),
                },
                agent_type: "Switch".to_string(),
            })
        );
    }

    #[test]
    fn activity_ignores_trailing_fields() {
        let message = decode_message("ACTIVITY|A1|1|t1|PacketProcessor|extra|more").unwrap();
        match message {
            TelemetryMessage::Activity(activity) => {
                assert_eq!(activity.activity_type, "PacketProcessor");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn entity_payload_keeps_embedded_separators() {
        let message = decode_message(
            r#"ENTITY|T1|1|t2|table_rule|ADD|{"table_name": "acl", "match_key": "a|b"}"#,
        )
        .unwrap();
        let TelemetryMessage::Entity(entity) = message else {
            panic!("expected entity message");
        };
        assert_eq!(entity.kind, EntityKind::TableRule);
        assert_eq!(entity.operation, Operation::Add);
        let attrs: std::collections::BTreeMap<_, _> =
            entity.payload.attributes().into_iter().collect();
        assert_eq!(attrs["match_key"], "a|b");
    }

    #[test]
    fn unknown_entity_tag_decodes_as_register() {
        let message =
            decode_message(r#"ENTITY|R9|2|t3|counter|WRITE|{"index": "0", "value": "1"}"#).unwrap();
        let TelemetryMessage::Entity(entity) = message else {
            panic!("expected entity message");
        };
        assert_eq!(entity.kind, EntityKind::Register);
        assert_eq!(entity.entity_type, "counter");
        assert_eq!(
            entity.payload,
            EntityPayload::Register(RegisterCell { index: "0".to_string(), value: "1".to_string() })
        );
    }

    #[test]
    fn short_messages_are_malformed() {
        let err = decode_message("ENTITY|R1|1|t0|register|WRITE").unwrap_err();
        assert_eq!(
            err,
            MessageError::malformed("ENTITY message needs 7 fields, found 6")
        );
        let err = decode_message("AGENT|S1|1").unwrap_err();
        assert_eq!(err.kind(), "malformed_message");
        assert_eq!(decode_message("  \n").unwrap_err().kind(), "malformed_message");
    }

    #[test]
    fn empty_identity_fields_are_malformed() {
        assert_eq!(
            decode_message("AGENT||1|t0|Switch").unwrap_err(),
            MessageError::malformed("empty name field")
        );
        assert_eq!(
            decode_message("ACTIVITY|A1||t0|EventProcessor").unwrap_err(),
            MessageError::malformed("empty agent_id field")
        );
    }

    #[test]
    fn rejects_unknown_tags() {
        assert_eq!(
            decode_message("FOO|x|1|t0|bar").unwrap_err(),
            MessageError::UnknownEventType("FOO".to_string())
        );
        assert_eq!(
            decode_message(r#"ENTITY|R1|1|t0|register|DELETE|{"index": "0", "value": "1"}"#)
                .unwrap_err(),
            MessageError::UnrecognizedOperation("DELETE".to_string())
        );
    }
}
