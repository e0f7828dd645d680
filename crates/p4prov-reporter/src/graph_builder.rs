//! Vertex and edge construction.
//!
//! Vertex ids embed a per-session sequence number so that repeated messages
//! about the same device object still produce distinct vertices. Edge ids
//! share one counter across all edge kinds.

use crate::message::{ActivityMessage, AgentMessage, EntityMessage, MessageHeader, Operation};
use crate::rules::{CausalRelation, causal_relation};
use crate::state_table::StateTransition;
use p4prov_provenance::builders::{
    ActivityBuilder, AgentBuilder, EntityBuilder, UsedBuilder, WasAssociatedWithBuilder,
    WasDerivedFromBuilder, WasGeneratedByBuilder,
};
use p4prov_provenance::vocabulary::{p4, prov, prov_roles};
use p4prov_provenance::{Activity, Agent, Edge, EdgeId, Entity};

const USED_PREFIX: &str = "u";
const GENERATED_PREFIX: &str = "g";
const ASSOCIATION_PREFIX: &str = "assoc";
const DERIVATION_PREFIX: &str = "d";

#[derive(Debug, Default)]
pub struct GraphBuilder {
    next_vertex: u64,
    next_edge: u64,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices_built(&self) -> u64 {
        self.next_vertex
    }

    pub fn edges_built(&self) -> u64 {
        self.next_edge
    }

    fn next_sequence(&mut self) -> u64 {
        let seq = self.next_vertex;
        self.next_vertex += 1;
        seq
    }

    fn next_edge_id(&mut self, prefix: &str) -> EdgeId {
        self.next_edge += 1;
        EdgeId::new(format!("{}{}", prefix, self.next_edge))
    }

    fn header_attrs(header: &MessageHeader) -> [(&'static str, &str); 3] {
        [
            (p4::NAME, header.name.as_str()),
            (p4::AGENT_ID, header.agent_id.as_str()),
            (p4::TIMESTAMP, header.timestamp.as_str()),
        ]
    }

    pub fn agent(&mut self, message: &AgentMessage) -> Agent {
        let id = format!("agent:{}:{}", message.header.agent_id, self.next_sequence());
        AgentBuilder::new(id)
            .attrs(Self::header_attrs(&message.header))
            .attr(p4::AGENT_TYPE, message.agent_type.as_str())
            .build()
    }

    pub fn activity(&mut self, message: &ActivityMessage) -> Activity {
        let id = format!("activity:{}:{}", message.header.agent_id, self.next_sequence());
        ActivityBuilder::new(id)
            .attrs(Self::header_attrs(&message.header))
            .attr(p4::ACTIVITY_TYPE, message.activity_type.as_str())
            .build()
    }

    pub fn entity(&mut self, message: &EntityMessage) -> Entity {
        let id = format!(
            "entity:{}:{}:{}",
            message.header.name,
            message.header.agent_id,
            self.next_sequence()
        );
        EntityBuilder::new(id)
            .attrs(Self::header_attrs(&message.header))
            .attr(p4::ENTITY_TYPE, message.entity_type.as_str())
            .attr(p4::OPERATION, message.operation.as_str())
            .attrs(message.payload.attributes())
            .build()
    }

    pub fn association(&mut self, activity: &Activity, agent: &Agent) -> Edge {
        WasAssociatedWithBuilder::new(self.next_edge_id(ASSOCIATION_PREFIX), activity, agent)
            .attr(prov::ROLE, prov_roles::EXECUTING_AGENT)
            .build()
    }

    /// Used or WasGeneratedBy depending on the operation.
    pub fn causal(&mut self, operation: Operation, entity: &Entity, activity: &Activity) -> Edge {
        let time = entity.annotation(p4::TIMESTAMP).unwrap_or_default();
        match causal_relation(operation) {
            CausalRelation::Used => UsedBuilder::new(self.next_edge_id(USED_PREFIX), activity, entity)
                .attr(p4::OPERATION, operation.as_str())
                .attr(prov::TIME, time)
                .build(),
            CausalRelation::WasGeneratedBy => {
                WasGeneratedByBuilder::new(self.next_edge_id(GENERATED_PREFIX), entity, activity)
                    .attr(p4::OPERATION, operation.as_str())
                    .attr(prov::TIME, time)
                    .build()
            }
        }
    }

    /// WasDerivedFrom from the new value to the one it replaced.
    pub fn derivation(&mut self, operation: Operation, transition: &StateTransition) -> Edge {
        WasDerivedFromBuilder::new(
            self.next_edge_id(DERIVATION_PREFIX),
            &transition.current,
            &transition.previous,
        )
        .attr(p4::OPERATION, operation.as_str())
        .attr(p4::PREVIOUS_VALUE, transition.previous_value())
        .attr(p4::VALUE, transition.current_value())
        .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{TelemetryMessage, decode_message};

    fn agent_message(raw: &str) -> AgentMessage {
        match decode_message(raw).unwrap() {
            TelemetryMessage::Agent(message) => message,
            other => panic!("unexpected message: {other:?}"),
        }
    }

    fn entity_message(raw: &str) -> EntityMessage {
        match decode_message(raw).unwrap() {
            TelemetryMessage::Entity(message) => message,
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn vertex_ids_follow_session_sequence() {
        let mut builder = GraphBuilder::new();
        let agent = builder.agent(&agent_message("AGENT|S1|1|t0|Switch"));
        let entity =
            builder.entity(&entity_message(r#"ENTITY|R1|1|t2|register|WRITE|{"index": 0, "value": 5}"#));
        assert_eq!(agent.id.as_str(), "agent:1:0");
        assert_eq!(entity.id.as_str(), "entity:R1:1:1");
        assert_eq!(builder.vertices_built(), 2);
    }

    #[test]
    fn entity_carries_header_and_payload_annotations() {
        let mut builder = GraphBuilder::new();
        let entity = builder.entity(&entity_message(
            r#"ENTITY|R1|1|t2|register|WRITE|{"index": "0", "value": "5"}"#,
        ));
        assert_eq!(entity.annotation(p4::ENTITY_TYPE), Some("register"));
        assert_eq!(entity.annotation(p4::OPERATION), Some("WRITE"));
        assert_eq!(entity.annotation(p4::TIMESTAMP), Some("t2"));
        assert_eq!(entity.annotation(p4::INDEX), Some("0"));
        assert_eq!(entity.annotation(p4::VALUE), Some("5"));
    }

    #[test]
    fn causal_edge_direction_follows_operation() {
        let mut builder = GraphBuilder::new();
        let activity = ActivityBuilder::new("activity:1:0").build();
        let entity = EntityBuilder::new("entity:R1:1:1").attr(p4::TIMESTAMP, "t5").build();

        let read = builder.causal(Operation::Read, &entity, &activity);
        assert_eq!(read.kind(), "Used");
        assert_eq!(read.id().as_str(), "u1");
        assert_eq!(read.source().id(), "activity:1:0");
        assert_eq!(read.annotations().get(prov::TIME).map(String::as_str), Some("t5"));

        let write = builder.causal(Operation::Write, &entity, &activity);
        assert_eq!(write.kind(), "WasGeneratedBy");
        assert_eq!(write.id().as_str(), "g2");
        assert_eq!(write.source().id(), "entity:R1:1:1");
        assert_eq!(write.destination().id(), "activity:1:0");
    }

    #[test]
    fn derivation_points_from_new_to_previous() {
        let mut builder = GraphBuilder::new();
        let transition = StateTransition {
            previous: EntityBuilder::new("entity:R1:1:2").attr(p4::VALUE, "5").build(),
            current: EntityBuilder::new("entity:R1:1:4").attr(p4::VALUE, "7").build(),
        };
        let edge = builder.derivation(Operation::Write, &transition);
        assert_eq!(edge.id().as_str(), "d1");
        assert_eq!(edge.source().id(), "entity:R1:1:4");
        assert_eq!(edge.destination().id(), "entity:R1:1:2");
        assert_eq!(edge.annotations().get(p4::PREVIOUS_VALUE).map(String::as_str), Some("5"));
        assert_eq!(edge.annotations().get(p4::VALUE).map(String::as_str), Some("7"));
    }
}
