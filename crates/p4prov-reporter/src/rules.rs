use crate::message::Operation;
use p4prov_provenance::vocabulary::{activity_types, agent_types};

/// Direction of the causal edge between an entity and the activity that
/// touched it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CausalRelation {
    /// Activity → Entity
    Used,
    /// Entity → Activity
    WasGeneratedBy,
}

pub fn causal_relation(operation: Operation) -> CausalRelation {
    match operation {
        Operation::Read => CausalRelation::Used,
        Operation::Write | Operation::Add => CausalRelation::WasGeneratedBy,
    }
}

/// Activity/agent type combinations that get a WasAssociatedWith edge.
const RECOGNIZED_PAIRINGS: &[(&str, &str)] = &[
    (activity_types::EVENT_PROCESSOR, agent_types::CONTROLLER),
    (activity_types::PACKET_PROCESSOR, agent_types::SWITCH),
];

pub fn is_recognized_pairing(activity_type: &str, agent_type: &str) -> bool {
    RECOGNIZED_PAIRINGS
        .iter()
        .any(|(activity, agent)| *activity == activity_type && *agent == agent_type)
}
