use crate::types::{
    Activity, Agent, Edge, EdgeId, Entity, ProvActivityId, ProvAgentId, ProvEntityId, Used,
    Vertex, WasAssociatedWith, WasDerivedFrom, WasGeneratedBy,
};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ProvDocument {
    entity: HashMap<ProvEntityId, Entity>,
    activity: HashMap<ProvActivityId, Activity>,
    agent: HashMap<ProvAgentId, Agent>,
    used: HashMap<EdgeId, Used>,
    was_generated_by: HashMap<EdgeId, WasGeneratedBy>,
    was_associated_with: HashMap<EdgeId, WasAssociatedWith>,
    was_derived_from: HashMap<EdgeId, WasDerivedFrom>,
}

impl ProvDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a vertex; returns `false` if a vertex with the same id was replaced.
    pub fn insert_vertex(&mut self, vertex: Vertex) -> bool {
        match vertex {
            Vertex::Entity(entity) => self.entity.insert(entity.id.clone(), entity).is_none(),
            Vertex::Activity(activity) => {
                self.activity.insert(activity.id.clone(), activity).is_none()
            }
            Vertex::Agent(agent) => self.agent.insert(agent.id.clone(), agent).is_none(),
        }
    }

    /// Insert an edge; returns `false` if an edge with the same id was replaced.
    pub fn insert_edge(&mut self, edge: Edge) -> bool {
        match edge {
            Edge::Used(rel) => self.used.insert(rel.id.clone(), rel).is_none(),
            Edge::WasGeneratedBy(rel) => self.was_generated_by.insert(rel.id.clone(), rel).is_none(),
            Edge::WasAssociatedWith(rel) => {
                self.was_associated_with.insert(rel.id.clone(), rel).is_none()
            }
            Edge::WasDerivedFrom(rel) => self.was_derived_from.insert(rel.id.clone(), rel).is_none(),
        }
    }

    pub fn contains_vertex(&self, id: &str) -> bool {
        self.entity.contains_key(&ProvEntityId::new(id))
            || self.activity.contains_key(&ProvActivityId::new(id))
            || self.agent.contains_key(&ProvAgentId::new(id))
    }

    pub fn contains_edge(&self, id: &EdgeId) -> bool {
        self.used.contains_key(id)
            || self.was_generated_by.contains_key(id)
            || self.was_associated_with.contains_key(id)
            || self.was_derived_from.contains_key(id)
    }

    pub fn entities(&self) -> impl Iterator<Item = (&ProvEntityId, &Entity)> {
        self.entity.iter()
    }

    pub fn activities(&self) -> impl Iterator<Item = (&ProvActivityId, &Activity)> {
        self.activity.iter()
    }

    pub fn agents(&self) -> impl Iterator<Item = (&ProvAgentId, &Agent)> {
        self.agent.iter()
    }

    pub fn used(&self) -> impl Iterator<Item = (&EdgeId, &Used)> {
        self.used.iter()
    }

    pub fn was_generated_by(&self) -> impl Iterator<Item = (&EdgeId, &WasGeneratedBy)> {
        self.was_generated_by.iter()
    }

    pub fn was_associated_with(&self) -> impl Iterator<Item = (&EdgeId, &WasAssociatedWith)> {
        self.was_associated_with.iter()
    }

    pub fn was_derived_from(&self) -> impl Iterator<Item = (&EdgeId, &WasDerivedFrom)> {
        self.was_derived_from.iter()
    }

    pub fn entity(&self, id: &ProvEntityId) -> Option<&Entity> {
        self.entity.get(id)
    }

    pub fn activity(&self, id: &ProvActivityId) -> Option<&Activity> {
        self.activity.get(id)
    }

    pub fn agent(&self, id: &ProvAgentId) -> Option<&Agent> {
        self.agent.get(id)
    }

    pub fn vertex_count(&self) -> usize {
        self.entity.len() + self.activity.len() + self.agent.len()
    }

    pub fn edge_count(&self) -> usize {
        self.used.len()
            + self.was_generated_by.len()
            + self.was_associated_with.len()
            + self.was_derived_from.len()
    }
}
