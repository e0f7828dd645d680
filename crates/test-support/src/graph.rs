//! Graph inspection helpers over a `ProvDocument`.

use p4prov_provenance::{Edge, ProvDocument, Vertex};
use p4prov_provenance::jsonl_store::StorageRecord;
use serde::Serialize;

/// Element counts per vertex and edge kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphTally {
    pub agents: usize,
    pub activities: usize,
    pub entities: usize,
    pub used: usize,
    pub was_generated_by: usize,
    pub was_associated_with: usize,
    pub was_derived_from: usize,
}

impl GraphTally {
    pub fn of(document: &ProvDocument) -> Self {
        Self {
            agents: document.agents().count(),
            activities: document.activities().count(),
            entities: document.entities().count(),
            used: document.used().count(),
            was_generated_by: document.was_generated_by().count(),
            was_associated_with: document.was_associated_with().count(),
            was_derived_from: document.was_derived_from().count(),
        }
    }
}

/// Every vertex and edge as a storage record, vertices first, each group
/// sorted by hash so snapshots are stable.
pub fn graph_records(document: &ProvDocument) -> Vec<StorageRecord> {
    let vertex = |vertex: Vertex| StorageRecord::from(&vertex);
    let edge = |edge: Edge| StorageRecord::from(&edge);

    let mut vertices: Vec<StorageRecord> = document
        .agents()
        .map(|(_, agent)| vertex(agent.clone().into()))
        .chain(document.activities().map(|(_, activity)| vertex(activity.clone().into())))
        .chain(document.entities().map(|(_, entity)| vertex(entity.clone().into())))
        .collect();
    let mut edges: Vec<StorageRecord> = document
        .used()
        .map(|(_, rel)| edge(rel.clone().into()))
        .chain(document.was_generated_by().map(|(_, rel)| edge(rel.clone().into())))
        .chain(document.was_associated_with().map(|(_, rel)| edge(rel.clone().into())))
        .chain(document.was_derived_from().map(|(_, rel)| edge(rel.clone().into())))
        .collect();
    vertices.sort_by(|a, b| a.hash.cmp(&b.hash));
    edges.sort_by(|a, b| a.hash.cmp(&b.hash));
    vertices.extend(edges);
    vertices
}
