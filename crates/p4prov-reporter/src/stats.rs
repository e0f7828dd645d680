use crate::error::MessageError;
use serde::Serialize;
use std::collections::BTreeMap;

/// Running counters for one dispatcher session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    /// Messages handed to the dispatcher, including dropped ones.
    pub messages: u64,
    pub vertices: BTreeMap<String, u64>,
    pub edges: BTreeMap<String, u64>,
    /// Dropped messages by error kind.
    pub dropped: BTreeMap<String, u64>,
    pub missing_correlations: u64,
}

impl DispatchStats {
    pub(crate) fn record_message(&mut self) {
        self.messages += 1;
    }

    pub(crate) fn record_vertex(&mut self, kind: &str) {
        *self.vertices.entry(kind.to_string()).or_default() += 1;
    }

    pub(crate) fn record_edge(&mut self, kind: &str) {
        *self.edges.entry(kind.to_string()).or_default() += 1;
    }

    pub(crate) fn record_drop(&mut self, error: &MessageError) {
        *self.dropped.entry(error.kind().to_string()).or_default() += 1;
    }

    pub(crate) fn record_missing_correlation(&mut self) {
        self.missing_correlations += 1;
    }

    pub fn vertex_total(&self) -> u64 {
        self.vertices.values().sum()
    }

    pub fn edge_total(&self) -> u64 {
        self.edges.values().sum()
    }

    pub fn dropped_total(&self) -> u64 {
        self.dropped.values().sum()
    }

    pub fn edges_of(&self, kind: &str) -> u64 {
        self.edges.get(kind).copied().unwrap_or(0)
    }

    pub fn vertices_of(&self, kind: &str) -> u64 {
        self.vertices.get(kind).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_are_grouped_by_error_kind() {
        let mut stats = DispatchStats::default();
        stats.record_drop(&MessageError::UnknownEventType("FOO".to_string()));
        stats.record_drop(&MessageError::UnknownEventType("BAR".to_string()));
        stats.record_drop(&MessageError::UnrecognizedOperation("DELETE".to_string()));
        assert_eq!(stats.dropped["unknown_event_type"], 2);
        assert_eq!(stats.dropped_total(), 3);
    }

    #[test]
    fn totals_sum_per_kind_counters() {
        let mut stats = DispatchStats::default();
        stats.record_vertex("Entity");
        stats.record_vertex("Agent");
        stats.record_edge("Used");
        assert_eq!(stats.vertex_total(), 2);
        assert_eq!(stats.edges_of("Used"), 1);
        assert_eq!(stats.edges_of("WasDerivedFrom"), 0);
    }
}
