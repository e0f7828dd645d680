//! Change detection for mutable device state.
//!
//! Each register cell is keyed by `(name, agent_id, index)`. The first
//! observation of a key seeds its history. A later WRITE whose value differs
//! from the last stored value is appended and reported as a transition; any
//! other observation leaves the history untouched.

use crate::message::Operation;
use p4prov_core::HistoryRetention;
use p4prov_provenance::Entity;
use p4prov_provenance::vocabulary::p4;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey {
    pub name: String,
    pub agent_id: String,
    pub index: String,
}

impl StateKey {
    pub fn new(name: impl Into<String>, agent_id: impl Into<String>, index: impl Into<String>) -> Self {
        Self { name: name.into(), agent_id: agent_id.into(), index: index.into() }
    }

    /// `None` when the entity lacks one of the key annotations.
    pub fn for_entity(entity: &Entity) -> Option<Self> {
        Some(Self::new(
            entity.annotation(p4::NAME)?,
            entity.annotation(p4::AGENT_ID)?,
            entity.annotation(p4::INDEX)?,
        ))
    }
}

/// A detected value change: `current` replaces `previous` as the latest value.
#[derive(Debug, Clone, PartialEq)]
pub struct StateTransition {
    pub previous: Entity,
    pub current: Entity,
}

impl StateTransition {
    pub fn previous_value(&self) -> &str {
        self.previous.annotation(p4::VALUE).unwrap_or_default()
    }

    pub fn current_value(&self) -> &str {
        self.current.annotation(p4::VALUE).unwrap_or_default()
    }
}

#[derive(Debug, Default)]
pub struct StateTable {
    retention: HistoryRetention,
    entries: HashMap<StateKey, Vec<Entity>>,
}

impl StateTable {
    pub fn new(retention: HistoryRetention) -> Self {
        Self { retention, entries: HashMap::new() }
    }

    pub fn perform_state_check(
        &mut self,
        operation: Operation,
        entity: &Entity,
    ) -> Option<StateTransition> {
        let Some(key) = StateKey::for_entity(entity) else {
            tracing::debug!(entity_id = %entity.id, "Entity has no state key, skipping change detection");
            return None;
        };
        let value = entity.annotation(p4::VALUE)?;

        let Some(history) = self.entries.get_mut(&key) else {
            self.entries.insert(key, vec![entity.clone()]);
            return None;
        };
        let previous = history.last()?.clone();
        if operation != Operation::Write || previous.annotation(p4::VALUE) == Some(value) {
            return None;
        }

        match self.retention {
            HistoryRetention::Full => history.push(entity.clone()),
            HistoryRetention::LatestOnly => {
                history.clear();
                history.push(entity.clone());
            }
        }
        tracing::debug!(
            name = %key.name,
            agent_id = %key.agent_id,
            index = %key.index,
            previous = %previous.id,
            current = %entity.id,
            "State transition detected"
        );
        Some(StateTransition { previous, current: entity.clone() })
    }

    pub fn latest(&self, key: &StateKey) -> Option<&Entity> {
        self.entries.get(key).and_then(|history| history.last())
    }

    /// Stored values for `key`, oldest first.
    pub fn history(&self, key: &StateKey) -> &[Entity] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of distinct keys observed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use p4prov_provenance::builders::EntityBuilder;

    fn register(id: &str, index: &str, value: &str) -> Entity {
        EntityBuilder::new(id)
            .attr(p4::NAME, "R1")
            .attr(p4::AGENT_ID, "1")
            .attr(p4::INDEX, index)
            .attr(p4::VALUE, value)
            .build()
    }

    fn key(index: &str) -> StateKey {
        StateKey::new("R1", "1", index)
    }

    #[test]
    fn first_observation_seeds_history() {
        let mut table = StateTable::default();
        assert!(table.perform_state_check(Operation::Write, &register("e0", "0", "5")).is_none());
        assert_eq!(table.len(), 1);
        assert_eq!(table.latest(&key("0")).unwrap().id.as_str(), "e0");
    }

    #[test]
    fn equal_write_is_not_a_transition() {
        let mut table = StateTable::default();
        table.perform_state_check(Operation::Write, &register("e0", "0", "5"));
        assert!(table.perform_state_check(Operation::Write, &register("e1", "0", "5")).is_none());
        assert_eq!(table.history(&key("0")).len(), 1);
    }

    #[test]
    fn changed_write_appends_and_reports_transition() {
        let mut table = StateTable::default();
        table.perform_state_check(Operation::Write, &register("e0", "0", "5"));
        let transition = table
            .perform_state_check(Operation::Write, &register("e1", "0", "7"))
            .expect("transition");
        assert_eq!(transition.previous.id.as_str(), "e0");
        assert_eq!(transition.current.id.as_str(), "e1");
        assert_eq!(transition.previous_value(), "5");
        assert_eq!(transition.current_value(), "7");
        let ids: Vec<&str> = table.history(&key("0")).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e0", "e1"]);
    }

    #[test]
    fn reads_and_adds_never_transition() {
        let mut table = StateTable::default();
        table.perform_state_check(Operation::Read, &register("e0", "0", "5"));
        assert!(table.perform_state_check(Operation::Read, &register("e1", "0", "9")).is_none());
        assert!(table.perform_state_check(Operation::Add, &register("e2", "0", "9")).is_none());
        assert_eq!(table.latest(&key("0")).unwrap().id.as_str(), "e0");
    }

    #[test]
    fn indices_are_tracked_separately() {
        let mut table = StateTable::default();
        table.perform_state_check(Operation::Write, &register("e0", "0", "5"));
        assert!(table.perform_state_check(Operation::Write, &register("e1", "1", "7")).is_none());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn latest_only_keeps_a_single_slot() {
        let mut table = StateTable::new(HistoryRetention::LatestOnly);
        table.perform_state_check(Operation::Write, &register("e0", "0", "5"));
        table.perform_state_check(Operation::Write, &register("e1", "0", "7"));
        let transition = table
            .perform_state_check(Operation::Write, &register("e2", "0", "5"))
            .expect("transition");
        assert_eq!(transition.previous.id.as_str(), "e1");
        assert_eq!(table.history(&key("0")).len(), 1);
    }

    #[test]
    fn entity_without_index_is_skipped() {
        let mut table = StateTable::default();
        let entity = EntityBuilder::new("e0").attr(p4::NAME, "R1").attr(p4::AGENT_ID, "1").build();
        assert!(table.perform_state_check(Operation::Write, &entity).is_none());
        assert!(table.is_empty());
        assert!(table.history(&key("0")).is_empty());
    }
}
