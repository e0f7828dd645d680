//! Event dispatcher.
//!
//! Routes each decoded message to its handler, keeps the identity registries
//! and state table current, and hands every vertex and edge to the sink.
//! One message is processed to completion before the next one starts.

use crate::error::{MessageError, Result};
use crate::graph_builder::GraphBuilder;
use crate::message::{
    ActivityMessage, AgentMessage, EntityMessage, EventKind, TelemetryMessage, decode_message,
};
use crate::registry::IdentityRegistry;
use crate::rules::is_recognized_pairing;
use crate::state_table::StateTable;
use crate::stats::DispatchStats;
use p4prov_core::HistoryRetention;
use p4prov_observability::spans;
use p4prov_provenance::vocabulary::p4;
use p4prov_provenance::{Activity, Agent, Edge, EdgeId, ProvenanceSink, Vertex};
use std::sync::Arc;
use tracing::Instrument;

/// What a successfully dispatched message emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    pub event: EventKind,
    pub vertex: String,
    pub edges: Vec<EdgeId>,
    /// Set when an ENTITY arrived before any ACTIVITY for its agent id.
    pub missing_correlation: bool,
}

impl DispatchOutcome {
    fn new(event: EventKind, vertex: impl Into<String>) -> Self {
        Self { event, vertex: vertex.into(), edges: Vec::new(), missing_correlation: false }
    }
}

pub struct Dispatcher {
    sink: Arc<dyn ProvenanceSink>,
    builder: GraphBuilder,
    registry: IdentityRegistry,
    state: StateTable,
    stats: DispatchStats,
}

impl Dispatcher {
    pub fn new(sink: Arc<dyn ProvenanceSink>) -> Self {
        Self::with_retention(sink, HistoryRetention::default())
    }

    pub fn with_retention(sink: Arc<dyn ProvenanceSink>, retention: HistoryRetention) -> Self {
        Self {
            sink,
            builder: GraphBuilder::new(),
            registry: IdentityRegistry::new(),
            state: StateTable::new(retention),
            stats: DispatchStats::default(),
        }
    }

    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    pub fn state_table(&self) -> &StateTable {
        &self.state
    }

    /// Decode and apply one raw message. Errors mean the message was dropped
    /// before any registry or state mutation.
    ///
    /// # Example
    ///
    /// ```
    /// # use std::sync::Arc;
    /// # use p4prov_provenance::InMemoryProvenanceStore;
    /// # use p4prov_reporter::Dispatcher;
    /// # tokio_test::block_on(async {
    /// let store = Arc::new(InMemoryProvenanceStore::new());
    /// let mut dispatcher = Dispatcher::new(store.clone());
    /// dispatcher.dispatch("AGENT|S1|1|t0|Switch").await?;
    /// let outcome = dispatcher.dispatch("ACTIVITY|A1|1|t1|PacketProcessor").await?;
    /// assert_eq!(outcome.edges.len(), 1);
    /// assert_eq!(store.vertex_count().await, 2);
    /// # Ok::<(), p4prov_reporter::MessageError>(())
    /// # }).unwrap();
    /// ```
    pub async fn dispatch(&mut self, raw: &str) -> Result<DispatchOutcome> {
        self.stats.record_message();
        let result = self.apply(raw).await;
        if let Err(err) = &result {
            self.stats.record_drop(err);
        }
        result
    }

    /// Like [`Dispatcher::dispatch`] but recovers locally: failures are
    /// logged and counted, never returned.
    pub async fn process(&mut self, raw: &str) -> Option<DispatchOutcome> {
        let span = spans::dispatch_message(self.stats.messages + 1);
        match self.dispatch(raw).instrument(span.clone()).await {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                span.in_scope(|| log_drop(&err));
                None
            }
        }
    }

    /// [`Dispatcher::process`] for a message still in wire bytes. Bytes that
    /// are not UTF-8 count as one dropped `MalformedMessage`.
    pub async fn process_bytes(&mut self, raw: &[u8]) -> Option<DispatchOutcome> {
        let text = match std::str::from_utf8(raw) {
            Ok(text) => text,
            Err(err) => {
                let span = spans::dispatch_message(self.stats.messages + 1);
                self.stats.record_message();
                let err = MessageError::malformed(format!("message is not valid UTF-8: {err}"));
                self.stats.record_drop(&err);
                span.in_scope(|| log_drop(&err));
                return None;
            }
        };
        self.process(text).await
    }

    pub async fn flush(&self) -> p4prov_provenance::error::Result<()> {
        self.sink.flush().await
    }

    async fn apply(&mut self, raw: &str) -> Result<DispatchOutcome> {
        let message = decode_message(raw)?;
        let header = message.header();
        spans::record_message_identity(message.kind().as_str(), header.agent_id.as_str());
        let outcome = match message {
            TelemetryMessage::Agent(message) => self.on_agent(message).await,
            TelemetryMessage::Activity(message) => self.on_activity(message).await,
            TelemetryMessage::Entity(message) => self.on_entity(message).await,
        };
        tracing::debug!(vertex = %outcome.vertex, edges = outcome.edges.len(), "Message dispatched");
        Ok(outcome)
    }

    async fn on_agent(&mut self, message: AgentMessage) -> DispatchOutcome {
        let agent = self.builder.agent(&message);
        let mut outcome = DispatchOutcome::new(EventKind::Agent, agent.id.as_str());
        self.emit_vertex(agent.clone().into()).await;

        // An activity announced earlier for this id is associated now, unless
        // an earlier agent already claimed it.
        let association = self
            .registry
            .activity_of(&message.header.agent_id)
            .filter(|activity| !self.registry.is_associated(&activity.id))
            .filter(|activity| associates(activity, &agent))
            .map(|activity| (activity.id.clone(), self.builder.association(activity, &agent)));
        self.registry.register_agent(message.header.agent_id, agent);

        if let Some((activity_id, edge)) = association {
            self.registry.mark_associated(&activity_id);
            self.emit_edge(edge, &mut outcome).await;
        }
        outcome
    }

    async fn on_activity(&mut self, message: ActivityMessage) -> DispatchOutcome {
        let activity = self.builder.activity(&message);
        let mut outcome = DispatchOutcome::new(EventKind::Activity, activity.id.as_str());
        self.emit_vertex(activity.clone().into()).await;

        let association = self
            .registry
            .agent_of(&message.header.agent_id)
            .filter(|agent| associates(&activity, agent))
            .map(|agent| self.builder.association(&activity, agent));
        if association.is_some() {
            self.registry.mark_associated(&activity.id);
        }
        self.registry.register_activity(message.header.agent_id, activity);

        if let Some(edge) = association {
            self.emit_edge(edge, &mut outcome).await;
        }
        outcome
    }

    async fn on_entity(&mut self, message: EntityMessage) -> DispatchOutcome {
        let entity = self.builder.entity(&message);
        let mut outcome = DispatchOutcome::new(EventKind::Entity, entity.id.as_str());
        self.emit_vertex(entity.clone().into()).await;

        if message.kind.is_stateful() {
            if let Some(transition) = self.state.perform_state_check(message.operation, &entity) {
                let edge = self.builder.derivation(message.operation, &transition);
                self.emit_edge(edge, &mut outcome).await;
            }
        }

        let agent_id = &message.header.agent_id;
        let causal = self
            .registry
            .activity_of(agent_id)
            .filter(|activity| activity.annotation(p4::AGENT_ID) == Some(agent_id.as_str()))
            .map(|activity| self.builder.causal(message.operation, &entity, activity));
        match causal {
            Some(edge) => self.emit_edge(edge, &mut outcome).await,
            None => {
                let err = MessageError::MissingCorrelation { agent_id: agent_id.clone() };
                tracing::warn!(error = %err, entity_id = %entity.id, "Entity has no causal activity");
                self.stats.record_missing_correlation();
                outcome.missing_correlation = true;
            }
        }
        outcome
    }

    async fn emit_vertex(&mut self, vertex: Vertex) {
        self.stats.record_vertex(vertex.kind());
        self.sink.submit_vertex_with_logging(vertex).await;
    }

    async fn emit_edge(&mut self, edge: Edge, outcome: &mut DispatchOutcome) {
        self.stats.record_edge(edge.kind());
        outcome.edges.push(edge.id().clone());
        self.sink.submit_edge_with_logging(edge).await;
    }
}

fn log_drop(err: &MessageError) {
    tracing::warn!(error = %err, error_kind = err.kind(), "Dropping telemetry message");
}

/// Recognized type pairing announced under the same device agent id.
fn associates(activity: &Activity, agent: &Agent) -> bool {
    let (Some(activity_type), Some(agent_type)) =
        (activity.annotation(p4::ACTIVITY_TYPE), agent.annotation(p4::AGENT_TYPE))
    else {
        return false;
    };
    is_recognized_pairing(activity_type, agent_type)
        && activity.annotation(p4::AGENT_ID) == agent.annotation(p4::AGENT_ID)
}
