//! P4 telemetry to provenance-graph reporter.
//!
//! Consumes pipe-delimited telemetry messages emitted by a programmable
//! switch and its controller, and incrementally builds a provenance graph
//! of agents, activities and entities.
//!
//! Data flow: [`consumer::MessageSource`] → [`Consumer`] → [`Dispatcher`]
//! → decoder, registries and state table → [`graph_builder::GraphBuilder`]
//! → [`p4prov_provenance::ProvenanceSink`].

pub mod consumer;
pub mod dispatcher;
pub mod error;
pub mod graph_builder;
pub mod message;
pub mod payload;
pub mod registry;
pub mod rules;
pub mod state_table;
pub mod stats;

pub use consumer::{
    ChannelSource, Consumer, LineSource, MessageSource, RunSummary, SharedDispatcher,
    ShutdownSignal, StopReason, TcpLineSource,
};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::{MessageError, Result};
pub use message::{EntityKind, EventKind, Operation, TelemetryMessage, decode_message};
pub use state_table::{StateKey, StateTable, StateTransition};
pub use stats::DispatchStats;
