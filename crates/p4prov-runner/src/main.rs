//! P4 provenance reporter
//!
//! Reads pipe-delimited device telemetry from a file, stdin or a TCP feed,
//! builds the provenance graph and hands it to the selected sink. A run
//! summary is printed to stdout when the input ends or Ctrl-C is pressed.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use p4prov_core::{HistoryRetention, P4ProvError, ReporterConfig};
use p4prov_observability::tracing_setup;
use p4prov_provenance::{InMemoryProvenanceStore, JsonLinesProvenanceWriter, ProvenanceSink};
use p4prov_reporter::{
    Consumer, Dispatcher, LineSource, MessageSource, StopReason, ShutdownSignal, TcpLineSource,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SinkChoice {
    Memory,
    Jsonl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SourceKind {
    Stdin,
    File(PathBuf),
    Tcp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SinkKind {
    Memory,
    JsonLines(PathBuf),
}

#[derive(Debug)]
struct RunnerConfig {
    reporter: ReporterConfig,
    source: SourceKind,
    sink: SinkKind,
}

#[derive(Parser, Debug)]
#[command(name = "p4prov", about = "Translate P4 device telemetry into a provenance graph")]
struct Cli {
    /// Telemetry input file, `-` for stdin (the default).
    #[arg(long, value_name = "PATH", conflicts_with = "tcp")]
    input: Option<PathBuf>,

    /// Read newline-delimited telemetry from the queue endpoint.
    #[arg(long)]
    tcp: bool,

    /// Provenance sink.
    #[arg(long, value_enum, default_value_t = SinkChoice::Memory)]
    sink: SinkChoice,

    /// Output file (required for the jsonl sink).
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// State history retention: full or latest.
    #[arg(long, value_name = "RETENTION")]
    state_history: Option<HistoryRetention>,

    /// Queue host (overrides P4PROV_QUEUE_HOST).
    #[arg(long)]
    queue_host: Option<String>,

    /// Queue port (overrides P4PROV_QUEUE_PORT).
    #[arg(long)]
    queue_port: Option<u16>,

    /// Queue name (overrides P4PROV_QUEUE_NAME).
    #[arg(long)]
    queue_name: Option<String>,
}

impl Cli {
    /// Merge flags over `base`, which comes from the environment.
    fn into_config(self, mut base: ReporterConfig) -> anyhow::Result<RunnerConfig> {
        if let Some(host) = self.queue_host {
            base.queue.host = host;
        }
        if let Some(port) = self.queue_port {
            base.queue.port = port;
        }
        if let Some(name) = self.queue_name {
            base.queue.queue_name = name;
        }
        if let Some(history) = self.state_history {
            base.history = history;
        }

        let source = match (self.tcp, self.input) {
            (true, _) => SourceKind::Tcp,
            (false, Some(path)) if path.as_os_str() != "-" => SourceKind::File(path),
            (false, _) => SourceKind::Stdin,
        };

        let sink = match self.sink {
            SinkChoice::Memory => SinkKind::Memory,
            SinkChoice::Jsonl => {
                let path = self.output.ok_or_else(|| {
                    P4ProvError::InvalidArgument("--output is required for the jsonl sink".to_string())
                })?;
                SinkKind::JsonLines(path)
            }
        };

        Ok(RunnerConfig { reporter: base, source, sink })
    }
}

async fn build_sink(kind: &SinkKind) -> anyhow::Result<Arc<dyn ProvenanceSink>> {
    let sink: Arc<dyn ProvenanceSink> = match kind {
        SinkKind::Memory => Arc::new(InMemoryProvenanceStore::new()),
        SinkKind::JsonLines(path) => Arc::new(
            JsonLinesProvenanceWriter::open(path)
                .await
                .with_context(|| format!("Failed to open sink file {}", path.display()))?,
        ),
    };
    Ok(sink)
}

async fn build_source(config: &RunnerConfig) -> anyhow::Result<Box<dyn MessageSource>> {
    let source: Box<dyn MessageSource> = match &config.source {
        SourceKind::Stdin => Box::new(LineSource::stdin()),
        SourceKind::File(path) => Box::new(
            LineSource::open(path)
                .await
                .with_context(|| format!("Failed to open input {}", path.display()))?,
        ),
        SourceKind::Tcp => Box::new(
            TcpLineSource::connect(&config.reporter.queue)
                .await
                .with_context(|| format!("Failed to connect to {}", config.reporter.queue.address()))?,
        ),
    };
    Ok(source)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_setup::init_tracing();

    let env_config = ReporterConfig::from_env().context("Failed to load configuration")?;
    let config = Cli::parse().into_config(env_config).context("Failed to parse arguments")?;
    info!(
        source = ?config.source,
        sink = ?config.sink,
        history = %config.reporter.history,
        "P4 provenance reporter starting"
    );

    let sink = build_sink(&config.sink).await?;
    let mut source = build_source(&config).await?;

    let shutdown = ShutdownSignal::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, finishing current message");
                signal.trigger();
            }
            Err(e) => error!(error = %e, "Failed to listen for interrupt"),
        }
    });

    let mut consumer = Consumer::new(Dispatcher::with_retention(sink, config.reporter.history));
    let summary = consumer.run(source.as_mut(), &shutdown).await;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if let StopReason::SourceError(reason) = &summary.stop {
        anyhow::bail!("Message source failed: {}", reason);
    }
    info!("P4 provenance reporter finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<RunnerConfig> {
        let cli = Cli::try_parse_from(std::iter::once("p4prov").chain(args.iter().copied()))?;
        cli.into_config(ReporterConfig::default())
    }

    #[test]
    fn defaults_read_stdin_into_memory() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.source, SourceKind::Stdin);
        assert_eq!(config.sink, SinkKind::Memory);
        assert_eq!(config.reporter, ReporterConfig::default());
    }

    #[test]
    fn dash_input_means_stdin() {
        assert_eq!(parse(&["--input", "-"]).unwrap().source, SourceKind::Stdin);
        assert_eq!(
            parse(&["--input", "trace.log"]).unwrap().source,
            SourceKind::File(PathBuf::from("trace.log"))
        );
    }

    #[test]
    fn flags_override_environment() {
        let cli = Cli::try_parse_from([
            "p4prov",
            "--tcp",
            "--queue-host",
            "10.0.0.5",
            "--queue-port",
            "7000",
            "--state-history",
            "latest",
        ])
        .unwrap();
        let mut base = ReporterConfig::default();
        base.queue.queue_name = "from_env".to_string();
        let config = cli.into_config(base).unwrap();
        assert_eq!(config.source, SourceKind::Tcp);
        assert_eq!(config.reporter.queue.address(), "10.0.0.5:7000");
        assert_eq!(config.reporter.queue.queue_name, "from_env");
        assert_eq!(config.reporter.history, HistoryRetention::LatestOnly);
    }

    #[test]
    fn jsonl_sink_requires_output() {
        let err = parse(&["--sink", "jsonl"]).unwrap_err();
        assert!(err.to_string().contains("--output"));
        assert_eq!(
            parse(&["--sink", "jsonl", "--output", "graph.jsonl"]).unwrap().sink,
            SinkKind::JsonLines(PathBuf::from("graph.jsonl"))
        );
    }

    #[test]
    fn input_conflicts_with_tcp() {
        assert!(Cli::try_parse_from(["p4prov", "--tcp", "--input", "trace.log"]).is_err());
    }
}
