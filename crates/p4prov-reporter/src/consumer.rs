//! Consumer loop and message sources.
//!
//! A [`Consumer`] drains one [`MessageSource`] through its dispatcher until
//! the source ends or shutdown is requested. Shutdown is only observed
//! between messages, so a message that has started dispatching always
//! finishes.

use crate::dispatcher::{DispatchOutcome, Dispatcher};
use crate::stats::DispatchStats;
use async_trait::async_trait;
use p4prov_core::QueueConfig;
use p4prov_observability::spans;
use serde::Serialize;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Split, Stdin};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, Notify, mpsc};
use tracing::Instrument;

#[async_trait]
pub trait MessageSource: Send {
    /// Short label used in logs.
    fn describe(&self) -> String;

    /// Next raw message in wire bytes, `None` once the source is exhausted.
    /// Encoding is checked per message by the dispatcher, so a garbled
    /// message never ends the source.
    async fn next_message(&mut self) -> Option<io::Result<Vec<u8>>>;
}

/// Newline-delimited messages from any buffered reader. A trailing `\r` is
/// stripped and blank lines are skipped.
pub struct LineSource<R> {
    lines: Split<R>,
    label: String,
}

impl<R> LineSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R, label: impl Into<String>) -> Self {
        Self { lines: reader.split(b'\n'), label: label.into() }
    }
}

impl LineSource<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), "stdin")
    }
}

impl LineSource<BufReader<File>> {
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).await?;
        Ok(Self::new(BufReader::new(file), path.display().to_string()))
    }
}

#[async_trait]
impl<R> MessageSource for LineSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    fn describe(&self) -> String {
        self.label.clone()
    }

    async fn next_message(&mut self) -> Option<io::Result<Vec<u8>>> {
        loop {
            match self.lines.next_segment().await {
                Ok(Some(mut line)) => {
                    if line.last() == Some(&b'\r') {
                        line.pop();
                    }
                    if line.iter().all(u8::is_ascii_whitespace) {
                        continue;
                    }
                    return Some(Ok(line));
                }
                Ok(None) => return None,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

/// Newline-delimited feed read from the configured queue endpoint.
pub struct TcpLineSource {
    inner: LineSource<BufReader<TcpStream>>,
}

impl TcpLineSource {
    pub async fn connect(config: &QueueConfig) -> io::Result<Self> {
        let address = config.address();
        let stream = TcpStream::connect(&address).await?;
        tracing::info!(address = %address, queue = %config.queue_name, "Connected to telemetry feed");
        let label = format!("tcp://{}/{}", address, config.queue_name);
        Ok(Self { inner: LineSource::new(BufReader::new(stream), label) })
    }
}

#[async_trait]
impl MessageSource for TcpLineSource {
    fn describe(&self) -> String {
        self.inner.describe()
    }

    async fn next_message(&mut self) -> Option<io::Result<Vec<u8>>> {
        self.inner.next_message().await
    }
}

/// Messages pushed by another task, typically an external queue client.
pub struct ChannelSource {
    receiver: mpsc::Receiver<String>,
}

/// Create a bounded channel whose receiving half is a [`MessageSource`].
/// The source ends once every sender is dropped.
pub fn channel(capacity: usize) -> (mpsc::Sender<String>, ChannelSource) {
    let (sender, receiver) = mpsc::channel(capacity);
    (sender, ChannelSource { receiver })
}

#[async_trait]
impl MessageSource for ChannelSource {
    fn describe(&self) -> String {
        "channel".to_string()
    }

    async fn next_message(&mut self) -> Option<io::Result<Vec<u8>>> {
        self.receiver.recv().await.map(|message| Ok(message.into_bytes()))
    }
}

#[derive(Debug, Default)]
struct ShutdownState {
    triggered: AtomicBool,
    notify: Notify,
}

/// Cooperative stop request shared between the consumer and whoever decides
/// to stop it (signal handler, test, supervisor).
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    state: Arc<ShutdownState>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.state.triggered.store(true, Ordering::SeqCst);
        self.state.notify.notify_waiters();
    }

    pub fn is_triggered(&self) -> bool {
        self.state.triggered.load(Ordering::SeqCst)
    }

    /// Resolves once [`ShutdownSignal::trigger`] has been called.
    pub async fn wait(&self) {
        loop {
            let notified = self.state.notify.notified();
            if self.is_triggered() {
                return;
            }
            notified.await;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "detail")]
pub enum StopReason {
    EndOfInput,
    Shutdown,
    SourceError(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub source: String,
    /// Messages read from the source during this run.
    pub received: u64,
    pub stop: StopReason,
    pub stats: DispatchStats,
}

pub struct Consumer {
    dispatcher: Dispatcher,
}

impl Consumer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub async fn run<S>(&mut self, source: &mut S, shutdown: &ShutdownSignal) -> RunSummary
    where
        S: MessageSource + ?Sized,
    {
        let label = source.describe();
        let span = spans::consume(&label);
        self.drain(source, shutdown, label).instrument(span).await
    }

    async fn drain<S>(&mut self, source: &mut S, shutdown: &ShutdownSignal, label: String) -> RunSummary
    where
        S: MessageSource + ?Sized,
    {
        tracing::info!("Consumer started");
        let mut received = 0u64;
        let stop = loop {
            if shutdown.is_triggered() {
                break StopReason::Shutdown;
            }
            let next = tokio::select! {
                biased;
                _ = shutdown.wait() => break StopReason::Shutdown,
                next = source.next_message() => next,
            };
            match next {
                Some(Ok(raw)) => {
                    received += 1;
                    self.dispatcher.process_bytes(&raw).await;
                }
                Some(Err(err)) => {
                    tracing::error!(error = %err, "Message source failed");
                    break StopReason::SourceError(err.to_string());
                }
                None => break StopReason::EndOfInput,
            }
        };

        if let Err(err) = self.dispatcher.flush().await {
            tracing::error!(error = %err, "Failed to flush provenance sink");
        }
        let stats = self.dispatcher.stats().clone();
        tracing::info!(
            received,
            vertices = stats.vertex_total(),
            edges = stats.edge_total(),
            dropped = stats.dropped_total(),
            stop = ?stop,
            "Consumer stopped"
        );
        RunSummary { source: label, received, stop, stats }
    }
}

/// Dispatcher shared by concurrent delivery callbacks. Deliveries are
/// serialized; at most one message is being dispatched at any time.
#[derive(Clone)]
pub struct SharedDispatcher {
    inner: Arc<Mutex<Dispatcher>>,
}

impl SharedDispatcher {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { inner: Arc::new(Mutex::new(dispatcher)) }
    }

    pub async fn deliver(&self, raw: &str) -> Option<DispatchOutcome> {
        self.inner.lock().await.process(raw).await
    }

    pub async fn stats(&self) -> DispatchStats {
        self.inner.lock().await.stats().clone()
    }

    pub async fn flush(&self) -> p4prov_provenance::error::Result<()> {
        self.inner.lock().await.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use p4prov_provenance::InMemoryProvenanceStore;
    use std::time::Duration;

    fn consumer() -> (Arc<InMemoryProvenanceStore>, Consumer) {
        let store = Arc::new(InMemoryProvenanceStore::new());
        (store.clone(), Consumer::new(Dispatcher::new(store)))
    }

    #[tokio::test]
    async fn line_source_skips_blank_lines() {
        let input: &[u8] = b"AGENT|S1|1|t0|Switch\r\n\n   \r\nACTIVITY|A1|1|t1|PacketProcessor";
        let mut source = LineSource::new(input, "memory");
        assert_eq!(source.next_message().await.unwrap().unwrap(), b"AGENT|S1|1|t0|Switch");
        assert_eq!(
            source.next_message().await.unwrap().unwrap(),
            b"ACTIVITY|A1|1|t1|PacketProcessor"
        );
        assert!(source.next_message().await.is_none());
    }

    #[tokio::test]
    async fn garbled_line_is_dropped_and_reading_continues() {
        let (store, mut consumer) = consumer();
        let input: &[u8] = b"AGENT|S1|1|t0|Switch\n\
            ENTITY|R1|1|t1|register|WRITE|{\"index\": \"0\", \"value\": \"\xff\"}\n\
            ACTIVITY|A1|1|t2|PacketProcessor\n";
        let mut source = LineSource::new(input, "memory");
        let summary = consumer.run(&mut source, &ShutdownSignal::new()).await;
        assert_eq!(summary.stop, StopReason::EndOfInput);
        assert_eq!(summary.received, 3);
        assert_eq!(summary.stats.dropped["malformed_message"], 1);
        assert_eq!(store.vertex_count().await, 2);
        assert_eq!(store.edge_count().await, 1);
    }

    #[tokio::test]
    async fn run_drains_source_to_end() {
        let (store, mut consumer) = consumer();
        let input: &[u8] = b"AGENT|S1|1|t0|Switch\nACTIVITY|A1|1|t1|PacketProcessor\nFOO|x\n";
        let mut source = LineSource::new(input, "memory");
        let summary = consumer.run(&mut source, &ShutdownSignal::new()).await;
        assert_eq!(summary.stop, StopReason::EndOfInput);
        assert_eq!(summary.received, 3);
        assert_eq!(summary.stats.dropped_total(), 1);
        assert_eq!(store.vertex_count().await, 2);
        assert_eq!(store.edge_count().await, 1);
    }

    #[tokio::test]
    async fn triggered_shutdown_abandons_pending_wait() {
        let (_store, mut consumer) = consumer();
        let (sender, mut source) = channel(8);
        let shutdown = ShutdownSignal::new();
        sender.send("AGENT|S1|1|t0|Switch".to_string()).await.unwrap();

        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.trigger();
        });
        let summary = tokio::time::timeout(Duration::from_secs(5), consumer.run(&mut source, &shutdown))
            .await
            .expect("consumer stops on shutdown");
        assert_eq!(summary.stop, StopReason::Shutdown);
        assert_eq!(summary.received, 1);
        drop(sender);
    }

    #[tokio::test]
    async fn shutdown_before_run_reads_nothing() {
        let (store, mut consumer) = consumer();
        let input: &[u8] = b"AGENT|S1|1|t0|Switch\n";
        let mut source = LineSource::new(input, "memory");
        let shutdown = ShutdownSignal::new();
        shutdown.trigger();
        let summary = consumer.run(&mut source, &shutdown).await;
        assert_eq!(summary.stop, StopReason::Shutdown);
        assert_eq!(summary.received, 0);
        assert_eq!(store.vertex_count().await, 0);
    }

    #[tokio::test]
    async fn channel_source_ends_when_senders_drop() {
        let (sender, mut source) = channel(1);
        drop(sender);
        assert!(source.next_message().await.is_none());
    }
}
