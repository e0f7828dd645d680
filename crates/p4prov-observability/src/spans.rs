//! Span constructors shared by the reporter and the runner.
//!
//! Fields declared `Empty` are filled in once the message has been decoded.

use tracing::{Span, field, info_span};

/// Span around one message, from raw line to submitted graph elements.
pub fn dispatch_message(sequence: u64) -> Span {
    info_span!(
        "dispatch_message",
        sequence,
        event = field::Empty,
        agent_id = field::Empty
    )
}

/// Record the decoded event kind and agent id on the current dispatch span.
pub fn record_message_identity(event: &str, agent_id: &str) {
    let span = Span::current();
    span.record("event", event);
    span.record("agent_id", agent_id);
}

/// Span around a consumer run over one message source.
pub fn consume(source: &str) -> Span {
    info_span!("consume", source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn dispatch_span_carries_recorded_identity() {
        let span = dispatch_message(7);
        span.in_scope(|| {
            record_message_identity("AGENT", "1");
            tracing::info!("inside dispatch");
        });
        assert!(logs_contain("sequence=7"));
        assert!(logs_contain("AGENT"));
    }
}
