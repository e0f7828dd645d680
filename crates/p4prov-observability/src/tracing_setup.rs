//! Subscriber installation.
//!
//! Output goes to stderr so that stdout stays free for run summaries.
//! `RUST_LOG` overrides the default directive.

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "info";

pub fn init_tracing() {
    init_tracing_with_default(DEFAULT_DIRECTIVE);
}

/// Install a global fmt subscriber. A second call is a no-op, which lets
/// tests and the binary share this entry point.
pub fn init_tracing_with_default(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
