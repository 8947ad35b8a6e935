//! Tracing initialisation helper.

use tracing_subscriber::EnvFilter;

/// Initialise the global tracing subscriber.
///
/// Honours `RUST_LOG`; defaults to `info`. Safe to call more than once
/// (subsequent calls are no-ops), which matters for tests.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
