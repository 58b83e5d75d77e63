//! Tracing setup for binaries and tests embedding the client core.

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber, honouring `RUST_LOG`.
///
/// Safe to call more than once per process; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
