//! Tracing subscriber setup.
//!
//! The library only emits `tracing` events; binaries and tests decide where
//! they go. `RUST_LOG` takes precedence over the level passed in, e.g.
//! `RUST_LOG=babytrack::transformer=trace`.

use tracing_subscriber::EnvFilter;

/// Installs a compact stdout subscriber.
///
/// Returns an error if a global subscriber is already set.
pub fn init(level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
}

/// Installs a subscriber that writes through the test harness. Safe to call
/// from every test.
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
