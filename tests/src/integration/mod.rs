//! Cross-subsystem integration flows.

mod aggregator_flows;
mod scheduler_flows;

/// Route `RUST_LOG`-filtered tracing to the test output. Safe to call from
/// every test; only the first call installs the subscriber.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
