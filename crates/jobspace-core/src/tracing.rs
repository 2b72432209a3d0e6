use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the process-wide subscriber: JSON lines to stdout, filtered by
/// `RUST_LOG`. Call once from `main` before anything logs.
///
/// Re-entrant: a second call is a no-op instead of a panic, which keeps
/// test binaries that share a process happy.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().json())
        .try_init();
}
