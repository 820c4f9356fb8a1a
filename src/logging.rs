use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber for the chat server's log surface:
/// joins, departures, and the listening address at info; per-broadcast
/// delivery counts and session teardown at debug. `RUST_LOG` overrides
/// the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(false).init();
}
