//! Tracing subscriber setup. `RUST_LOG` overrides the default filter.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "liftops=info,liftops_server=info,tower_http=info";

/// Install the global fmt subscriber. Records from the `log` crate (sqlx statements) are bridged.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)))
        .init();
}
