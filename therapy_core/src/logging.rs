//! Tracing setup shared by binaries built on this crate.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global subscriber: compact output, `RUST_LOG`-driven
/// filtering, `info` when unset.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}
