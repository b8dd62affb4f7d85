//! Development-time tracing for the story loop.
//!
//! Reads `RUST_LOG`, defaulting to `warn` when unset. Output goes to
//! stderr so it never interleaves with the story text on stdout.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// # Example
/// ```bash
/// RUST_LOG=tale_core=debug cargo run -p tale
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
