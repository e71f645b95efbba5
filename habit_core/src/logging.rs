//! Tracing setup for the `habitflow` binary.
//!
//! stdout carries command results (including `habit list --json`), so
//! diagnostics always go to stderr where they cannot corrupt piped output.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the stderr subscriber at WARN.
///
/// Skipped habit records and corrupt blobs log at WARN, so they stay visible
/// by default. `RUST_LOG=habit_core=debug` shows every load and save.
pub fn init() {
    init_with_level("warn")
}

/// Install the stderr subscriber, using `default_level` when RUST_LOG is unset.
///
/// Calling it twice is harmless: a second subscriber is silently refused.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}

/// Route debug output through the test harness's captured writer
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
