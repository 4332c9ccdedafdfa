//! Logging helpers over tracing-subscriber.
//!
//! Compiled to no-ops without the `logging` feature, so the library never
//! forces a subscriber on its embedders.

#[cfg(feature = "logging")]
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize logging at the default "info" level.
///
/// `RUST_LOG` overrides the level when set.
#[cfg(feature = "logging")]
pub fn init() {
    init_with_level("info")
}

/// Initialize logging at an explicit level (trace, debug, info, warn, error).
#[cfg(feature = "logging")]
pub fn init_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt().with_env_filter(filter).with_target(true).init();
}

/// Verbose initialization for tests; safe to call repeatedly.
#[cfg(feature = "logging")]
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

// Stub implementations when the logging feature is disabled
#[cfg(not(feature = "logging"))]
pub fn init() {}

#[cfg(not(feature = "logging"))]
pub fn init_with_level(_level: &str) {}

#[cfg(not(feature = "logging"))]
pub fn init_test() {}
