//! Shared utilities for integration tests.

#![allow(dead_code)]

pub mod canned_server;
pub mod socket_guard;

/// Installs a test-writer subscriber once per test binary; honours `RUST_LOG`.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
