//! Configuration and process environment

mod config;

pub use config::Config;

use tracing_subscriber::EnvFilter;

/// Set up the process environment: dotenv and structured logging
///
/// The log filter comes from `RUST_LOG`, defaulting to `info`.
pub fn setup_environment() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
