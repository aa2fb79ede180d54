//! Tracing subscriber setup
//!
//! Console output is filtered by `logging.level` (or `RUST_LOG`, which wins).
//! The appender layer is unfiltered; every appender applies its own threshold.

use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use iew_core::config::LoggingConfig;

use crate::registry::{AppenderLayer, RootLogger};

/// Builds the console filter from `RUST_LOG`, falling back to the configured level
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Installs the global `tracing` subscriber
///
/// # Errors
///
/// Fails if a global subscriber has already been installed.
pub fn init_tracing(config: &LoggingConfig, root: Arc<RootLogger>) -> anyhow::Result<()> {
    let filter = env_filter(config);
    let console: Box<dyn Layer<Registry> + Send + Sync> = if config.json {
        fmt::layer().json().with_filter(filter).boxed()
    } else {
        fmt::layer().with_target(true).with_filter(filter).boxed()
    };

    tracing_subscriber::registry()
        .with(console)
        .with(AppenderLayer::new(root))
        .try_init()?;

    tracing::debug!(level = %config.level, json = config.json, "Tracing initialized");
    Ok(())
}
