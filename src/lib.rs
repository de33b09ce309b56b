//! rJMX-Probe library
//!
//! This crate provides the core functionality for taking a one-shot
//! snapshot of JMX runtime metrics from a Java application via Jolokia
//! and rendering it as a CSV row or a sorted listing.

pub mod cli;
pub mod config;
pub mod error;
pub mod jolokia;
pub mod probe;
pub mod session;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging subsystem
///
/// Log output goes to stderr so that the metric row on stdout stays
/// machine-parseable.
///
/// # Arguments
/// * `level` - Log level string (trace, debug, info, warn, error)
///
/// # Errors
/// Returns an error if the logging system fails to initialize
pub fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
