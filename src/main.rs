//! rJMX-Probe - one-shot JVM health probe
//!
//! Connects to a Java application's Jolokia endpoint, collects a fixed
//! catalogue of runtime metrics, and prints them as a single CSV row or
//! a sorted listing.

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use rjmx_probe::cli::Cli;
use rjmx_probe::config::ProbeConfig;
use rjmx_probe::probe;
use rjmx_probe::session::JolokiaSession;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    // Initialize logging (stderr only; stdout carries the metric row)
    rjmx_probe::init_logging(&args.log_level.to_string())?;

    // Resolve configuration: defaults <- file <- CLI
    let config = ProbeConfig::resolve(&args)?;
    debug!(
        host = %config.host,
        service = %config.service,
        timeout_ms = config.timeout_ms,
        "Configuration resolved"
    );

    // Establish the session; transport/auth failures abort here,
    // before any output is produced.
    let session = JolokiaSession::connect(&config).await?;

    let output = probe::run(&session, &config).await?;
    print!("{}", output);

    Ok(())
}
