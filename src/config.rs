//! Configuration management for rJMX-Probe
//!
//! Resolves the effective probe configuration from three layers:
//! built-in defaults, an optional YAML override file (`-c`), and CLI
//! flags. CLI flags win over the file; file keys that are omitted leave
//! the prior value untouched.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use url::Url;

use crate::cli::Cli;

/// Default Jolokia request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error reading the configuration file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Error parsing the configuration file
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Effective probe configuration, fully resolved
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Target host
    pub host: String,
    /// Target service port
    pub service: String,
    /// Optional username for basic auth
    pub username: Option<String>,
    /// Optional password for basic auth
    pub password: Option<String>,
    /// Use https for the Jolokia endpoint
    pub use_ssl: bool,
    /// Explicit ordered column list for CSV output
    pub columns: Vec<String>,
    /// Long-form listing instead of CSV
    pub long_form: bool,
    /// Emit a CSV header row
    pub headers: bool,
    /// Run the catalogue-listing diagnostic
    pub list_beans: bool,
    /// Ignore configured columns and use all discovered keys, sorted
    pub all_columns: bool,
    /// Jolokia request timeout in milliseconds
    pub timeout_ms: u64,
}

/// Raw shape of the `-c` override file
///
/// Every key is optional; an omitted key leaves the prior default (or
/// CLI value) unchanged rather than coercing it.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    host: Option<String>,
    service: Option<String>,
    username: Option<String>,
    password: Option<String>,
    usessl: Option<bool>,
    /// Comma-separated column list, same syntax as `-C`
    columns: Option<String>,
    /// `long: true` switches to long-form output
    long: Option<bool>,
    timeout_ms: Option<u64>,
}

impl ConfigFile {
    fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let file: ConfigFile = serde_yaml::from_str(&contents)?;
        Ok(file)
    }
}

/// Split a `-C a,b,c` style column list, preserving order
pub fn parse_column_list(spec: &str) -> Vec<String> {
    spec.split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

impl ProbeConfig {
    /// Resolve the effective configuration from CLI flags and the
    /// optional override file
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or parsed, or when
    /// host/service are still missing after merging.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };

        let host = cli.host.clone().or(file.host);
        let service = cli.service.clone().or(file.service);

        let (host, service) = match (host, service) {
            (Some(h), Some(s)) => (h, s),
            _ => {
                return Err(ConfigError::ValidationError(
                    "Hostname and/or service missing. Check parameters and configuration file"
                        .to_string(),
                ))
            }
        };

        let columns = match &cli.columns {
            Some(spec) => parse_column_list(spec),
            None => file
                .columns
                .as_deref()
                .map(parse_column_list)
                .unwrap_or_default(),
        };

        Ok(Self {
            host,
            service,
            username: cli.username.clone().or(file.username),
            password: cli.password.clone().or(file.password),
            use_ssl: cli.ssl || file.usessl.unwrap_or(false),
            columns,
            long_form: cli.long_form || file.long.unwrap_or(false),
            headers: cli.headers,
            list_beans: cli.list_beans,
            all_columns: cli.all_columns,
            timeout_ms: cli
                .timeout
                .or(file.timeout_ms)
                .unwrap_or(DEFAULT_TIMEOUT_MS),
        })
    }

    /// Compose and validate the Jolokia endpoint URL
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        let scheme = if self.use_ssl { "https" } else { "http" };
        let raw = format!("{}://{}:{}/jolokia", scheme, self.host, self.service);
        Url::parse(&raw)
            .map_err(|e| ConfigError::ValidationError(format!("Invalid endpoint {}: {}", raw, e)))
    }
}
