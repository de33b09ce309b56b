//! CLI argument parsing for rJMX-Probe
//!
//! This module provides the command-line interface using clap derive macros.
//!
//! # Options
//!
//! - `-h HOST`: target host
//! - `-s SERVICE`: target service/port
//! - `-U USER` / `-P PASS`: credentials for the remote session
//! - `-c FILE`: load configuration overrides from a YAML file
//! - `-C a,b,c`: explicit ordered column list
//! - `-l`: long-form output instead of CSV
//! - `-H`: emit a CSV header row
//! - `-B`: also run the catalogue-listing diagnostic
//! - `-A`: ignore configured columns, use all discovered keys sorted
//! - `--ssl`: use https for the endpoint
//! - `--timeout MS`: Jolokia request timeout (env: RJMX_PROBE_TIMEOUT)
//! - `--log-level`: trace/debug/info/warn/error (env: RJMX_PROBE_LOG_LEVEL)
//!
//! `-h` is the target host, not help; use `--help`. Short flags keep
//! the letters existing dashboards and cron entries already pass.
//!
//! # Precedence
//!
//! CLI arguments override configuration file values, which override the
//! built-in defaults.

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// rJMX-Probe - one-shot JVM health probe over Jolokia
///
/// Connects once, collects thread/memory/classloading/GC metrics, and
/// prints them as a single CSV row or a sorted listing.
#[derive(Parser, Debug)]
#[command(name = "rjmx-probe")]
#[command(author, version, about, long_about = None)]
#[command(disable_help_flag = true)]
pub struct Cli {
    /// Target host
    #[arg(short = 'h', long, value_name = "HOST")]
    pub host: Option<String>,

    /// Target service/port identifier
    #[arg(short = 's', long, value_name = "SERVICE")]
    pub service: Option<String>,

    /// Username for the remote session
    #[arg(short = 'U', long, value_name = "USER")]
    pub username: Option<String>,

    /// Password for the remote session
    #[arg(short = 'P', long, value_name = "PASS")]
    pub password: Option<String>,

    /// Load configuration overrides from a YAML file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Explicit ordered column list, comma-separated
    #[arg(short = 'C', long, value_name = "COLS")]
    pub columns: Option<String>,

    /// Long-form `key: value` output instead of CSV
    #[arg(short = 'l', long = "long")]
    pub long_form: bool,

    /// Emit a CSV header row
    #[arg(short = 'H', long)]
    pub headers: bool,

    /// Also list every discoverable managed object
    #[arg(short = 'B', long = "list-beans")]
    pub list_beans: bool,

    /// Ignore configured columns, use all discovered keys sorted
    #[arg(short = 'A', long = "all-columns")]
    pub all_columns: bool,

    /// Use https for the Jolokia endpoint
    #[arg(long)]
    pub ssl: bool,

    /// Jolokia request timeout in milliseconds
    #[arg(long, value_name = "MS", env = "RJMX_PROBE_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Log level
    #[arg(long, value_enum, default_value = "warn", env = "RJMX_PROBE_LOG_LEVEL")]
    pub log_level: LogLevel,

    /// Print help
    #[arg(long, action = ArgAction::HelpLong)]
    help: Option<bool>,
}

/// Log level options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Trace level - most verbose
    Trace,
    /// Debug level
    Debug,
    /// Info level
    Info,
    /// Warn level - default, keeps stdout clean for the CSV row
    Warn,
    /// Error level - least verbose
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}
