//! The metric collection and rendering pipeline
//!
//! A run flows Session -> collectors -> MetricTable -> column
//! resolution -> renderer, each stage owning its output. [`run`] wires
//! the stages together for one complete probe cycle.

pub mod catalogue;
pub mod collect;
pub mod columns;
pub mod render;
pub mod table;

pub use collect::{collect_all, GroupOutcome};
pub use columns::ColumnSpec;
pub use table::MetricTable;

use chrono::Local;

use crate::config::ProbeConfig;
use crate::error::ProbeResult;
use crate::session::ManagementSession;

/// Execute one full collection-and-render cycle, returning the text to
/// print on stdout
///
/// The catalogue diagnostic, when enabled, is prepended to the metric
/// output; a fatal failure anywhere produces no output at all.
pub async fn run<S: ManagementSession>(session: &S, config: &ProbeConfig) -> ProbeResult<String> {
    let mut out = String::new();

    if config.list_beans {
        out.push_str(&catalogue::render_catalogue(session).await?);
    }

    let table = collect_all(session).await?;

    if config.long_form {
        out.push_str(&render::render_long(&table));
    } else {
        let spec = ColumnSpec {
            columns: config.columns.clone(),
            all_columns: config.all_columns,
        };
        let columns = spec.resolve(&table);
        out.push_str(&render::render_csv(
            &table,
            &columns,
            config.headers,
            Local::now(),
        ));
    }

    Ok(out)
}
