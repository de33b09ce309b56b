//! Managed-object catalogue diagnostic
//!
//! The `-B` path: lists every discoverable managed object with its
//! declared class and description. Independent of the metric pipeline;
//! its output never feeds the MetricTable.

use crate::jolokia::CollectResult;
use crate::session::ManagementSession;

/// Declared class of the platform memory-pool implementation; entries
/// matching it get their instance class printed a second time, after
/// re-resolution through the entry itself.
const MEMORY_POOL_IMPL: &str = "sun.management.MemoryPoolImpl";

/// Render the catalogue listing, one `MBean:` line per entry
pub async fn render_catalogue<S: ManagementSession>(session: &S) -> CollectResult<String> {
    let entries = session.catalogue().await?;

    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!(
            "MBean:{}, {}\n",
            entry.class_name, entry.description
        ));
        if entry.class_name == MEMORY_POOL_IMPL {
            out.push_str(&entry.class_name);
            out.push('\n');
        }
    }
    Ok(out)
}
