//! Per-group metric collectors
//!
//! One collector per metric group, each a pure function over a
//! [`ManagementSession`]. A collector either fails as a whole (its
//! group-level query failed) or succeeds, possibly with per-item gaps
//! that are counted rather than hidden.

use tracing::{debug, warn};

use crate::jolokia::CollectResult;
use crate::session::{ManagementSession, ThreadState};

use super::table::MetricTable;

/// Outcome of one collector run
///
/// `Partial` means the group query succeeded but some discovered items
/// could not be resolved; the gap count is surfaced so callers can log
/// degraded visibility instead of silently dropping it.
#[derive(Debug)]
pub enum GroupOutcome {
    Complete(MetricTable),
    Partial { table: MetricTable, skipped: u64 },
}

impl GroupOutcome {
    fn from_parts(table: MetricTable, skipped: u64) -> Self {
        if skipped == 0 {
            GroupOutcome::Complete(table)
        } else {
            GroupOutcome::Partial { table, skipped }
        }
    }

    pub fn skipped(&self) -> u64 {
        match self {
            GroupOutcome::Complete(_) => 0,
            GroupOutcome::Partial { skipped, .. } => *skipped,
        }
    }

    pub fn into_table(self) -> MetricTable {
        match self {
            GroupOutcome::Complete(table) => table,
            GroupOutcome::Partial { table, .. } => table,
        }
    }
}

/// Collect thread counts and per-state classification
///
/// Every successfully inspected thread lands in exactly one of the
/// blocked/runnable/waiting buckets; timed-waiting (and new/terminated)
/// threads land in none of them, matching the probe's long-standing
/// output contract. Threads executing native code are tallied
/// separately and overlap the state buckets. A thread that cannot be
/// inspected -- missing monitor permission is the common case -- is
/// counted as unavailable and processing continues.
pub async fn collect_threads<S: ManagementSession>(session: &S) -> CollectResult<GroupOutcome> {
    let total = session.thread_count().await?;
    let tids = session.thread_ids().await?;

    let mut blocked: i64 = 0;
    let mut runnable: i64 = 0;
    let mut waiting: i64 = 0;
    let mut in_native: i64 = 0;
    let mut unavailable: i64 = 0;

    for tid in tids {
        let detail = match session.thread_detail(tid).await {
            Ok(detail) => detail,
            Err(e) => {
                debug!(tid, error = %e, "Thread not inspectable, counting as unavailable");
                unavailable += 1;
                continue;
            }
        };
        match detail.state {
            ThreadState::Blocked => blocked += 1,
            ThreadState::Runnable => runnable += 1,
            ThreadState::Waiting => waiting += 1,
            _ => {}
        }
        if detail.in_native {
            in_native += 1;
        }
    }

    let mut table = MetricTable::new();
    table.insert("Thread count", total.to_string());
    table.insert("Thread count - unavailable", unavailable.to_string());
    table.insert("Thread count - blocked", blocked.to_string());
    table.insert("Thread count - runnable", runnable.to_string());
    table.insert("Thread count - waiting", waiting.to_string());
    table.insert("Thread count - in native", in_native.to_string());

    // Unavailable is already a table key, but it still marks the group
    // as partial for the run summary.
    Ok(GroupOutcome::from_parts(table, unavailable as u64))
}

/// Collect heap and non-heap usage from the Memory MXBean
pub async fn collect_memory<S: ManagementSession>(session: &S) -> CollectResult<GroupOutcome> {
    let snapshot = session.memory().await?;

    let mut table = MetricTable::new();
    table.insert("Memory - heap memory - used", snapshot.heap.used.to_string());
    table.insert(
        "Memory - heap memory - committed",
        snapshot.heap.committed.to_string(),
    );
    table.insert("Memory - heap memory - max", snapshot.heap.max.to_string());
    table.insert(
        "Memory - non-heap memory - used",
        snapshot.non_heap.used.to_string(),
    );
    table.insert(
        "Memory - non-heap memory - committed",
        snapshot.non_heap.committed.to_string(),
    );
    table.insert(
        "Memory - non-heap memory - max",
        snapshot.non_heap.max.to_string(),
    );
    Ok(GroupOutcome::Complete(table))
}

/// Collect classloading counters
pub async fn collect_class_loading<S: ManagementSession>(
    session: &S,
) -> CollectResult<GroupOutcome> {
    let counts = session.class_loading().await?;

    let mut table = MetricTable::new();
    table.insert("Classes - loaded", counts.loaded.to_string());
    table.insert("Classes - total loaded", counts.total_loaded.to_string());
    table.insert("Classes - unloaded", counts.unloaded.to_string());
    Ok(GroupOutcome::Complete(table))
}

/// Runtime group: informational only, no metrics emitted yet
///
/// The vendor string is fetched so that a broken Runtime MXBean still
/// fails the run loudly, and logged for operators.
pub async fn collect_runtime<S: ManagementSession>(session: &S) -> CollectResult<GroupOutcome> {
    let vendor = session.vm_vendor().await?;
    debug!(vendor = %vendor, "Runtime MXBean resolved");
    Ok(GroupOutcome::Complete(MetricTable::new()))
}

/// Collect per-pool usage, one key triple per discovered memory pool
///
/// Pool names are not known in advance; keys are namespaced by the
/// discovered name.
pub async fn collect_memory_pools<S: ManagementSession>(
    session: &S,
) -> CollectResult<GroupOutcome> {
    let pools = session.memory_pools().await?;

    let mut table = MetricTable::new();
    for pool in &pools.items {
        debug!(pool = %pool.name, "Discovered memory pool");
        table.insert(
            format!("Memory Pool {} - used", pool.name),
            pool.usage.used.to_string(),
        );
        table.insert(
            format!("Memory Pool {} - committed", pool.name),
            pool.usage.committed.to_string(),
        );
        table.insert(
            format!("Memory Pool {} - max", pool.name),
            pool.usage.max.to_string(),
        );
    }
    Ok(GroupOutcome::from_parts(table, pools.skipped))
}

/// Memory manager discovery hook: emits nothing yet
pub async fn collect_memory_managers<S: ManagementSession>(
    session: &S,
) -> CollectResult<GroupOutcome> {
    let managers = session.memory_managers().await?;
    for name in &managers.items {
        debug!(manager = %name, "Discovered memory manager");
    }
    Ok(GroupOutcome::from_parts(MetricTable::new(), managers.skipped))
}

/// Collect per-collector GC statistics
///
/// Emits count, cumulative time, and the derived average per
/// collection, `0.0000` when no collection has happened yet.
pub async fn collect_garbage_collectors<S: ManagementSession>(
    session: &S,
) -> CollectResult<GroupOutcome> {
    let collectors = session.garbage_collectors().await?;

    let mut table = MetricTable::new();
    for gc in &collectors.items {
        debug!(gc = %gc.name, "Discovered garbage collector");
        let avg = if gc.count > 0 {
            gc.time_ms as f64 / gc.count as f64
        } else {
            0.0
        };
        table.insert(format!("GC {} avg time", gc.name), format!("{:.4}", avg));
        table.insert(format!("GC {} count", gc.name), gc.count.to_string());
        table.insert(format!("GC {} time", gc.name), gc.time_ms.to_string());
    }
    Ok(GroupOutcome::from_parts(table, collectors.skipped))
}

/// Run every collector in sequence and merge the outputs
///
/// Any collector error is fatal for the run; per-item gaps are merged
/// in and logged here as a single degraded-visibility warning.
pub async fn collect_all<S: ManagementSession>(session: &S) -> CollectResult<MetricTable> {
    let groups = [
        ("threads", collect_threads(session).await?),
        ("memory", collect_memory(session).await?),
        ("classloading", collect_class_loading(session).await?),
        ("runtime", collect_runtime(session).await?),
        ("memory pools", collect_memory_pools(session).await?),
        ("memory managers", collect_memory_managers(session).await?),
        ("garbage collectors", collect_garbage_collectors(session).await?),
    ];

    let mut table = MetricTable::new();
    for (group, outcome) in groups {
        let skipped = outcome.skipped();
        if skipped > 0 {
            warn!(group, skipped, "Partial collection: some items were unavailable");
        }
        table.merge(outcome.into_table());
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollectorError;
    use crate::session::{
        CatalogueEntry, ClassLoadingCounts, Discovered, GcSample, MemorySnapshot, MemoryUsage,
        PoolSample, ThreadDetail,
    };
    use std::collections::{HashMap, HashSet};

    /// Test double standing in for a live Jolokia endpoint
    #[derive(Default)]
    struct FakeSession {
        thread_count: i64,
        thread_ids: Vec<i64>,
        details: HashMap<i64, ThreadDetail>,
        denied: HashSet<i64>,
        memory: Option<MemorySnapshot>,
        class_loading: Option<ClassLoadingCounts>,
        pools: Discovered<PoolSample>,
        managers: Discovered<String>,
        collectors: Discovered<GcSample>,
    }

    fn usage(used: i64, committed: i64, max: i64) -> MemoryUsage {
        MemoryUsage {
            used,
            committed,
            max,
        }
    }

    impl ManagementSession for FakeSession {
        async fn thread_count(&self) -> CollectResult<i64> {
            Ok(self.thread_count)
        }

        async fn thread_ids(&self) -> CollectResult<Vec<i64>> {
            Ok(self.thread_ids.clone())
        }

        async fn thread_detail(&self, tid: i64) -> CollectResult<ThreadDetail> {
            if self.denied.contains(&tid) {
                return Err(CollectorError::AccessDenied(format!("thread {}", tid)));
            }
            self.details.get(&tid).copied().ok_or_else(|| {
                CollectorError::UnexpectedValue {
                    mbean: "fake".to_string(),
                    detail: format!("no such thread {}", tid),
                }
            })
        }

        async fn memory(&self) -> CollectResult<MemorySnapshot> {
            Ok(self.memory.unwrap())
        }

        async fn class_loading(&self) -> CollectResult<ClassLoadingCounts> {
            Ok(self.class_loading.unwrap())
        }

        async fn vm_vendor(&self) -> CollectResult<String> {
            Ok("Fake Vendor Inc.".to_string())
        }

        async fn memory_pools(&self) -> CollectResult<Discovered<PoolSample>> {
            Ok(self.pools.clone())
        }

        async fn memory_managers(&self) -> CollectResult<Discovered<String>> {
            Ok(self.managers.clone())
        }

        async fn garbage_collectors(&self) -> CollectResult<Discovered<GcSample>> {
            Ok(self.collectors.clone())
        }

        async fn catalogue(&self) -> CollectResult<Vec<CatalogueEntry>> {
            Ok(vec![])
        }
    }

    fn detail(state: ThreadState, in_native: bool) -> ThreadDetail {
        ThreadDetail { state, in_native }
    }

    #[tokio::test]
    async fn test_thread_classification_and_unavailable() {
        let session = FakeSession {
            thread_count: 6,
            thread_ids: vec![1, 2, 3, 4, 5, 6],
            details: HashMap::from([
                (1, detail(ThreadState::Blocked, false)),
                (2, detail(ThreadState::Runnable, true)),
                (3, detail(ThreadState::Runnable, false)),
                (4, detail(ThreadState::Waiting, false)),
                // Timed-waiting lands in no bucket.
                (5, detail(ThreadState::TimedWaiting, false)),
            ]),
            denied: HashSet::from([6]),
            ..Default::default()
        };

        let table = collect_threads(&session).await.unwrap().into_table();
        assert_eq!(table.get("Thread count"), Some("6"));
        assert_eq!(table.get("Thread count - blocked"), Some("1"));
        assert_eq!(table.get("Thread count - runnable"), Some("2"));
        assert_eq!(table.get("Thread count - waiting"), Some("1"));
        assert_eq!(table.get("Thread count - unavailable"), Some("1"));
        assert_eq!(table.get("Thread count - in native"), Some("1"));

        // blocked + runnable + waiting + unavailable <= total
        assert!(1 + 2 + 1 + 1 <= 6);
    }

    #[tokio::test]
    async fn test_unavailable_thread_marks_group_partial() {
        let session = FakeSession {
            thread_count: 1,
            thread_ids: vec![7],
            denied: HashSet::from([7]),
            ..Default::default()
        };

        let outcome = collect_threads(&session).await.unwrap();
        assert_eq!(outcome.skipped(), 1);
    }

    #[tokio::test]
    async fn test_memory_keys() {
        let session = FakeSession {
            memory: Some(MemorySnapshot {
                heap: usage(52428800, 268435456, 4294967296),
                non_heap: usage(1000, 2000, -1),
            }),
            ..Default::default()
        };

        let table = collect_memory(&session).await.unwrap().into_table();
        assert_eq!(table.len(), 6);
        assert_eq!(table.get("Memory - heap memory - used"), Some("52428800"));
        assert_eq!(
            table.get("Memory - heap memory - committed"),
            Some("268435456")
        );
        assert_eq!(table.get("Memory - heap memory - max"), Some("4294967296"));
        assert_eq!(table.get("Memory - non-heap memory - max"), Some("-1"));
    }

    #[tokio::test]
    async fn test_class_loading_keys() {
        let session = FakeSession {
            class_loading: Some(ClassLoadingCounts {
                loaded: 1200,
                total_loaded: 1500,
                unloaded: 300,
            }),
            ..Default::default()
        };

        let table = collect_class_loading(&session).await.unwrap().into_table();
        assert_eq!(table.get("Classes - loaded"), Some("1200"));
        assert_eq!(table.get("Classes - total loaded"), Some("1500"));
        assert_eq!(table.get("Classes - unloaded"), Some("300"));
    }

    #[tokio::test]
    async fn test_runtime_emits_nothing() {
        let session = FakeSession::default();
        let table = collect_runtime(&session).await.unwrap().into_table();
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_memory_pool_keys_namespaced_by_discovered_name() {
        let session = FakeSession {
            pools: Discovered {
                items: vec![
                    PoolSample {
                        name: "Eden".to_string(),
                        usage: usage(100, 200, 300),
                    },
                    PoolSample {
                        name: "Old Gen".to_string(),
                        usage: usage(400, 500, 600),
                    },
                ],
                skipped: 0,
            },
            ..Default::default()
        };

        let table = collect_memory_pools(&session).await.unwrap().into_table();
        assert_eq!(table.len(), 6);
        assert_eq!(table.get("Memory Pool Eden - used"), Some("100"));
        assert_eq!(table.get("Memory Pool Eden - committed"), Some("200"));
        assert_eq!(table.get("Memory Pool Eden - max"), Some("300"));
        assert_eq!(table.get("Memory Pool Old Gen - used"), Some("400"));
    }

    #[tokio::test]
    async fn test_skipped_pool_marks_group_partial() {
        let session = FakeSession {
            pools: Discovered {
                items: vec![],
                skipped: 2,
            },
            ..Default::default()
        };

        let outcome = collect_memory_pools(&session).await.unwrap();
        assert_eq!(outcome.skipped(), 2);
    }

    #[tokio::test]
    async fn test_gc_average_is_time_over_count() {
        let session = FakeSession {
            collectors: Discovered {
                items: vec![GcSample {
                    name: "G1 Young Generation".to_string(),
                    count: 4,
                    time_ms: 1000,
                }],
                skipped: 0,
            },
            ..Default::default()
        };

        let table = collect_garbage_collectors(&session).await.unwrap().into_table();
        assert_eq!(table.get("GC G1 Young Generation count"), Some("4"));
        assert_eq!(table.get("GC G1 Young Generation time"), Some("1000"));
        assert_eq!(
            table.get("GC G1 Young Generation avg time"),
            Some("250.0000")
        );
    }

    #[tokio::test]
    async fn test_gc_zero_count_never_divides() {
        let session = FakeSession {
            collectors: Discovered {
                items: vec![GcSample {
                    name: "Idle".to_string(),
                    count: 0,
                    time_ms: 0,
                }],
                skipped: 0,
            },
            ..Default::default()
        };

        let table = collect_garbage_collectors(&session).await.unwrap().into_table();
        assert_eq!(table.get("GC Idle avg time"), Some("0.0000"));
    }

    #[tokio::test]
    async fn test_zero_gc_instances_produce_no_keys() {
        let session = FakeSession::default();
        let table = collect_garbage_collectors(&session).await.unwrap().into_table();
        // Absent keys, not zero-valued keys.
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_collect_all_merges_every_group() {
        let session = FakeSession {
            thread_count: 2,
            thread_ids: vec![1, 2],
            details: HashMap::from([
                (1, detail(ThreadState::Runnable, false)),
                (2, detail(ThreadState::Waiting, false)),
            ]),
            memory: Some(MemorySnapshot {
                heap: usage(1, 2, 3),
                non_heap: usage(4, 5, 6),
            }),
            class_loading: Some(ClassLoadingCounts {
                loaded: 10,
                total_loaded: 11,
                unloaded: 1,
            }),
            pools: Discovered {
                items: vec![PoolSample {
                    name: "Eden".to_string(),
                    usage: usage(7, 8, 9),
                }],
                skipped: 0,
            },
            managers: Discovered {
                items: vec!["CodeCacheManager".to_string()],
                skipped: 0,
            },
            collectors: Discovered {
                items: vec![GcSample {
                    name: "G1".to_string(),
                    count: 1,
                    time_ms: 5,
                }],
                skipped: 0,
            },
            ..Default::default()
        };

        let table = collect_all(&session).await.unwrap();
        // 6 thread keys + 6 memory + 3 classes + 3 pool + 3 gc
        assert_eq!(table.len(), 21);
        assert_eq!(table.get("GC G1 avg time"), Some("5.0000"));
    }
}
