//! Management session abstraction
//!
//! Collectors depend on the narrow [`ManagementSession`] trait instead of
//! raw Jolokia plumbing, so the whole pipeline can run against a test
//! double. [`JolokiaSession`] is the production implementation: each typed
//! query maps to one Jolokia read/exec against the platform MXBeans.

use serde_json::json;
use tracing::{debug, warn};

use crate::config::ProbeConfig;
use crate::error::{CollectorError, ProbeError};
use crate::jolokia::{AttributeValue, CollectResult, JolokiaClient, MBeanValue, ObjectName};

const THREADING_MBEAN: &str = "java.lang:type=Threading";
const MEMORY_MBEAN: &str = "java.lang:type=Memory";
const CLASS_LOADING_MBEAN: &str = "java.lang:type=ClassLoading";
const RUNTIME_MBEAN: &str = "java.lang:type=Runtime";
const MEMORY_POOL_PATTERN: &str = "java.lang:type=MemoryPool,name=*";
const MEMORY_MANAGER_PATTERN: &str = "java.lang:type=MemoryManager,name=*";
const GARBAGE_COLLECTOR_PATTERN: &str = "java.lang:type=GarbageCollector,name=*";

/// Thread lifecycle state as reported by the remote VM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    New,
    Runnable,
    Blocked,
    Waiting,
    TimedWaiting,
    Terminated,
    /// A state string this probe does not know about
    Unknown,
}

impl ThreadState {
    /// Parse the `threadState` string from a ThreadInfo composite
    pub fn parse(s: &str) -> Self {
        match s {
            "NEW" => ThreadState::New,
            "RUNNABLE" => ThreadState::Runnable,
            "BLOCKED" => ThreadState::Blocked,
            "WAITING" => ThreadState::Waiting,
            "TIMED_WAITING" => ThreadState::TimedWaiting,
            "TERMINATED" => ThreadState::Terminated,
            _ => ThreadState::Unknown,
        }
    }
}

/// Detail for a single inspected thread
#[derive(Debug, Clone, Copy)]
pub struct ThreadDetail {
    pub state: ThreadState,
    pub in_native: bool,
}

/// used/committed/max triple for one memory region or pool, in bytes
#[derive(Debug, Clone, Copy)]
pub struct MemoryUsage {
    pub used: i64,
    pub committed: i64,
    pub max: i64,
}

/// Heap and non-heap usage from the Memory MXBean
#[derive(Debug, Clone, Copy)]
pub struct MemorySnapshot {
    pub heap: MemoryUsage,
    pub non_heap: MemoryUsage,
}

/// Counters from the ClassLoading MXBean
#[derive(Debug, Clone, Copy)]
pub struct ClassLoadingCounts {
    pub loaded: i64,
    pub total_loaded: i64,
    pub unloaded: i64,
}

/// One discovered memory pool
#[derive(Debug, Clone)]
pub struct PoolSample {
    pub name: String,
    pub usage: MemoryUsage,
}

/// One discovered garbage collector
#[derive(Debug, Clone)]
pub struct GcSample {
    pub name: String,
    pub count: i64,
    pub time_ms: i64,
}

/// One entry from the managed-object catalogue
#[derive(Debug, Clone)]
pub struct CatalogueEntry {
    pub object_name: String,
    pub class_name: String,
    pub description: String,
}

/// Result of a wildcard discovery query
///
/// `skipped` counts per-item entries that failed to resolve and were
/// recovered; the query itself succeeding with zero items is normal.
#[derive(Debug, Clone)]
pub struct Discovered<T> {
    pub items: Vec<T>,
    pub skipped: u64,
}

impl<T> Default for Discovered<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            skipped: 0,
        }
    }
}

impl<T> Discovered<T> {
    pub fn is_partial(&self) -> bool {
        self.skipped > 0
    }
}

/// Typed queries against the remote management endpoint
///
/// One implementation per transport; collectors never see anything
/// below this trait.
#[allow(async_fn_in_trait)]
pub trait ManagementSession {
    async fn thread_count(&self) -> CollectResult<i64>;
    async fn thread_ids(&self) -> CollectResult<Vec<i64>>;
    /// May fail per item; `AccessDenied` is the expected failure mode
    /// when the remote side lacks monitor permission for a thread.
    async fn thread_detail(&self, tid: i64) -> CollectResult<ThreadDetail>;
    async fn memory(&self) -> CollectResult<MemorySnapshot>;
    async fn class_loading(&self) -> CollectResult<ClassLoadingCounts>;
    async fn vm_vendor(&self) -> CollectResult<String>;
    async fn memory_pools(&self) -> CollectResult<Discovered<PoolSample>>;
    async fn memory_managers(&self) -> CollectResult<Discovered<String>>;
    async fn garbage_collectors(&self) -> CollectResult<Discovered<GcSample>>;
    async fn catalogue(&self) -> CollectResult<Vec<CatalogueEntry>>;
}

/// Production session over a Jolokia HTTP endpoint
pub struct JolokiaSession {
    client: JolokiaClient,
}

impl JolokiaSession {
    /// Establish a session against the configured endpoint
    ///
    /// Issues a Jolokia `version` request so that transport and auth
    /// failures abort the run before any metric is collected.
    pub async fn connect(config: &ProbeConfig) -> Result<Self, ProbeError> {
        let url = config.endpoint_url()?;
        let mut client = JolokiaClient::new(url.as_str(), config.timeout_ms)?;
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            client = client.with_auth(username, password);
        }

        client
            .check_version()
            .await
            .map_err(|e| ProbeError::Connection(format!("{}: {}", url, e)))?;

        debug!(endpoint = %url, "Management session established");
        Ok(Self { client })
    }

    /// Wrap an existing client, skipping the connectivity check
    ///
    /// Used by integration tests that drive a mock endpoint directly.
    pub fn from_client(client: JolokiaClient) -> Self {
        Self { client }
    }

    async fn read_usage(&self, mbean: &str, attribute: &str) -> CollectResult<MemoryUsage> {
        let value = self
            .client
            .read_attribute(mbean, Some(attribute))
            .await?
            .into_value(mbean)?;
        match &value {
            MBeanValue::Composite(map) => usage_from_attrs(map, mbean),
            _ => Err(CollectorError::UnexpectedValue {
                mbean: mbean.to_string(),
                detail: format!("{} is not a composite", attribute),
            }),
        }
    }

    /// Run a wildcard read and hand each entry to `each`, recovering
    /// per-item failures into the skipped count.
    async fn discover<T>(
        &self,
        pattern: &str,
        attribute: Option<&str>,
        mut each: impl FnMut(ObjectName, &std::collections::HashMap<String, AttributeValue>) -> CollectResult<T>,
    ) -> CollectResult<Discovered<T>> {
        let value = self
            .client
            .read_attribute(pattern, attribute)
            .await?
            .into_value(pattern)?;

        let entries = match value {
            MBeanValue::Wildcard(map) => map,
            // No instances matched the pattern; legitimately empty.
            MBeanValue::Composite(map) if map.is_empty() => Default::default(),
            MBeanValue::Null => Default::default(),
            _ => {
                return Err(CollectorError::UnexpectedValue {
                    mbean: pattern.to_string(),
                    detail: "wildcard read returned a non-object value".to_string(),
                })
            }
        };

        let mut discovered = Discovered::default();
        for (object_name, attrs) in &entries {
            let item = ObjectName::parse(object_name).and_then(|name| each(name, attrs));
            match item {
                Ok(item) => discovered.items.push(item),
                Err(e) => {
                    warn!(object_name = %object_name, error = %e, "Skipping unresolvable instance");
                    discovered.skipped += 1;
                }
            }
        }
        Ok(discovered)
    }
}

fn attr_i64(
    attrs: &std::collections::HashMap<String, AttributeValue>,
    key: &str,
    mbean: &str,
) -> CollectResult<i64> {
    attrs
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| CollectorError::UnexpectedValue {
            mbean: mbean.to_string(),
            detail: format!("missing integer attribute {}", key),
        })
}

fn usage_from_attrs(
    attrs: &std::collections::HashMap<String, AttributeValue>,
    mbean: &str,
) -> CollectResult<MemoryUsage> {
    Ok(MemoryUsage {
        used: attr_i64(attrs, "used", mbean)?,
        committed: attr_i64(attrs, "committed", mbean)?,
        max: attr_i64(attrs, "max", mbean)?,
    })
}

impl ManagementSession for JolokiaSession {
    async fn thread_count(&self) -> CollectResult<i64> {
        let value = self
            .client
            .read_attribute(THREADING_MBEAN, Some("ThreadCount"))
            .await?
            .into_value(THREADING_MBEAN)?;
        value.as_i64().ok_or_else(|| CollectorError::UnexpectedValue {
            mbean: THREADING_MBEAN.to_string(),
            detail: "ThreadCount is not an integer".to_string(),
        })
    }

    async fn thread_ids(&self) -> CollectResult<Vec<i64>> {
        let value = self
            .client
            .read_attribute(THREADING_MBEAN, Some("AllThreadIds"))
            .await?
            .into_value(THREADING_MBEAN)?;
        value
            .as_i64_array()
            .ok_or_else(|| CollectorError::UnexpectedValue {
                mbean: THREADING_MBEAN.to_string(),
                detail: "AllThreadIds is not an integer array".to_string(),
            })
    }

    async fn thread_detail(&self, tid: i64) -> CollectResult<ThreadDetail> {
        let value = self
            .client
            .exec_operation(THREADING_MBEAN, "getThreadInfo(long)", vec![json!(tid)])
            .await?
            .into_value(THREADING_MBEAN)?;
        let attrs = match &value {
            MBeanValue::Composite(map) => map,
            // The thread exited between enumeration and inspection.
            MBeanValue::Null => {
                return Err(CollectorError::UnexpectedValue {
                    mbean: THREADING_MBEAN.to_string(),
                    detail: format!("thread {} no longer alive", tid),
                })
            }
            _ => {
                return Err(CollectorError::UnexpectedValue {
                    mbean: THREADING_MBEAN.to_string(),
                    detail: "getThreadInfo did not return a composite".to_string(),
                })
            }
        };

        let state = attrs
            .get("threadState")
            .and_then(|v| v.as_string())
            .map(|s| ThreadState::parse(&s))
            .ok_or_else(|| CollectorError::UnexpectedValue {
                mbean: THREADING_MBEAN.to_string(),
                detail: "ThreadInfo is missing threadState".to_string(),
            })?;
        let in_native = attrs
            .get("inNative")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        Ok(ThreadDetail { state, in_native })
    }

    async fn memory(&self) -> CollectResult<MemorySnapshot> {
        let heap = self.read_usage(MEMORY_MBEAN, "HeapMemoryUsage").await?;
        let non_heap = self.read_usage(MEMORY_MBEAN, "NonHeapMemoryUsage").await?;
        Ok(MemorySnapshot { heap, non_heap })
    }

    async fn class_loading(&self) -> CollectResult<ClassLoadingCounts> {
        let value = self
            .client
            .read_attribute(CLASS_LOADING_MBEAN, None)
            .await?
            .into_value(CLASS_LOADING_MBEAN)?;
        let attrs = match &value {
            MBeanValue::Composite(map) => map,
            _ => {
                return Err(CollectorError::UnexpectedValue {
                    mbean: CLASS_LOADING_MBEAN.to_string(),
                    detail: "ClassLoading read did not return attributes".to_string(),
                })
            }
        };
        Ok(ClassLoadingCounts {
            loaded: attr_i64(attrs, "LoadedClassCount", CLASS_LOADING_MBEAN)?,
            total_loaded: attr_i64(attrs, "TotalLoadedClassCount", CLASS_LOADING_MBEAN)?,
            unloaded: attr_i64(attrs, "UnloadedClassCount", CLASS_LOADING_MBEAN)?,
        })
    }

    async fn vm_vendor(&self) -> CollectResult<String> {
        let value = self
            .client
            .read_attribute(RUNTIME_MBEAN, Some("VmVendor"))
            .await?
            .into_value(RUNTIME_MBEAN)?;
        match value {
            MBeanValue::String(s) => Ok(s),
            _ => Err(CollectorError::UnexpectedValue {
                mbean: RUNTIME_MBEAN.to_string(),
                detail: "VmVendor is not a string".to_string(),
            }),
        }
    }

    async fn memory_pools(&self) -> CollectResult<Discovered<PoolSample>> {
        self.discover(MEMORY_POOL_PATTERN, Some("Usage"), |name, attrs| {
            let pool_name = name
                .instance_name()
                .ok_or_else(|| CollectorError::InvalidObjectName(name.domain.clone()))?
                .to_string();
            let usage = match attrs.get("Usage") {
                Some(AttributeValue::Object(map)) => usage_from_attrs(map, MEMORY_POOL_PATTERN)?,
                _ => {
                    return Err(CollectorError::UnexpectedValue {
                        mbean: MEMORY_POOL_PATTERN.to_string(),
                        detail: format!("pool {} has no Usage composite", pool_name),
                    })
                }
            };
            Ok(PoolSample {
                name: pool_name,
                usage,
            })
        })
        .await
    }

    async fn memory_managers(&self) -> CollectResult<Discovered<String>> {
        self.discover(MEMORY_MANAGER_PATTERN, Some("Name"), |name, _attrs| {
            name.instance_name()
                .map(|s| s.to_string())
                .ok_or_else(|| CollectorError::InvalidObjectName(name.domain.clone()))
        })
        .await
    }

    async fn garbage_collectors(&self) -> CollectResult<Discovered<GcSample>> {
        self.discover(GARBAGE_COLLECTOR_PATTERN, None, |name, attrs| {
            let gc_name = name
                .instance_name()
                .ok_or_else(|| CollectorError::InvalidObjectName(name.domain.clone()))?
                .to_string();
            Ok(GcSample {
                count: attr_i64(attrs, "CollectionCount", GARBAGE_COLLECTOR_PATTERN)?,
                time_ms: attr_i64(attrs, "CollectionTime", GARBAGE_COLLECTOR_PATTERN)?,
                name: gc_name,
            })
        })
        .await
    }

    async fn catalogue(&self) -> CollectResult<Vec<CatalogueEntry>> {
        let value = self
            .client
            .list_mbeans()
            .await?
            .into_value("(list)")?;
        let domains = match value {
            MBeanValue::Composite(map) => map,
            MBeanValue::Null => Default::default(),
            _ => {
                return Err(CollectorError::UnexpectedValue {
                    mbean: "(list)".to_string(),
                    detail: "list request did not return a domain tree".to_string(),
                })
            }
        };

        // Jolokia list tree: domain -> property list -> { class, desc, ... }
        let mut entries = Vec::new();
        for (domain, beans) in &domains {
            let beans = match beans {
                AttributeValue::Object(map) => map,
                _ => continue,
            };
            for (props, info) in beans {
                let info = match info {
                    AttributeValue::Object(map) => map,
                    _ => continue,
                };
                entries.push(CatalogueEntry {
                    object_name: format!("{}:{}", domain, props),
                    class_name: info
                        .get("class")
                        .and_then(|v| v.as_string())
                        .unwrap_or_default(),
                    description: info
                        .get("desc")
                        .and_then(|v| v.as_string())
                        .unwrap_or_default(),
                });
            }
        }
        entries.sort_by(|a, b| a.object_name.cmp(&b.object_name));
        Ok(entries)
    }
}
