//! Query service -- paginated log search and aggregate distributions.

pub mod distribution;

pub use self::distribution::{LevelCount, NamedCount};

use crate::latency::LatencyProfile;
use crate::telemetry::{AnomalyAlert, LogEntry, TelemetryStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 20;

/// Parameters of a log query. Empty strings disable the matching filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogQuery {
    pub page: usize,
    pub limit: usize,
    pub search: String,
    pub level: String,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            search: String::new(),
            level: String::new(),
        }
    }
}

impl LogQuery {
    pub fn page(page: usize, limit: usize) -> Self {
        Self {
            page,
            limit,
            ..Self::default()
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }
}

/// One page of filtered logs plus the filtered total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogPage {
    pub logs: Vec<LogEntry>,
    pub total: usize,
}

impl LogPage {
    /// Number of pages of `limit` entries needed to show `total`.
    pub fn total_pages(&self, limit: usize) -> usize {
        self.total.div_ceil(limit.max(1))
    }
}

/// Answers log and aggregate queries against the shared store.
#[derive(Debug, Clone)]
pub struct QueryService {
    store: Arc<TelemetryStore>,
    latency: LatencyProfile,
}

impl QueryService {
    pub fn new(store: Arc<TelemetryStore>, latency: LatencyProfile) -> Self {
        Self { store, latency }
    }

    /// Filter, count, then paginate. Filtering keeps the newest-first order.
    pub async fn get_logs(&self, query: &LogQuery) -> LogPage {
        self.latency.logs().await;
        let page = filter_logs(self.store.logs(), query);
        debug!(
            page = query.page,
            limit = query.limit,
            search = %query.search,
            level = %query.level,
            total = page.total,
            returned = page.logs.len(),
            "Log query"
        );
        page
    }

    pub async fn get_alerts(&self) -> Vec<AnomalyAlert> {
        self.latency.default_call().await;
        self.store.alerts().to_vec()
    }

    pub async fn get_log_level_distribution(&self) -> Vec<LevelCount> {
        self.latency.default_call().await;
        distribution::level_distribution(self.store.logs())
    }

    pub async fn get_severity_distribution(&self) -> Vec<NamedCount> {
        self.latency.default_call().await;
        distribution::severity_distribution(self.store.alerts())
    }

    pub async fn get_source_distribution(&self) -> Vec<NamedCount> {
        self.latency.default_call().await;
        distribution::source_distribution(self.store.logs())
    }
}

/// Apply search, then level, then slice out the requested page.
///
/// Out-of-range pages produce an empty slice. `page` and `limit` below 1
/// are treated as 1.
pub fn filter_logs(logs: &[LogEntry], query: &LogQuery) -> LogPage {
    let needle = query.search.to_lowercase();

    let filtered: Vec<&LogEntry> = logs
        .iter()
        .filter(|l| {
            needle.is_empty()
                || l.message.to_lowercase().contains(&needle)
                || l.source.to_lowercase().contains(&needle)
        })
        .filter(|l| query.level.is_empty() || l.level.as_str() == query.level)
        .collect();

    let total = filtered.len();
    let limit = query.limit.max(1);
    let start = (query.page.max(1) - 1).saturating_mul(limit);

    let logs = filtered
        .into_iter()
        .skip(start)
        .take(limit)
        .cloned()
        .collect();

    LogPage { logs, total }
}
