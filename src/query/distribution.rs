//! Aggregate counts for the dashboard charts.

use crate::telemetry::{AlertSeverity, AnomalyAlert, LogEntry, LogLevel};
use serde::{Deserialize, Serialize};

/// A level bucket with its chart colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCount {
    pub name: String,
    pub value: usize,
    pub fill: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCount {
    pub name: String,
    pub count: usize,
}

fn level_style(level: LogLevel) -> (&'static str, &'static str) {
    match level {
        LogLevel::Info => ("Info", "#22c55e"),
        LogLevel::Warning => ("Warning", "#f59e0b"),
        LogLevel::Error => ("Error", "#ef4444"),
    }
}

/// Always three buckets, zero counts included.
pub fn level_distribution(logs: &[LogEntry]) -> Vec<LevelCount> {
    LogLevel::ALL
        .iter()
        .map(|&level| {
            let (name, fill) = level_style(level);
            LevelCount {
                name: name.to_string(),
                value: logs.iter().filter(|l| l.level == level).count(),
                fill: fill.to_string(),
            }
        })
        .collect()
}

/// Always four buckets, zero counts included.
pub fn severity_distribution(alerts: &[AnomalyAlert]) -> Vec<NamedCount> {
    AlertSeverity::ALL
        .iter()
        .map(|&severity| NamedCount {
            name: severity.label().to_string(),
            count: alerts.iter().filter(|a| a.severity == severity).count(),
        })
        .collect()
}

/// One bucket per distinct source, in first-seen order.
pub fn source_distribution(logs: &[LogEntry]) -> Vec<NamedCount> {
    let mut buckets: Vec<NamedCount> = Vec::new();
    for log in logs {
        match buckets.iter_mut().find(|b| b.name == log.source) {
            Some(bucket) => bucket.count += 1,
            None => buckets.push(NamedCount {
                name: log.source.clone(),
                count: 1,
            }),
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::store::generate_alerts;
    use crate::telemetry::TelemetryStore;
    use chrono::Utc;
    use std::collections::HashSet;

    fn entry(id: &str, level: LogLevel, source: &str) -> LogEntry {
        LogEntry {
            id: id.into(),
            timestamp: Utc::now(),
            level,
            message: "Cache miss".into(),
            source: source.into(),
            is_anomaly: false,
        }
    }

    #[test]
    fn test_level_distribution_sums_to_corpus() {
        let store = TelemetryStore::with_seed(5);
        let dist = level_distribution(store.logs());
        assert_eq!(dist.len(), 3);
        assert_eq!(dist.iter().map(|d| d.value).sum::<usize>(), 100);
        let names: Vec<_> = dist.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["Info", "Warning", "Error"]);
    }

    #[test]
    fn test_level_distribution_keeps_zero_buckets() {
        let logs = vec![entry("a", LogLevel::Info, "db")];
        let dist = level_distribution(&logs);
        assert_eq!(dist.len(), 3);
        assert_eq!(dist[1].value, 0);
        assert_eq!(dist[2].fill, "#ef4444");
    }

    #[test]
    fn test_severity_distribution() {
        let dist = severity_distribution(&generate_alerts(Utc::now()));
        let counts: Vec<_> = dist.iter().map(|d| (d.name.as_str(), d.count)).collect();
        assert_eq!(
            counts,
            [("Low", 0), ("Medium", 1), ("High", 1), ("Critical", 1)]
        );
    }

    #[test]
    fn test_source_distribution_covers_distinct_sources() {
        let store = TelemetryStore::with_seed(5);
        let dist = source_distribution(store.logs());
        assert_eq!(dist.iter().map(|d| d.count).sum::<usize>(), 100);

        let present: HashSet<_> = store.logs().iter().map(|l| l.source.as_str()).collect();
        let reported: HashSet<_> = dist.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(present, reported);
        assert_eq!(dist.len(), present.len());
    }

    #[test]
    fn test_source_distribution_first_seen_order() {
        let logs = vec![
            entry("1", LogLevel::Info, "ml-pipeline"),
            entry("2", LogLevel::Info, "database"),
            entry("3", LogLevel::Error, "ml-pipeline"),
        ];
        let dist = source_distribution(&logs);
        assert_eq!(
            dist,
            vec![
                NamedCount { name: "ml-pipeline".into(), count: 2 },
                NamedCount { name: "database".into(), count: 1 },
            ]
        );
    }
}
