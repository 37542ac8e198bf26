//! Synthetic telemetry -- log entries, alerts, and the in-memory store.

pub mod store;

pub use self::store::TelemetryStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Log level of a telemetry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub const ALL: [LogLevel; 3] = [LogLevel::Info, LogLevel::Warning, LogLevel::Error];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Severity of an anomaly alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    pub const ALL: [AlertSeverity; 4] = [
        AlertSeverity::Low,
        AlertSeverity::Medium,
        AlertSeverity::High,
        AlertSeverity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Low => "low",
            AlertSeverity::Medium => "medium",
            AlertSeverity::High => "high",
            AlertSeverity::Critical => "critical",
        }
    }

    /// Capitalized name used by the distribution charts.
    pub fn label(&self) -> &'static str {
        match self {
            AlertSeverity::Low => "Low",
            AlertSeverity::Medium => "Medium",
            AlertSeverity::High => "High",
            AlertSeverity::Critical => "Critical",
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A single log record. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub source: String,
    pub is_anomaly: bool,
}

/// An alert raised against a log entry.
///
/// `log_id` is a weak reference and is not validated against the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyAlert {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub severity: AlertSeverity,
    pub message: String,
    pub log_id: String,
    pub resolved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_entry_wire_shape() {
        let entry = LogEntry {
            id: "log-1".into(),
            timestamp: Utc::now(),
            level: LogLevel::Warning,
            message: "Cache miss".into(),
            source: "database".into(),
            is_anomaly: true,
        };
        let v = serde_json::to_value(&entry).unwrap();
        assert_eq!(v["level"], "warning");
        assert_eq!(v["isAnomaly"], true);
        assert!(v.get("is_anomaly").is_none());
    }

    #[test]
    fn test_alert_wire_shape() {
        let alert = AnomalyAlert {
            id: "1".into(),
            timestamp: Utc::now(),
            severity: AlertSeverity::Critical,
            message: "x".into(),
            log_id: "log-12".into(),
            resolved: false,
        };
        let v = serde_json::to_value(&alert).unwrap();
        assert_eq!(v["severity"], "critical");
        assert_eq!(v["logId"], "log-12");
    }
}
