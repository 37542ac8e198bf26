use crate::telemetry::{AlertSeverity, AnomalyAlert, LogEntry, LogLevel};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// Number of log entries in the bulk corpus.
pub const CORPUS_SIZE: usize = 100;

/// Spacing between consecutive corpus entries.
const CORPUS_SPACING_SECS: i64 = 60;

pub const SOURCES: [&str; 4] = ["auth-service", "api-gateway", "ml-pipeline", "database"];

pub const MESSAGES: [&str; 7] = [
    "User login successful",
    "Connection timeout",
    "Database query executed",
    "Anomaly detected in log pattern",
    "Rate limit exceeded",
    "Cache miss",
    "Request processed",
];

/// Base probability threshold: a draw above this marks any entry anomalous.
const ANOMALY_THRESHOLD: f64 = 0.9;
/// Second-chance threshold, only drawn for error-level entries.
const ERROR_ANOMALY_THRESHOLD: f64 = 0.5;

/// Read-only telemetry generated once at startup.
///
/// Logs are kept sorted newest-first; every query relies on that order.
#[derive(Debug, Clone)]
pub struct TelemetryStore {
    logs: Vec<LogEntry>,
    alerts: Vec<AnomalyAlert>,
}

impl TelemetryStore {
    /// Generate a fresh corpus stamped relative to `now`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Self {
        let logs = generate_logs(rng, now, CORPUS_SIZE);
        let alerts = generate_alerts(now);
        let anomalies = logs.iter().filter(|l| l.is_anomaly).count();
        info!(
            logs = logs.len(),
            alerts = alerts.len(),
            anomalies,
            "Generated synthetic telemetry"
        );
        Self::from_parts(logs, alerts)
    }

    /// Generate from the OS entropy source.
    pub fn random() -> Self {
        Self::generate(&mut StdRng::from_entropy(), Utc::now())
    }

    /// Generate reproducibly from a seed.
    pub fn with_seed(seed: u64) -> Self {
        debug!(seed, "Seeding telemetry generator");
        Self::generate(&mut StdRng::seed_from_u64(seed), Utc::now())
    }

    /// Build a store from existing collections. Logs are re-sorted newest-first.
    pub fn from_parts(mut logs: Vec<LogEntry>, alerts: Vec<AnomalyAlert>) -> Self {
        sort_newest_first(&mut logs);
        Self { logs, alerts }
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    pub fn alerts(&self) -> &[AnomalyAlert] {
        &self.alerts
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }
}

/// Stable sort, descending by timestamp.
pub fn sort_newest_first(logs: &mut [LogEntry]) {
    logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// Generate `count` entries spaced one minute apart counting back from `now`.
pub fn generate_logs<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>, count: usize) -> Vec<LogEntry> {
    let mut logs = Vec::with_capacity(count);

    for i in 0..count {
        let level = LogLevel::ALL[rng.gen_range(0..LogLevel::ALL.len())];
        let base_anomaly = rng.gen::<f64>() > ANOMALY_THRESHOLD;
        let message = MESSAGES[rng.gen_range(0..MESSAGES.len())];
        let source = SOURCES[rng.gen_range(0..SOURCES.len())];
        // The second draw only happens when the first one missed.
        let is_anomaly = base_anomaly
            || (level == LogLevel::Error && rng.gen::<f64>() > ERROR_ANOMALY_THRESHOLD);

        logs.push(LogEntry {
            id: format!("log-{}", i + 1),
            timestamp: now - Duration::seconds(i as i64 * CORPUS_SPACING_SECS),
            level,
            message: message.to_string(),
            source: source.to_string(),
            is_anomaly,
        });
    }

    sort_newest_first(&mut logs);
    logs
}

/// The fixed alert set.
pub fn generate_alerts(now: DateTime<Utc>) -> Vec<AnomalyAlert> {
    let alert = |id: &str, hours_ago: i64, severity, message: &str, log_id: &str, resolved| AnomalyAlert {
        id: id.to_string(),
        timestamp: now - Duration::hours(hours_ago),
        severity,
        message: message.to_string(),
        log_id: log_id.to_string(),
        resolved,
    };

    vec![
        alert("1", 0, AlertSeverity::High, "Unusual spike in error rate", "log-1", false),
        alert("2", 1, AlertSeverity::Medium, "Anomalous login pattern detected", "log-5", true),
        alert("3", 2, AlertSeverity::Critical, "Multiple failed authentication attempts", "log-12", false),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_corpus_shape() {
        let now = Utc::now();
        let store = TelemetryStore::generate(&mut StdRng::seed_from_u64(7), now);

        assert_eq!(store.len(), CORPUS_SIZE);
        assert_eq!(store.logs()[0].timestamp, now);
        assert_eq!(store.logs()[0].id, "log-1");
        assert_eq!(
            store.logs()[CORPUS_SIZE - 1].timestamp,
            now - Duration::seconds(99 * 60)
        );

        for pair in store.logs().windows(2) {
            assert!(pair[0].timestamp >= pair[1].timestamp);
        }

        let ids: HashSet<_> = store.logs().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids.len(), CORPUS_SIZE);
    }

    #[test]
    fn test_vocabulary() {
        let store = TelemetryStore::with_seed(11);
        for log in store.logs() {
            assert!(SOURCES.contains(&log.source.as_str()));
            assert!(MESSAGES.contains(&log.message.as_str()));
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let now = Utc::now();
        let a = TelemetryStore::generate(&mut StdRng::seed_from_u64(42), now);
        let b = TelemetryStore::generate(&mut StdRng::seed_from_u64(42), now);
        assert_eq!(a.logs(), b.logs());
    }

    #[test]
    fn test_from_parts_sorts() {
        let now = Utc::now();
        let mut logs = generate_logs(&mut StdRng::seed_from_u64(3), now, 10);
        logs.reverse();
        let store = TelemetryStore::from_parts(logs, Vec::new());
        assert_eq!(store.logs()[0].timestamp, now);
        for pair in store.logs().windows(2) {
            assert!(pair[0].timestamp >= pair[1].timestamp);
        }
    }

    #[test]
    fn test_error_entries_are_more_often_anomalous() {
        let mut rng = StdRng::seed_from_u64(2024);
        let logs = generate_logs(&mut rng, Utc::now(), 20_000);

        let rate = |pred: &dyn Fn(&LogEntry) -> bool| {
            let matching: Vec<_> = logs.iter().filter(|l| pred(l)).collect();
            let anomalous = matching.iter().filter(|l| l.is_anomaly).count();
            anomalous as f64 / matching.len() as f64
        };

        // 0.10 + 0.90 * 0.5 for errors, 0.10 otherwise.
        let error_rate = rate(&|l| l.level == LogLevel::Error);
        let other_rate = rate(&|l| l.level != LogLevel::Error);
        assert!((error_rate - 0.55).abs() < 0.03, "error rate {}", error_rate);
        assert!((other_rate - 0.10).abs() < 0.02, "other rate {}", other_rate);
    }

    #[test]
    fn test_fixed_alerts() {
        let now = Utc::now();
        let alerts = generate_alerts(now);
        assert_eq!(alerts.len(), 3);
        assert_eq!(alerts[0].severity, AlertSeverity::High);
        assert_eq!(alerts[1].timestamp, now - Duration::hours(1));
        assert!(alerts[1].resolved);
        assert_eq!(alerts[2].severity, AlertSeverity::Critical);
        assert_eq!(alerts[2].log_id, "log-12");
    }
}
