use crate::export::csv::yes_no;
use crate::telemetry::LogEntry;
use chrono::{DateTime, Utc};

const TITLE: &str = "Anomaly Detection - Log Export";
const MESSAGE_WIDTH: usize = 40;

/// Fixed-width text report of a page of logs.
pub fn to_report(logs: &[LogEntry], total: usize, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str(TITLE);
    out.push('\n');
    out.push_str(&format!(
        "Generated: {} | Showing {} of {} logs\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        logs.len(),
        total
    ));
    out.push_str(&format!(
        "{:<16} | {:<7} | {:<12} | {:<43} | Anomaly\n",
        "Timestamp", "Level", "Source", "Message"
    ));
    out.push_str(&format!("{:-<16}-|-{:-<7}-|-{:-<12}-|-{:-<43}-|-{:-<7}\n", "", "", "", "", ""));

    for log in logs {
        out.push_str(&format!(
            "{:<16} | {:<7} | {:<12} | {:<43} | {}\n",
            log.timestamp.format("%Y-%m-%d %H:%M"),
            log.level,
            log.source,
            truncate(&log.message),
            yes_no(log.is_anomaly)
        ));
    }
    out
}

/// First 40 characters, with `...` appended when anything was cut.
fn truncate(message: &str) -> String {
    if message.chars().count() > MESSAGE_WIDTH {
        let head: String = message.chars().take(MESSAGE_WIDTH).collect();
        format!("{}...", head)
    } else {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::LogLevel;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short"), "short");
        let long = "x".repeat(45);
        assert_eq!(truncate(&long), format!("{}...", "x".repeat(40)));
        assert_eq!(truncate(&"y".repeat(40)), "y".repeat(40));
    }

    #[test]
    fn test_report_header() {
        let logs = vec![LogEntry {
            id: "log-1".into(),
            timestamp: Utc::now(),
            level: LogLevel::Warning,
            message: "Rate limit exceeded".into(),
            source: "api-gateway".into(),
            is_anomaly: false,
        }];
        let report = to_report(&logs, 57, Utc::now());
        let mut lines = report.lines();
        assert_eq!(lines.next(), Some(TITLE));
        assert!(lines.next().unwrap().ends_with("| Showing 1 of 57 logs"));
        assert!(report.contains("Rate limit exceeded"));
        assert!(report.trim_end().ends_with("No"));
    }
}
