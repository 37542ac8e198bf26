use crate::telemetry::LogEntry;

const HEADER: [&str; 5] = ["Timestamp", "Level", "Source", "Message", "Anomaly"];

/// One header line plus one row per entry, newline separated.
///
/// Only the message is quoted; embedded quotes are doubled.
pub fn to_csv(logs: &[LogEntry]) -> String {
    let mut lines = Vec::with_capacity(logs.len() + 1);
    lines.push(HEADER.join(","));

    for log in logs {
        let row = [
            log.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            log.level.to_string(),
            log.source.clone(),
            format!("\"{}\"", log.message.replace('"', "\"\"")),
            yes_no(log.is_anomaly).to_string(),
        ];
        lines.push(row.join(","));
    }

    lines.join("\n")
}

pub(crate) fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::LogLevel;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_rows_and_quoting() {
        let logs = vec![LogEntry {
            id: "log-1".into(),
            timestamp: Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap(),
            level: LogLevel::Error,
            message: "said \"hi\", then left".into(),
            source: "api-gateway".into(),
            is_anomaly: true,
        }];

        let csv = to_csv(&logs);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "Timestamp,Level,Source,Message,Anomaly");
        assert_eq!(
            lines[1],
            "2024-02-03 04:05:06,error,api-gateway,\"said \"\"hi\"\", then left\",Yes"
        );
    }
}
