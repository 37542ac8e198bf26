//! Log export -- CSV and plain-text report rendering.

pub mod csv;
pub mod report;

use crate::telemetry::LogEntry;
use chrono::{DateTime, NaiveDate, Utc};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unknown export format '{0}' (expected csv or report)")]
    UnknownFormat(String),
    #[error("failed to write export to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Report,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Report => "txt",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Report => "text/plain; charset=utf-8",
        }
    }

    /// Render `logs`, a page out of `total` matching entries.
    pub fn render(&self, logs: &[LogEntry], total: usize, generated_at: DateTime<Utc>) -> String {
        match self {
            ExportFormat::Csv => csv::to_csv(logs),
            ExportFormat::Report => report::to_report(logs, total, generated_at),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "report" | "txt" | "text" => Ok(ExportFormat::Report),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

/// `anomaly-logs-YYYY-MM-DD.<ext>`
pub fn export_file_name(format: ExportFormat, date: NaiveDate) -> String {
    format!("anomaly-logs-{}.{}", date.format("%Y-%m-%d"), format.extension())
}

/// Render and write an export into `dir`, returning the written path.
pub fn write_export(
    dir: &Path,
    format: ExportFormat,
    logs: &[LogEntry],
    total: usize,
) -> Result<PathBuf, ExportError> {
    let now = Utc::now();
    let path = dir.join(export_file_name(format, now.date_naive()));
    std::fs::write(&path, format.render(logs, total, now)).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;
    tracing::info!(path = %path.display(), rows = logs.len(), "Exported logs");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("report".parse::<ExportFormat>().unwrap(), ExportFormat::Report);
        assert!(matches!(
            "pdf".parse::<ExportFormat>(),
            Err(ExportError::UnknownFormat(f)) if f == "pdf"
        ));
    }

    #[test]
    fn test_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 9).unwrap();
        assert_eq!(export_file_name(ExportFormat::Csv, date), "anomaly-logs-2024-05-09.csv");
        assert_eq!(export_file_name(ExportFormat::Report, date), "anomaly-logs-2024-05-09.txt");
    }

    #[test]
    fn test_write_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_export(dir.path(), ExportFormat::Csv, &[], 0).unwrap();
        let body = std::fs::read_to_string(path).unwrap();
        assert_eq!(body, "Timestamp,Level,Source,Message,Anomaly");
    }
}
