use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Model-quality figures shown on the metric cards.
///
/// These are a fixture, not a measurement: only `last_updated` changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub last_updated: DateTime<Utc>,
}

impl ModelMetrics {
    pub fn current() -> Self {
        Self {
            accuracy: 0.94,
            precision: 0.91,
            recall: 0.89,
            f1_score: 0.90,
            last_updated: Utc::now(),
        }
    }

    /// `(label, value)` pairs in card order.
    pub fn cards(&self) -> [(&'static str, f64); 4] {
        [
            ("Accuracy", self.accuracy),
            ("Precision", self.precision),
            ("Recall", self.recall),
            ("F1 Score", self.f1_score),
        ]
    }
}

/// Render a ratio as a one-decimal percentage, e.g. `94.0%`.
pub fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_wire_shape() {
        let v = serde_json::to_value(ModelMetrics::current()).unwrap();
        assert_eq!(v["f1Score"], 0.90);
        assert!(v["lastUpdated"].is_string());
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0.94), "94.0%");
        assert_eq!(percent(0.891), "89.1%");
    }
}
