//! Model-quality metrics and the synthetic anomaly trend.

pub mod metrics;
pub mod trend;

pub use self::metrics::ModelMetrics;
pub use self::trend::TrendPoint;

use crate::latency::LatencyProfile;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub const DEFAULT_TREND_DAYS: usize = 7;
/// Longest trend window served.
pub const MAX_TREND_DAYS: usize = 366;

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("trend window of {requested} days exceeds the maximum of {max}")]
    TrendTooLong { requested: usize, max: usize },
}

/// Serves metrics and trend data. Neither touches the telemetry store.
#[derive(Debug, Clone)]
pub struct InsightService {
    rng: Arc<Mutex<StdRng>>,
    latency: LatencyProfile,
}

impl InsightService {
    pub fn new(latency: LatencyProfile) -> Self {
        Self::with_rng(StdRng::from_entropy(), latency)
    }

    pub fn with_seed(seed: u64, latency: LatencyProfile) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), latency)
    }

    fn with_rng(rng: StdRng, latency: LatencyProfile) -> Self {
        Self {
            rng: Arc::new(Mutex::new(rng)),
            latency,
        }
    }

    /// Fixed values, stamped with the call time.
    pub async fn get_model_metrics(&self) -> ModelMetrics {
        self.latency.default_call().await;
        ModelMetrics::current()
    }

    /// `days` points ending today, oldest first. Counts are re-drawn on every call.
    ///
    /// Windows longer than [`MAX_TREND_DAYS`] are rejected before any work.
    pub async fn get_anomaly_trend(&self, days: usize) -> Result<Vec<TrendPoint>, InsightError> {
        if days > MAX_TREND_DAYS {
            return Err(InsightError::TrendTooLong {
                requested: days,
                max: MAX_TREND_DAYS,
            });
        }
        self.latency.default_call().await;
        let today = chrono::Utc::now().date_naive();
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(trend::anomaly_trend(&mut *rng, today, days))
    }
}
