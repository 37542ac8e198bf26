//! Artificial round-trip latency for the mock services.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delays applied before a mock call answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyProfile {
    /// Delay for paginated log queries, in milliseconds.
    pub logs_ms: u64,
    /// Delay for every other call, in milliseconds.
    pub default_ms: u64,
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self {
            logs_ms: 300,
            default_ms: 200,
        }
    }
}

impl LatencyProfile {
    /// No artificial delay at all.
    pub fn none() -> Self {
        Self {
            logs_ms: 0,
            default_ms: 0,
        }
    }

    pub(crate) async fn logs(&self) {
        pause(self.logs_ms).await;
    }

    pub(crate) async fn default_call(&self) {
        pause(self.default_ms).await;
    }
}

async fn pause(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_default_delays() {
        let profile = LatencyProfile::default();

        let start = Instant::now();
        profile.logs().await;
        assert!(start.elapsed() >= Duration::from_millis(300));

        let start = Instant::now();
        profile.default_call().await;
        assert!(start.elapsed() >= Duration::from_millis(200));
        assert!(start.elapsed() < Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_none_does_not_sleep() {
        let start = Instant::now();
        LatencyProfile::none().logs().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
