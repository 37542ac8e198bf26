//! Simulated live log feed.
//!
//! Each subscription owns a tokio task that ticks on its own interval and,
//! with ~30% probability per tick, hands a synthetic entry to the callback.

pub mod feed;

pub use self::feed::RecentFeed;

use crate::telemetry::{LogEntry, LogLevel};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2000);

/// A tick emits only when its draw exceeds this.
const EMIT_THRESHOLD: f64 = 0.7;
const ANOMALY_THRESHOLD: f64 = 0.95;

const SOURCES: [&str; 3] = ["auth-service", "api-gateway", "ml-pipeline"];
const MESSAGES: [&str; 3] = ["New log entry", "Event processed", "Check completed"];

/// Hands out subscriptions to the simulated feed.
#[derive(Debug, Clone)]
pub struct RealtimeEmitter {
    seeds: Arc<Mutex<StdRng>>,
}

impl Default for RealtimeEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeEmitter {
    pub fn new() -> Self {
        Self {
            seeds: Arc::new(Mutex::new(StdRng::from_entropy())),
        }
    }

    /// Every subscription draws its RNG seed from this one.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seeds: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    /// Start a feed that invokes `callback` for each emitted entry.
    ///
    /// The first emission opportunity is one `interval` after subscribing.
    /// Must be called from within a tokio runtime. The callback must not
    /// unsubscribe its own subscription.
    pub fn subscribe<F>(&self, callback: F, interval: Duration) -> Subscription
    where
        F: FnMut(LogEntry) + Send + 'static,
    {
        let seed = self
            .seeds
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .gen::<u64>();
        let interval = interval.max(Duration::from_millis(1));
        let gate = Arc::new(Mutex::new(true));
        let token = CancellationToken::new();

        debug!(interval_ms = interval.as_millis() as u64, "Realtime subscription started");
        let task = tokio::spawn(run_feed(
            StdRng::seed_from_u64(seed),
            interval,
            callback,
            gate.clone(),
            token.clone(),
        ));

        Subscription {
            gate,
            token,
            task: Some(task),
        }
    }

    /// Subscribe into a bounded channel of `capacity` entries.
    ///
    /// When the receiver falls behind, new entries are dropped rather than
    /// queued. Dropping the receiver does not unsubscribe; drop the
    /// `Subscription` for that.
    pub fn subscribe_buffered(
        &self,
        interval: Duration,
        capacity: usize,
    ) -> (Subscription, mpsc::Receiver<LogEntry>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let subscription = self.subscribe(
            move |entry| {
                if let Err(mpsc::error::TrySendError::Full(dropped)) = tx.try_send(entry) {
                    trace!(id = %dropped.id, "Receiver lagging, realtime entry dropped");
                }
            },
            interval,
        );
        (subscription, rx)
    }
}

async fn run_feed<F>(
    mut rng: StdRng,
    interval: Duration,
    mut callback: F,
    gate: Arc<Mutex<bool>>,
    shutdown: CancellationToken,
) where
    F: FnMut(LogEntry) + Send + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    let mut seq: u64 = 0;
    loop {
        tokio::select! {
            biased;
            () = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                if rng.gen::<f64>() <= EMIT_THRESHOLD {
                    continue;
                }
                seq += 1;
                let entry = synthesize(&mut rng, Utc::now(), seq);

                let open = gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                if !*open {
                    break;
                }
                trace!(id = %entry.id, level = %entry.level, "Realtime entry emitted");
                callback(entry);
            }
        }
    }
    debug!("Realtime subscription stopped");
}

/// Build one live entry. The id is derived from the emission time.
fn synthesize<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>, seq: u64) -> LogEntry {
    let level = LogLevel::ALL[rng.gen_range(0..LogLevel::ALL.len())];
    let message = MESSAGES[rng.gen_range(0..MESSAGES.len())];
    let source = SOURCES[rng.gen_range(0..SOURCES.len())];
    let is_anomaly = rng.gen::<f64>() > ANOMALY_THRESHOLD;

    LogEntry {
        id: format!("realtime-{}-{}", now.timestamp_millis(), seq),
        timestamp: now,
        level,
        message: message.to_string(),
        source: source.to_string(),
        is_anomaly,
    }
}

/// Handle to a running feed. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    gate: Arc<Mutex<bool>>,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Stop the feed. Once this returns the callback will not run again,
    /// even for a tick that was already due. Calling it twice is a no-op.
    pub fn unsubscribe(&mut self) {
        {
            let mut open = self.gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            *open = false;
        }
        self.token.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        *self.gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
