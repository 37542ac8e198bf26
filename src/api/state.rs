use crate::config::AppConfig;
use crate::insight::InsightService;
use crate::notify::NotificationCenter;
use crate::query::QueryService;
use crate::realtime::{RealtimeEmitter, RecentFeed, Subscription};
use crate::settings::SettingsStore;
use crate::telemetry::{LogLevel, TelemetryStore};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Everything the handlers share. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub query: QueryService,
    pub insight: InsightService,
    pub emitter: RealtimeEmitter,
    pub realtime_interval: Duration,
    pub feed: Arc<Mutex<RecentFeed>>,
    pub settings: SettingsStore,
    pub notifications: NotificationCenter,
}

impl AppState {
    /// Wire every service around one store.
    pub fn new(store: Arc<TelemetryStore>, config: &AppConfig, settings: SettingsStore) -> Self {
        let latency = config.latency;
        let (insight, emitter) = match config.telemetry.seed {
            Some(seed) => (
                InsightService::with_seed(seed, latency),
                RealtimeEmitter::with_seed(seed),
            ),
            None => (InsightService::new(latency), RealtimeEmitter::new()),
        };

        Self {
            query: QueryService::new(store, latency),
            insight,
            emitter,
            realtime_interval: config.realtime.interval(),
            feed: Arc::new(Mutex::new(RecentFeed::new(config.realtime.feed_capacity))),
            settings,
            notifications: NotificationCenter::new(),
        }
    }

    pub fn recent(&self) -> Vec<crate::telemetry::LogEntry> {
        self.feed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .to_vec()
    }

    /// Subscribe the dashboard's own view of the live feed: keep the recent
    /// window current and surface anomalies as unread notifications.
    pub fn watch_feed(&self) -> Subscription {
        let feed = self.feed.clone();
        let notifications = self.notifications.clone();
        let settings = self.settings.clone();

        self.emitter.subscribe(
            move |entry| {
                if entry.is_anomaly {
                    notifications.add_unread();
                    if settings.get().notifications {
                        notifications.show_toast(
                            format!("Anomaly from {}: {}", entry.source, entry.message),
                            LogLevel::Warning,
                        );
                    }
                }
                feed.lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .push(entry);
            },
            self.realtime_interval,
        )
    }
}
