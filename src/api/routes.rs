//! API route definitions.

use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::header,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::{self, Stream};
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::ApiError;
use super::state::AppState;
use crate::export::ExportFormat;
use crate::insight::DEFAULT_TREND_DAYS;
use crate::query::{LogQuery, DEFAULT_LIMIT, DEFAULT_PAGE};
use crate::settings::SettingsUpdate;

/// Entries buffered per SSE client before new ones are dropped.
const STREAM_BUFFER: usize = 64;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/logs", get(list_logs))
        .route("/logs/export", get(export_logs))
        .route("/logs/stream", get(stream_logs))
        .route("/logs/recent", get(recent_logs))
        .route("/alerts", get(list_alerts))
        .route("/metrics", get(model_metrics))
        .route("/trend", get(anomaly_trend))
        .route("/distribution/levels", get(level_distribution))
        .route("/distribution/severity", get(severity_distribution))
        .route("/distribution/sources", get(source_distribution))
        .route("/settings", get(get_settings).put(put_settings))
        .route("/notifications", get(notifications))
        .route("/notifications/clear", post(clear_notifications))
}

async fn health() -> Json<Value> {
    Json(json!({
        "data": {
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION")
        },
        "meta": {
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "version": env!("CARGO_PKG_VERSION")
        }
    }))
}

async fn list_logs(State(state): State<AppState>, Query(query): Query<LogQuery>) -> Json<Value> {
    let page = state.query.get_logs(&query).await;
    let pages = page.total_pages(query.limit);
    Json(json!({
        "data": page,
        "meta": { "page": query.page.max(1), "limit": query.limit.max(1), "pages": pages }
    }))
}

#[derive(Debug, Deserialize)]
struct ExportParams {
    #[serde(default = "default_page")]
    page: usize,
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    search: String,
    #[serde(default)]
    level: String,
    #[serde(default = "default_format")]
    format: String,
}

fn default_page() -> usize {
    DEFAULT_PAGE
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_format() -> String {
    "csv".to_string()
}

async fn export_logs(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> Result<impl IntoResponse, ApiError> {
    let format: ExportFormat = params.format.parse()?;
    let query = LogQuery {
        page: params.page,
        limit: params.limit,
        search: params.search,
        level: params.level,
    };
    let page = state.query.get_logs(&query).await;
    let now = chrono::Utc::now();
    let body = format.render(&page.logs, page.total, now);
    let disposition = format!(
        "attachment; filename=\"{}\"",
        crate::export::export_file_name(format, now.date_naive())
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// One `log` event per emitted entry. The subscription lives as long as the
/// response stream, so a disconnecting client unsubscribes.
async fn stream_logs(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let (subscription, rx) = state
        .emitter
        .subscribe_buffered(state.realtime_interval, STREAM_BUFFER);

    let stream = stream::unfold((rx, subscription), |(mut rx, subscription)| async move {
        let entry = rx.recv().await?;
        let event = Event::default().event("log").id(entry.id.clone()).json_data(&entry);
        Some((event, (rx, subscription)))
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)).text("ping"))
}

async fn recent_logs(State(state): State<AppState>) -> Json<Value> {
    let (recent, waiting) = {
        let feed = state.feed.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        (feed.to_vec(), feed.is_empty())
    };
    Json(json!({ "data": recent, "meta": { "total": recent.len(), "waiting": waiting } }))
}

async fn list_alerts(State(state): State<AppState>) -> Json<Value> {
    let alerts = state.query.get_alerts().await;
    Json(json!({ "data": alerts, "meta": { "total": alerts.len() } }))
}

async fn model_metrics(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "data": state.insight.get_model_metrics().await }))
}

#[derive(Debug, Deserialize)]
struct TrendParams {
    days: Option<usize>,
}

async fn anomaly_trend(
    State(state): State<AppState>,
    Query(params): Query<TrendParams>,
) -> Result<Json<Value>, ApiError> {
    let days = params.days.unwrap_or(DEFAULT_TREND_DAYS);
    let points = state.insight.get_anomaly_trend(days).await?;
    Ok(Json(json!({ "data": points, "meta": { "days": days } })))
}

async fn level_distribution(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "data": state.query.get_log_level_distribution().await }))
}

async fn severity_distribution(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "data": state.query.get_severity_distribution().await }))
}

async fn source_distribution(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "data": state.query.get_source_distribution().await }))
}

async fn get_settings(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "data": state.settings.get() }))
}

async fn put_settings(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<Value>, ApiError> {
    let saved = state.settings.save(update)?;
    state.notifications.show_info("Settings saved");
    Ok(Json(json!({ "data": saved })))
}

async fn notifications(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "data": state.notifications.snapshot() }))
}

async fn clear_notifications(State(state): State<AppState>) -> Json<Value> {
    state.notifications.clear_unread();
    Json(json!({ "data": state.notifications.snapshot() }))
}
