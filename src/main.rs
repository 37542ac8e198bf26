use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use anomalyscope::config::{AppConfig, LogFormat, LoggingConfig};
use anomalyscope::export::{self, ExportFormat};
use anomalyscope::insight::{metrics::percent, InsightService};
use anomalyscope::query::{LogQuery, QueryService};
use anomalyscope::realtime::RealtimeEmitter;
use anomalyscope::telemetry::LogEntry;

/// Entries held for the terminal before the live feed starts dropping.
const TAIL_BUFFER: usize = 64;

#[derive(Parser)]
#[command(
    name = "anomalyscope",
    about = "Mock telemetry backend for an anomaly-detection log dashboard",
    version,
    long_about = None
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed the synthetic data generators (overrides the config file)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Bind address (overrides the config file)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Query the synthetic log corpus
    Logs {
        #[arg(long, default_value = "1")]
        page: usize,

        #[arg(long, default_value = "20")]
        limit: usize,

        /// Case-insensitive substring of message or source
        #[arg(long, default_value = "")]
        search: String,

        /// Exact level: info, warning or error
        #[arg(long, default_value = "")]
        level: String,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// List anomaly alerts
    Alerts {
        #[arg(long)]
        json: bool,
    },

    /// Show model-quality metrics
    Metrics {
        #[arg(long)]
        json: bool,
    },

    /// Show the anomaly trend for the last N days
    Trend {
        /// Window length, at most 366
        #[arg(long, default_value = "7")]
        days: usize,

        #[arg(long)]
        json: bool,
    },

    /// Show an aggregate distribution: levels, severity or sources
    Distribution {
        kind: String,

        #[arg(long)]
        json: bool,
    },

    /// Follow the simulated realtime log feed
    Tail {
        /// Stop after this many entries
        #[arg(long, default_value = "10")]
        count: usize,

        /// Tick interval in milliseconds (overrides the config file)
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// Export a page of logs to a file
    Export {
        /// Export format: csv or report
        #[arg(long, default_value = "csv")]
        format: String,

        /// Directory to write into
        #[arg(long, default_value = ".")]
        output: PathBuf,

        #[arg(long, default_value = "1")]
        page: usize,

        #[arg(long, default_value = "20")]
        limit: usize,

        #[arg(long, default_value = "")]
        search: String,

        #[arg(long, default_value = "")]
        level: String,
    },
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The logging section is not known until the config resolves, so any
    // fallback warnings go through a temporary stderr subscriber.
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    let mut config = tracing::subscriber::with_default(bootstrap, || {
        AppConfig::resolve(cli.config.as_deref())
    })?;
    if cli.seed.is_some() {
        config.telemetry.seed = cli.seed;
    }
    init_tracing(&config.logging);

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            tracing::info!(bind = %config.server.bind, "Starting anomalyscope daemon");
            anomalyscope::serve(&config).await?;
        }
        Commands::Logs {
            page,
            limit,
            search,
            level,
            json,
        } => {
            let q = LogQuery {
                page,
                limit,
                search,
                level,
            };
            let result = query_service(&config).get_logs(&q).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_log_table(&result.logs);
                println!(
                    "\nPage {} of {} ({} total)",
                    page.max(1),
                    result.total_pages(limit),
                    result.total
                );
            }
        }
        Commands::Alerts { json } => {
            let alerts = query_service(&config).get_alerts().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&alerts)?);
            } else {
                println!("{:<4} | {:<8} | {:<20} | {:<9} | Message", "ID", "Severity", "Time", "Status");
                println!("{:-<4}-|-{:-<8}-|-{:-<20}-|-{:-<9}-|-{:-<40}", "", "", "", "", "");
                for a in &alerts {
                    let status = if a.resolved { "resolved" } else { "open" };
                    println!(
                        "{:<4} | {:<8} | {:<20} | {:<9} | {}",
                        a.id,
                        a.severity,
                        a.timestamp.format("%Y-%m-%d %H:%M:%S"),
                        status,
                        a.message
                    );
                }
            }
        }
        Commands::Metrics { json } => {
            let metrics = insight_service(&config).get_model_metrics().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            } else {
                println!("\n=== Model Metrics ===");
                for (label, value) in metrics.cards() {
                    println!("{:<10} : {}", label, percent(value));
                }
                println!("Updated    : {}", metrics.last_updated.to_rfc3339());
            }
        }
        Commands::Trend { days, json } => {
            let points = insight_service(&config).get_anomaly_trend(days).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&points)?);
            } else {
                println!("{:<10} | {:>5} | Severity", "Date", "Count");
                println!("{:-<10}-|-{:->5}-|-{:-<8}", "", "", "");
                for p in &points {
                    println!("{:<10} | {:>5} | {}", p.date, p.count, p.severity);
                }
            }
        }
        Commands::Distribution { kind, json } => {
            let svc = query_service(&config);
            let rows: Vec<(String, usize)> = match kind.as_str() {
                "levels" => svc
                    .get_log_level_distribution()
                    .await
                    .into_iter()
                    .map(|d| (d.name, d.value))
                    .collect(),
                "severity" => svc
                    .get_severity_distribution()
                    .await
                    .into_iter()
                    .map(|d| (d.name, d.count))
                    .collect(),
                "sources" => svc
                    .get_source_distribution()
                    .await
                    .into_iter()
                    .map(|d| (d.name, d.count))
                    .collect(),
                other => anyhow::bail!(
                    "unknown distribution '{}' (expected levels, severity or sources)",
                    other
                ),
            };
            if json {
                let value: Vec<_> = rows
                    .iter()
                    .map(|(name, count)| serde_json::json!({ "name": name, "count": count }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                for (name, count) in rows {
                    println!("{:<14} : {}", name, count);
                }
            }
        }
        Commands::Tail { count, interval_ms } => {
            let interval = interval_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| config.realtime.interval());
            let emitter = match config.telemetry.seed {
                Some(seed) => RealtimeEmitter::with_seed(seed),
                None => RealtimeEmitter::new(),
            };

            let (mut subscription, mut rx) = emitter.subscribe_buffered(interval, TAIL_BUFFER);
            tracing::info!(interval_ms = interval.as_millis() as u64, count, "Following realtime feed");

            let mut seen = 0;
            while seen < count {
                tokio::select! {
                    entry = rx.recv() => match entry {
                        Some(entry) => {
                            print_live(&entry);
                            seen += 1;
                        }
                        None => break,
                    },
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
            subscription.unsubscribe();
        }
        Commands::Export {
            format,
            output,
            page,
            limit,
            search,
            level,
        } => {
            let format: ExportFormat = format.parse()?;
            let q = LogQuery {
                page,
                limit,
                search,
                level,
            };
            let result = query_service(&config).get_logs(&q).await;
            std::fs::create_dir_all(&output)
                .with_context(|| format!("failed to create {}", output.display()))?;
            let path = export::write_export(&output, format, &result.logs, result.total)?;
            println!(
                "Exported {} of {} logs to {}",
                result.logs.len(),
                result.total,
                path.display()
            );
        }
    }

    Ok(())
}

fn query_service(config: &AppConfig) -> QueryService {
    QueryService::new(anomalyscope::build_store(config), config.latency)
}

fn insight_service(config: &AppConfig) -> InsightService {
    match config.telemetry.seed {
        Some(seed) => InsightService::with_seed(seed, config.latency),
        None => InsightService::new(config.latency),
    }
}

fn print_log_table(logs: &[LogEntry]) {
    println!(
        "{:<19} | {:<7} | {:<12} | {:<31} | Anomaly",
        "Timestamp", "Level", "Source", "Message"
    );
    println!("{:-<19}-|-{:-<7}-|-{:-<12}-|-{:-<31}-|-{:-<7}", "", "", "", "", "");
    for l in logs {
        println!(
            "{:<19} | {:<7} | {:<12} | {:<31} | {}",
            l.timestamp.format("%Y-%m-%d %H:%M:%S"),
            l.level,
            l.source,
            l.message,
            if l.is_anomaly { "yes" } else { "-" }
        );
    }
}

fn print_live(entry: &LogEntry) {
    let flag = if entry.is_anomaly { "  [ANOMALY]" } else { "" };
    println!(
        "{} {:<7} {:<12} {}{}",
        entry.timestamp.format("%H:%M:%S"),
        entry.level,
        entry.source,
        entry.message,
        flag
    );
}
