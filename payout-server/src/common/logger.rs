//! Logging Infrastructure
//!
//! Structured logging setup for development and production:
//! - Daily rotating application logs (deleted after 14 days)
//! - Permanent audit logs (never deleted), a file mirror of the audit_log
//!   table for operators grepping without a DB session

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, prelude::*};

/// Clean up old application log files (older than 14 days)
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<()> {
    use chrono::{Local, TimeZone};

    let cutoff = Local::now() - chrono::Duration::days(14);

    let app_log_dir = log_dir.join("app");
    if app_log_dir.exists() {
        for entry in fs::read_dir(app_log_dir)? {
            let entry = entry?;
            let path = entry.path();

            if let Some(name) = path.file_name().and_then(|n| n.to_str())
                && name.starts_with("app-")
                && name.ends_with(".log")
                && let Some(date_part) = name
                    .strip_prefix("app-")
                    .and_then(|d| d.strip_suffix(".log"))
                && let Ok(naive_date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                && let Some(local_datetime) = Local
                    .from_local_datetime(&naive_date.and_hms_opt(0, 0, 0).unwrap())
                    .single()
                && local_datetime < cutoff
            {
                fs::remove_file(&path)?;
                tracing::info!(file = %name, "Deleted old log file");
            }
        }
    }

    Ok(())
}

/// Create the log subdirectories and the two rolling appenders
fn make_appenders(
    log_dir: &Path,
) -> anyhow::Result<(RollingFileAppender, RollingFileAppender)> {
    let app_log_dir = log_dir.join("app");
    let audit_log_dir = log_dir.join("audit");
    fs::create_dir_all(&app_log_dir)?;
    fs::create_dir_all(&audit_log_dir)?;

    let app_log = RollingFileAppender::new(Rotation::DAILY, app_log_dir, "app");
    let audit_log = RollingFileAppender::new(Rotation::DAILY, audit_log_dir, "audit");
    Ok((app_log, audit_log))
}

/// Initialize the logging system with daily rotating logs
///
/// # Arguments
/// * `level` - Log level (e.g., "info", "debug", "warn")
/// * `json_format` - JSON output (true for production, false for development)
/// * `log_dir` - Optional directory for file logging
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::registry().with(env_filter);

    if json_format {
        // JSON format for production
        let console_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(EnvFilter::new(level));

        if let Some(dir) = log_dir {
            let log_dir = Path::new(dir);
            let (app_log, audit_log) = make_appenders(log_dir)?;

            // Standard application logs (rotated daily, 14-day cleanup)
            let app_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_writer(std::sync::Mutex::new(app_log))
                .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                    meta.target() != "audit"
                }));

            // Permanent audit logs (never deleted)
            let audit_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_writer(std::sync::Mutex::new(audit_log))
                .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                    meta.target() == "audit"
                }));

            tokio::spawn(periodic_cleanup(log_dir.to_path_buf()));

            subscriber
                .with(console_layer)
                .with(app_layer)
                .with(audit_layer)
                .init();
        } else {
            subscriber.with(console_layer).init();
        }
    } else {
        // Pretty format for development
        let console_layer = fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(EnvFilter::new(level));

        if let Some(dir) = log_dir {
            let log_dir = Path::new(dir);
            let (app_log, audit_log) = make_appenders(log_dir)?;

            let app_layer = fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(app_log))
                .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                    meta.target() != "audit"
                }));

            let audit_layer = fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(audit_log))
                .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                    meta.target() == "audit"
                }));

            tokio::spawn(periodic_cleanup(log_dir.to_path_buf()));

            subscriber
                .with(console_layer)
                .with(app_layer)
                .with(audit_layer)
                .init();
        } else {
            subscriber.with(console_layer).init();
        }
    }

    Ok(())
}

/// Periodic cleanup task - runs every hour to clean old logs
async fn periodic_cleanup(log_dir: PathBuf) {
    use tokio::time::{Duration, sleep};

    loop {
        sleep(Duration::from_secs(3600)).await;

        if let Err(e) = cleanup_old_logs(&log_dir) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}

/// Initialize the logging system (console only)
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}

/// Audit log helper - records critical financial operations to the permanent
/// `audit-YYYY-MM-DD.log` stream (in addition to the audit_log table)
#[macro_export]
macro_rules! audit_log {
    ($action:expr, $resource:expr) => {
        tracing::info!(
            target: "audit",
            action = $action,
            resource = $resource,
            "AUDIT"
        );
    };
    ($action:expr, $resource:expr, $($key:ident = $value:expr),+) => {
        tracing::info!(
            target: "audit",
            action = $action,
            resource = $resource,
            $($key = $value),+,
            "AUDIT"
        );
    };
}
