//! Logging system configuration and initialization
//!
//! - console output and an optional non-blocking file writer
//! - plain text or JSON file format
//! - local-time timestamps
//! - previous log file rotated on start-up, old ones pruned to `max_files`

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub use crate::infrastructure::config::LoggingConfig;
use crate::infrastructure::config::ConfigManager;

const LOG_FILE_NAME: &str = "car-listings.log";

/// Dependencies that drown the crawl logs below TRACE
const NOISY_TARGETS: &[&str] = &["reqwest", "hyper", "hyper_util", "h2", "html5ever", "selectors", "cookie_store"];

// Keeps the file writers alive for the whole process
static LOG_GUARDS: Lazy<Mutex<Vec<WorkerGuard>>> = Lazy::new(|| Mutex::new(Vec::new()));

struct LocalTimeFormatter;

impl FormatTime for LocalTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// `log_dir` from the config, else `logs/` under the app data directory
pub fn get_log_directory(config: &LoggingConfig) -> PathBuf {
    if let Some(dir) = &config.log_dir {
        return dir.clone();
    }
    ConfigManager::get_app_data_dir()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_default())
        .join("logs")
}

/// Initialize the logging system with default configuration
pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LoggingConfig::default())
}

/// `RUST_LOG` wins over the configured level when set.
pub fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let level = config.level.to_lowercase();
    let mut filter = EnvFilter::try_new(&level)
        .with_context(|| format!("Invalid log level '{}'", config.level))?;

    if level != "trace" {
        for target in NOISY_TARGETS {
            filter = filter.add_directive(format!("{target}=warn").parse()?);
        }
    }
    for (module, module_level) in &config.module_filters {
        filter = filter.add_directive(
            format!("{module}={module_level}")
                .parse()
                .with_context(|| format!("Invalid module filter {module}={module_level}"))?,
        );
    }
    Ok(filter)
}

pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    if !config.console_output && !config.file_output {
        return Err(anyhow!("No logging output configured"));
    }

    let env_filter = build_env_filter(config)?;

    let log_dir = get_log_directory(config);
    let file_writer = if config.file_output {
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory {log_dir:?}"))?;
        rotate_existing_log_file(&log_dir, LOG_FILE_NAME)?;
        cleanup_old_logs(&log_dir, config.max_files)?;

        let (writer, guard) = non_blocking(rolling::never(&log_dir, LOG_FILE_NAME));
        if let Ok(mut guards) = LOG_GUARDS.lock() {
            guards.push(guard);
        }
        Some(writer)
    } else {
        None
    };

    let console_layer = config.console_output.then(|| {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_timer(LocalTimeFormatter)
            .with_target(false)
    });
    let json_file_layer = file_writer.clone().filter(|_| config.json_format).map(|writer| {
        fmt::layer()
            .json()
            .with_writer(writer)
            .with_timer(LocalTimeFormatter)
            .with_target(true)
            .with_current_span(true)
            .with_ansi(false)
    });
    let text_file_layer = file_writer.filter(|_| !config.json_format).map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_timer(LocalTimeFormatter)
            .with_target(false)
            .with_ansi(false)
    });

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(json_file_layer)
        .with(text_file_layer)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    info!("Logging system initialized (level: {}, json: {})", config.level, config.json_format);
    if config.file_output {
        info!("Log directory: {:?}", log_dir);
    }
    Ok(())
}

/// Rename the previous log file with its modification time
fn rotate_existing_log_file(log_dir: &Path, log_file_name: &str) -> Result<()> {
    let log_file_path = log_dir.join(log_file_name);
    if !log_file_path.exists() {
        return Ok(());
    }

    let modified = std::fs::metadata(&log_file_path)
        .and_then(|m| m.modified())
        .unwrap_or_else(|_| std::time::SystemTime::now());
    let stamp: chrono::DateTime<Local> = modified.into();

    let file_stem = log_file_name.trim_end_matches(".log");
    let rotated = log_dir.join(format!("{file_stem}.{}.log", stamp.format("%Y%m%dT%H%M%S")));
    std::fs::rename(&log_file_path, &rotated)
        .with_context(|| format!("Failed to rotate log file {}", log_file_path.display()))?;
    Ok(())
}

/// Keep the `max_files` most recent `.log` files
fn cleanup_old_logs(log_dir: &Path, max_files: u32) -> Result<usize> {
    let mut log_files = Vec::new();
    for entry in std::fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "log") {
            if let Ok(modified) = entry.metadata().and_then(|m| m.modified()) {
                log_files.push((path, modified));
            }
        }
    }

    // newest first
    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    let mut removed = 0;
    for (path, _) in log_files.iter().skip(max_files as usize) {
        match std::fs::remove_file(path) {
            Ok(()) => removed += 1,
            Err(e) => warn!("Failed to remove old log file {:?}: {}", path, e),
        }
    }
    Ok(removed)
}
