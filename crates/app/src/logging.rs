//! Subscriber setup
//!
//! Console output goes to stderr so command output on stdout stays clean.
//! Each run also writes a debug-level log file under `logs_dir`.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Install the console and file layers
///
/// Returns the log file path. If the log file cannot be created the
/// console layer is still installed and a warning is logged.
pub fn init(console_level: &str, logs_dir: &Path) -> Option<PathBuf> {
    let file = open_log_file(logs_dir);

    let file_layer = file.as_ref().ok().and_then(|(_, f)| f.try_clone().ok()).map(|f| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(f))
            .with_filter(LevelFilter::DEBUG)
    });

    tracing_subscriber::registry()
        .with(console_layer(console_level))
        .with(file_layer)
        .init();

    match file {
        Ok((path, _)) => {
            tracing::debug!(path = %path.display(), "Logging to file");
            Some(path)
        }
        Err(e) => {
            tracing::warn!(dir = %logs_dir.display(), "Could not open log file: {}", e);
            None
        }
    }
}

/// Console-only subscriber for failures before the config is known
pub fn init_console(console_level: &str) {
    tracing_subscriber::registry()
        .with(console_layer(console_level))
        .init();
}

fn console_layer<S>(console_level: &str) -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(console_level));
    fmt::layer().with_writer(std::io::stderr).with_filter(filter)
}

fn open_log_file(logs_dir: &Path) -> std::io::Result<(PathBuf, File)> {
    fs::create_dir_all(logs_dir)?;
    let path = log_file_path(logs_dir, Local::now());
    let file = File::create(&path)?;
    Ok((path, file))
}

fn log_file_path(logs_dir: &Path, at: chrono::DateTime<Local>) -> PathBuf {
    logs_dir.join(format!("{}.log", at.format("%Y%m%d_%H%M%S")))
}
