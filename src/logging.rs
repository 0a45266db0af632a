//! Structured logging via `tracing`.
//!
//! Configurable level, format, and destination. `RUST_LOG` overrides the
//! configured level when set.

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::EnvFilter;

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether logging is enabled (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stderr, stdout, file
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file path when output is "file"
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Enable colored output (text format, terminal outputs only)
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: None,
            color: default_true(),
        }
    }
}

/// Default log file path under the platform state directory.
pub fn default_log_file_path() -> Option<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "linemark", "linemark")?;
    let dir = dirs.state_dir().unwrap_or_else(|| dirs.data_dir());
    Some(dir.join("linemark.log"))
}

/// Initialize the global subscriber from `config`.
///
/// `RUST_LOG` takes precedence over the configured level. Returns an error
/// string when the file destination cannot be opened or a subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), String> {
    if !config.enabled {
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoUtc::rfc_3339());

    match config.output.as_str() {
        "file" => {
            let path = config
                .file
                .clone()
                .or_else(default_log_file_path)
                .ok_or_else(|| "no log file path available".to_string())?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("failed to create log directory: {}", e))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| format!("failed to open log file {}: {}", path.display(), e))?;
            let builder = builder.with_writer(Arc::new(file)).with_ansi(false);
            if config.format == "json" {
                builder.json().try_init().map_err(|e| e.to_string())
            } else {
                builder.try_init().map_err(|e| e.to_string())
            }
        }
        "stdout" => {
            let builder = builder.with_writer(std::io::stdout).with_ansi(config.color);
            if config.format == "json" {
                builder.json().try_init().map_err(|e| e.to_string())
            } else {
                builder.try_init().map_err(|e| e.to_string())
            }
        }
        _ => {
            let builder = builder.with_writer(std::io::stderr).with_ansi(config.color);
            if config.format == "json" {
                builder.json().try_init().map_err(|e| e.to_string())
            } else {
                builder.try_init().map_err(|e| e.to_string())
            }
        }
    }
}
