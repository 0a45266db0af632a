//! Layered configuration.
//!
//! Precedence, lowest to highest: built-in defaults, the global config file
//! (`<config_dir>/linemark/config.toml`), the workspace file
//! (`.linemark.toml` at the workspace root), and `LINEMARK_*` environment
//! variables with `__` separating nested keys.

use crate::logging::LoggingConfig;
use crate::watch::WatchSettings;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Workspace config file name.
pub const WORKSPACE_FILE: &str = ".linemark.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinemarkConfig {
    /// Workspace roots bookmark paths are made relative to. Empty means keys
    /// use full paths.
    #[serde(default)]
    pub roots: Vec<PathBuf>,

    /// Bookmark store location; the platform data directory when unset.
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    /// Quiet window for debounced saves, in milliseconds.
    #[serde(default = "default_save_debounce_ms")]
    pub save_debounce_ms: u64,

    #[serde(default)]
    pub watch: WatchSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_save_debounce_ms() -> u64 {
    300
}

impl Default for LinemarkConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            store_path: None,
            save_debounce_ms: default_save_debounce_ms(),
            watch: WatchSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Configuration loader composing the source layers.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Global config file path (`<config_dir>/linemark/config.toml`).
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "linemark", "linemark")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load configuration for a workspace.
    pub fn load(workspace_root: &Path) -> Result<LinemarkConfig, ConfigError> {
        let mut builder = Config::builder();

        if let Some(global) = Self::global_config_path() {
            if global.exists() {
                builder = builder.add_source(File::from(global));
            }
        }

        let workspace_file = workspace_root.join(WORKSPACE_FILE);
        if workspace_file.exists() {
            builder = builder.add_source(File::from(workspace_file));
        }

        builder = builder.add_source(
            Environment::with_prefix("LINEMARK")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Load configuration from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<LinemarkConfig, ConfigError> {
        let builder = Config::builder()
            .add_source(File::from(path.to_path_buf()))
            .add_source(
                Environment::with_prefix("LINEMARK")
                    .separator("__")
                    .try_parsing(true),
            );
        builder.build()?.try_deserialize()
    }
}

impl LinemarkConfig {
    /// Write this configuration as a workspace `.linemark.toml`. Used by the
    /// CLI `init` command to seed a commented starting point.
    pub fn write_workspace_file(&self, workspace_root: &Path) -> std::io::Result<PathBuf> {
        let path = workspace_root.join(WORKSPACE_FILE);
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(&path, content)?;
        Ok(path)
    }
}
