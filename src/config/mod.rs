//! Configuration management.
//!
//! Values are resolved in layers: built-in defaults, then a TOML file, then
//! `GASLEDGER_*` environment variables, then command-line flags (applied by
//! the binary through the `with_*` builders).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application directory name under the platform config and data dirs.
const APP_DIR: &str = "gasledger";

/// Default database file name inside the data directory.
pub const DEFAULT_DB_FILE: &str = "clients.db";

/// Session file name inside the data directory.
pub const SESSION_FILE: &str = "session.json";

/// Default number of records per page.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Default quiet period before a search runs.
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

/// Default minimum interval between scroll snapshot saves.
pub const DEFAULT_SCROLL_SAVE_INTERVAL_MS: u64 = 250;

/// Main configuration for gasledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Directory holding the database and session file.
    pub data_dir: PathBuf,
    /// Database file name, relative to `data_dir` unless absolute.
    pub db_file: PathBuf,
    /// Records per page for listing and browsing.
    pub page_size: usize,
    /// Search debounce quiet period in milliseconds.
    pub search_debounce_ms: u64,
    /// Minimum interval between scroll snapshot saves in milliseconds.
    pub scroll_save_interval_ms: u64,
    /// Logging section, resolved by the observability layer.
    pub logging: LoggingSettings,
    /// Config files that were loaded, in order.
    pub config_sources: Vec<PathBuf>,
}

/// Logging section of the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    /// Output format: `pretty` or `json`.
    pub format: Option<String>,
    /// `EnvFilter` directive, e.g. `gasledger=debug`.
    pub filter: Option<String>,
    /// Append logs to this file instead of stderr.
    pub file: Option<String>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Data directory.
    pub data_dir: Option<String>,
    /// Database file name.
    pub db_file: Option<String>,
    /// Page size.
    pub page_size: Option<usize>,
    /// Search debounce in milliseconds.
    pub search_debounce_ms: Option<u64>,
    /// Scroll save interval in milliseconds.
    pub scroll_save_interval_ms: Option<u64>,
    /// Logging section.
    pub logging: Option<LoggingSettings>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        let data_dir = directories::BaseDirs::new().map_or_else(
            || PathBuf::from(".gasledger"),
            |dirs| dirs.data_dir().join(APP_DIR),
        );

        Self {
            data_dir,
            db_file: PathBuf::from(DEFAULT_DB_FILE),
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            scroll_save_interval_ms: DEFAULT_SCROLL_SAVE_INTERVAL_MS,
            logging: LoggingSettings::default(),
            config_sources: Vec::new(),
        }
    }
}

impl RegistryConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: e.to_string(),
            })?;

        let file: ConfigFile =
            toml::from_str(&contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;

        let mut config = Self::from_config_file(file);
        config.config_sources.push(path.to_path_buf());
        Ok(config)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/gasledger/` on macOS)
    /// 2. XDG config dir (`~/.config/gasledger/` for Unix compatibility)
    ///
    /// Returns default configuration if no config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let platform_config = base_dirs.config_dir().join(APP_DIR).join("config.toml");
        if platform_config.exists()
            && let Ok(config) = Self::load_from_file(&platform_config)
        {
            return config;
        }

        let xdg_config = base_dirs
            .home_dir()
            .join(".config")
            .join(APP_DIR)
            .join("config.toml");
        if xdg_config.exists()
            && let Ok(config) = Self::load_from_file(&xdg_config)
        {
            return config;
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `RegistryConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(data_dir) = file.data_dir {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Some(db_file) = file.db_file {
            config.db_file = PathBuf::from(db_file);
        }
        if let Some(page_size) = file.page_size {
            config.page_size = page_size;
        }
        if let Some(ms) = file.search_debounce_ms {
            config.search_debounce_ms = ms;
        }
        if let Some(ms) = file.scroll_save_interval_ms {
            config.scroll_save_interval_ms = ms;
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        config
    }

    /// Applies `GASLEDGER_*` environment overrides.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides read through `lookup`. Unparseable numbers are
    /// ignored.
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get("GASLEDGER_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(file) = get("GASLEDGER_DB_FILE") {
            self.db_file = PathBuf::from(file);
        }
        if let Some(size) = get("GASLEDGER_PAGE_SIZE").and_then(|v| v.trim().parse().ok()) {
            self.page_size = size;
        }
        if let Some(ms) = get("GASLEDGER_SEARCH_DEBOUNCE_MS").and_then(|v| v.trim().parse().ok()) {
            self.search_debounce_ms = ms;
        }
        if let Some(ms) =
            get("GASLEDGER_SCROLL_SAVE_INTERVAL_MS").and_then(|v| v.trim().parse().ok())
        {
            self.scroll_save_interval_ms = ms;
        }
        if let Some(format) = get("GASLEDGER_LOG_FORMAT") {
            self.logging.format = Some(format);
        }
        if let Some(file) = get("GASLEDGER_LOG_FILE") {
            self.logging.file = Some(file);
        }

        self
    }

    /// Sets the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = path.into();
        self
    }

    /// Sets the database file name.
    #[must_use]
    pub fn with_db_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_file = path.into();
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Full path of the database file.
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }

    /// Full path of the session file.
    #[must_use]
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }

    /// Search debounce as a duration.
    #[must_use]
    pub const fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Scroll save interval as a duration.
    #[must_use]
    pub const fn scroll_save_interval(&self) -> Duration {
        Duration::from_millis(self.scroll_save_interval_ms)
    }
}
