use crate::stats::BucketWidth;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub log_store: LogStoreConfig,
    pub audit: AuditConfig,
    pub display: DisplayConfig,
    pub stats: StatsConfig,
    pub sinks: SinkConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogStoreConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for LogStoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            collection: default_collection(),
        }
    }
}

/// Flat audit file. Lives next to the document store unless set.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_show_timing")]
    pub show_timing: bool,
    #[serde(default = "default_genre_columns")]
    pub genre_columns: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            show_timing: default_show_timing(),
            genre_columns: default_genre_columns(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default)]
    pub bucket: BucketWidth,
    #[serde(default = "default_top_limit")]
    pub top_limit: usize,
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            bucket: BucketWidth::default(),
            top_limit: default_top_limit(),
            recent_limit: default_recent_limit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("moviesearch"))
        .unwrap_or_else(|| PathBuf::from(".moviesearch"))
}
fn default_catalog_path() -> PathBuf {
    default_data_dir().join("catalog.json")
}
fn default_collection() -> String {
    "search_logs".to_string()
}
fn default_page_size() -> usize {
    10
}
fn default_show_timing() -> bool {
    true
}
fn default_genre_columns() -> usize {
    3
}
fn default_top_limit() -> usize {
    5
}
fn default_recent_limit() -> usize {
    10
}
fn default_timeout_ms() -> u64 {
    2000
}

/// Command-line and environment values that take precedence over the file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub catalog: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub audit_log: Option<PathBuf>,
}

impl Config {
    /// Loads `explicit` if given, otherwise the first config file found on
    /// the search path, otherwise the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::find_config_path(),
        };
        let config = if let Some(path) = config_path {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    fn find_config_path() -> Option<PathBuf> {
        if let Some(xdg_config) = dirs::config_dir() {
            let xdg_path = xdg_config.join("moviesearch/config.toml");
            if xdg_path.exists() {
                return Some(xdg_path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            let home_path = home.join(".moviesearch.toml");
            if home_path.exists() {
                return Some(home_path);
            }
        }

        let current_path = Path::new(".moviesearch.toml");
        if current_path.exists() {
            return Some(current_path.to_path_buf());
        }

        None
    }

    pub fn validate(&self) -> Result<()> {
        if self.display.page_size == 0 {
            bail!("display.page_size must be at least 1");
        }
        if self.display.genre_columns == 0 {
            bail!("display.genre_columns must be at least 1");
        }
        if self.sinks.timeout_ms == 0 {
            bail!("sinks.timeout_ms must be at least 1");
        }
        if self.log_store.collection.trim().is_empty() {
            bail!("log_store.collection must not be empty");
        }
        Ok(())
    }

    pub fn apply(&mut self, overrides: Overrides) -> Result<()> {
        if let Some(path) = overrides.catalog {
            self.catalog.path = path;
        }
        if let Some(dir) = overrides.data_dir {
            self.log_store.data_dir = dir;
        }
        if let Some(path) = overrides.audit_log {
            self.audit.path = Some(path);
        }
        self.validate()
    }

    pub fn audit_path(&self) -> PathBuf {
        self.audit
            .path
            .clone()
            .unwrap_or_else(|| self.log_store.data_dir.join("search_log.jsonl"))
    }

    pub fn sink_timeout(&self) -> Duration {
        Duration::from_millis(self.sinks.timeout_ms)
    }
}
