//! TOML sync configuration.
//!
//! Every field has a default, so an empty file (or no file) yields a working
//! configuration that syncs the three built-in feeds into `./dataset`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use feedsync_core::data::HttpOptions;
use feedsync_core::domain::FeedSpec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level sync configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Directory holding one subdirectory per entity.
    pub dataset_root: PathBuf,
    /// Page size of the metadata probe.
    pub page_size_hint: usize,
    /// Entities to sync when none are given on the command line.
    pub symbols: Vec<String>,
    pub universe: UniverseConfig,
    pub http: HttpConfig,
    pub log: LogConfig,
    pub feeds: Vec<FeedSpec>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            dataset_root: PathBuf::from("dataset"),
            page_size_hint: 20,
            symbols: Vec::new(),
            universe: UniverseConfig::default(),
            http: HttpConfig::default(),
            log: LogConfig::default(),
            feeds: FeedSpec::defaults(),
        }
    }
}

/// Optional CSV file listing the entities to sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Header of the column holding entity identifiers.
    pub column: String,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            path: None,
            column: "Symbol".into(),
        }
    }
}

/// HTTP transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub accept: String,
    pub referer: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        let options = HttpOptions::default();
        Self {
            timeout_secs: options.timeout.as_secs(),
            user_agent: options.user_agent,
            accept: options.accept,
            referer: options.referer,
        }
    }
}

impl HttpConfig {
    pub fn to_options(&self) -> HttpOptions {
        HttpOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone(),
            accept: self.accept.clone(),
            referer: self.referer.clone(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub dir: PathBuf,
    pub file: String,
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            file: "feedsync.log".into(),
            level: "info".into(),
        }
    }
}

impl LogConfig {
    pub fn file_path(&self) -> PathBuf {
        self.dir.join(&self.file)
    }
}

impl SyncConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: SyncConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size_hint == 0 {
            return Err(ConfigError::Invalid("page_size_hint must be positive".into()));
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Invalid("http.timeout_secs must be positive".into()));
        }
        if self.universe.column.trim().is_empty() {
            return Err(ConfigError::Invalid("universe.column must not be empty".into()));
        }
        if self.feeds.is_empty() {
            return Err(ConfigError::Invalid("at least one feed is required".into()));
        }

        let mut seen = HashSet::new();
        for feed in &self.feeds {
            if feed.name.trim().is_empty() {
                return Err(ConfigError::Invalid("feed name must not be empty".into()));
            }
            if !seen.insert(feed.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate feed name '{}'",
                    feed.name
                )));
            }
            let required = [
                ("url", &feed.url),
                ("date_field", &feed.date_field),
                ("file_name", &feed.file_name),
                ("total_count_pointer", &feed.total_count_pointer),
                ("rows_pointer", &feed.rows_pointer),
            ];
            for (field, value) in required {
                if value.trim().is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "feed '{}': {field} must not be empty",
                        feed.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Resolve feed names to descriptors. An empty selection means every feed.
    pub fn selected_feeds(&self, names: &[String]) -> Result<Vec<FeedSpec>, ConfigError> {
        if names.is_empty() {
            return Ok(self.feeds.clone());
        }
        names
            .iter()
            .map(|name| {
                self.feed(name).cloned().ok_or_else(|| {
                    let known: Vec<&str> = self.feeds.iter().map(|f| f.name.as_str()).collect();
                    ConfigError::Invalid(format!(
                        "unknown feed '{name}'. Valid: {}",
                        known.join(", ")
                    ))
                })
            })
            .collect()
    }

    pub fn feed(&self, name: &str) -> Option<&FeedSpec> {
        self.feeds.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = SyncConfig::from_toml("").unwrap();
        assert_eq!(config, SyncConfig::default());
        assert_eq!(config.dataset_root, PathBuf::from("dataset"));
        assert_eq!(config.page_size_hint, 20);
        assert_eq!(config.feeds.len(), 3);
        assert_eq!(config.log.file_path(), PathBuf::from("logs/feedsync.log"));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = SyncConfig::from_toml(
            r#"
dataset_root = "/data/feeds"
symbols = ["HPG", "VNM"]

[http]
timeout_secs = 5

[log]
level = "debug"
"#,
        )
        .unwrap();

        assert_eq!(config.dataset_root, PathBuf::from("/data/feeds"));
        assert_eq!(config.symbols, vec!["HPG", "VNM"]);
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.http.referer, HttpConfig::default().referer);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.dir, PathBuf::from("logs"));
        assert_eq!(config.http.to_options().timeout, Duration::from_secs(5));
    }

    #[test]
    fn custom_feeds_replace_defaults() {
        let config = SyncConfig::from_toml(
            r#"
[[feeds]]
name = "prices"
url = "http://localhost/prices"
date_field = "Date"
file_name = "prices.csv"
total_count_pointer = "/total"
rows_pointer = "/rows"
"#,
        )
        .unwrap();

        assert_eq!(config.feeds.len(), 1);
        assert_eq!(config.feeds[0].name, "prices");
    }

    #[test]
    fn zero_page_size_rejected() {
        let err = SyncConfig::from_toml("page_size_hint = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = SyncConfig::from_toml("[http]\ntimeout_secs = 0").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn duplicate_feed_names_rejected() {
        let mut config = SyncConfig::default();
        config.feeds.push(FeedSpec::price_history());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate feed name"));
    }

    #[test]
    fn empty_pointer_rejected() {
        let mut config = SyncConfig::default();
        config.feeds[2].rows_pointer = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("rows_pointer"));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = SyncConfig::from_toml("page_size_hint = \"twenty\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn default_config_roundtrips_through_toml() {
        let config = SyncConfig::default();
        let text = config.to_toml().unwrap();
        assert!(text.contains("[[feeds]]"));
        let parsed = SyncConfig::from_toml(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn selected_feeds_by_name() {
        let config = SyncConfig::default();
        assert_eq!(config.selected_feeds(&[]).unwrap().len(), 3);

        let picked = config
            .selected_feeds(&["proprietary_trading".to_string()])
            .unwrap();
        assert_eq!(picked, vec![FeedSpec::proprietary_trading()]);

        let err = config.selected_feeds(&["nope".to_string()]).unwrap_err();
        assert!(err.to_string().contains("unknown feed 'nope'"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SyncConfig::from_file(Path::new("/nonexistent/feedsync.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
