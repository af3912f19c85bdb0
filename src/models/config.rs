//! Configuration model.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// MythTV backend configuration.
    pub backend: BackendConfig,
    /// TheTVDB configuration.
    pub tvdb: TvdbConfig,
    /// Commercial skip list configuration.
    pub skiplist: SkipListConfig,
    /// Kodi library configuration.
    pub kodi: KodiConfig,
    /// Synchronization options.
    pub sync: SyncConfig,
}

/// MythTV backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Services API base URL.
    pub url: String,
    /// Storage group holding the recordings.
    pub storage_group: String,
    /// Explicit storage directories. Queried from the backend when empty.
    pub storage_dirs: Vec<PathBuf>,
    /// Request timeout in seconds.
    pub timeout: u64,
}

/// TheTVDB configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TvdbConfig {
    /// API key.
    pub api_key: Option<String>,
    /// Subscriber PIN, for user-supported keys.
    pub pin: Option<String>,
    /// Language for series and episode names.
    pub language: String,
}

/// Skip list (commercial detector) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkipListConfig {
    /// Whether to write sidecar files.
    pub enabled: bool,
    /// Program to run.
    pub program: String,
    /// Arguments placed before `--chanid` and `--starttime`.
    pub args: Vec<String>,
}

/// Kodi configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KodiConfig {
    /// Kodi web server URL. Library scans are disabled when unset.
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Synchronization options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Default destination directory.
    pub dest: Option<PathBuf>,
    /// Recording groups never linked during a full resync.
    pub excluded_groups: Vec<String>,
    /// Concurrent link jobs during rebuild.
    pub jobs: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6544".to_string(),
            storage_group: "Default".to_string(),
            storage_dirs: Vec::new(),
            timeout: 30,
        }
    }
}

impl Default for TvdbConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("TVDB_API_KEY").ok(),
            pin: std::env::var("TVDB_PIN").ok(),
            language: "eng".to_string(),
        }
    }
}

impl Default for SkipListConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "mythutil".to_string(),
            args: vec!["--getskiplist".to_string(), "-q".to_string()],
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            dest: None,
            excluded_groups: vec![
                crate::models::recording::LIVE_TV_GROUP.to_string(),
                "Deleted".to_string(),
            ],
            jobs: 1,
        }
    }
}

/// Get the configuration directory path.
pub fn dirs_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mythlink")
}

/// Load configuration from `path`, or from the default location.
///
/// A missing or unreadable file yields the defaults.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dirs_config_path().join("config.toml"));

    if config_path.exists() {
        match std::fs::read_to_string(&config_path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Ignoring invalid config {:?}: {}", config_path, e);
                }
            },
            Err(e) => {
                tracing::warn!("Cannot read config {:?}: {}", config_path, e);
            }
        }
    }

    Config::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend.url, "http://localhost:6544");
        assert_eq!(config.sync.jobs, 1);
        assert!(config.sync.excluded_groups.contains(&"LiveTV".to_string()));
        assert!(config.skiplist.enabled);
        assert!(config.kodi.url.is_none());
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [backend]
            url = "http://mythbox:6544"

            [kodi]
            url = "http://kodi:8080"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend.url, "http://mythbox:6544");
        assert_eq!(config.backend.storage_group, "Default");
        assert_eq!(config.kodi.url.as_deref(), Some("http://kodi:8080"));
        assert_eq!(config.skiplist.program, "mythutil");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = load_config(Some(Path::new("/nonexistent/mythlink.toml")));
        assert_eq!(config.backend.storage_group, "Default");
    }
}
