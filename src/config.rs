//! Configuration loading
//!
//! Every field has a default, so an empty or missing config file is valid.
//! Values are layered: defaults, then the JSON file, then command-line flags.

use crate::core::DownloadOptions;
use crate::error::ShareError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Binary name looked up in `PATH` when no tool path is configured
pub const DEFAULT_TOOL_PATH: &str = "yt-dlp";
/// Folder created under the user's Downloads directory
pub const FOLDER_NAME: &str = "EasyShare";
/// Per-application folder name under the platform data and config dirs
pub const APP_DIR_NAME: &str = "easyshare";
/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "EASYSHARE_CONFIG";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 11; SM-G973F) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.120 Mobile Safari/537.36";
pub const DEFAULT_EXTRACTOR_ARGS: &str = "youtube:player_client=android,web";
pub const DEFAULT_COMPAT_OPTIONS: &str = "no-youtube-channel-redirect";
pub const DEFAULT_EXTRACTOR_RETRIES: u32 = 3;
pub const DEFAULT_SOCKET_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_FILE_SEARCH_WINDOW: Duration = Duration::from_secs(60);

/// Format selectors tried in order until one succeeds
pub const DEFAULT_FORMATS: &[&str] = &[
    "best[height<=720][ext=mp4]",
    "best[height<=480][ext=mp4]",
    "worst[ext=mp4]",
    "best[height<=720]",
    "best[height<=480]",
    "worst",
];

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Path or name of the yt-dlp binary
    pub tool_path: PathBuf,
    /// Download folder (defaults to `<Downloads>/EasyShare`)
    pub output_dir: Option<PathBuf>,
    /// History database file
    pub database_path: Option<PathBuf>,
    /// Ordered format selectors
    pub formats: Vec<String>,
    pub user_agent: String,
    pub extractor_args: String,
    pub compat_options: String,
    pub extractor_retries: u32,
    /// Socket timeout passed to the tool (e.g. "30s")
    pub socket_timeout: String,
    /// How recent a stray file in the parent folder must be to count as ours
    pub file_search_window: String,
    /// Record successful downloads in the history database
    pub record_history: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tool_path: PathBuf::from(DEFAULT_TOOL_PATH),
            output_dir: None,
            database_path: None,
            formats: DEFAULT_FORMATS.iter().map(|s| s.to_string()).collect(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            extractor_args: DEFAULT_EXTRACTOR_ARGS.to_string(),
            compat_options: DEFAULT_COMPAT_OPTIONS.to_string(),
            extractor_retries: DEFAULT_EXTRACTOR_RETRIES,
            socket_timeout: humantime::format_duration(DEFAULT_SOCKET_TIMEOUT).to_string(),
            file_search_window: humantime::format_duration(DEFAULT_FILE_SEARCH_WINDOW).to_string(),
            record_history: true,
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Otherwise `$EASYSHARE_CONFIG` is used, and
    /// failing that the default location if a file is present there.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Self::from_file(Path::new(&path));
        }

        match default_config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Read and validate a JSON config file
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ShareError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.formats.is_empty() {
            return Err(ShareError::Config("at least one format selector is required".into()));
        }
        if self.formats.iter().any(|f| f.trim().is_empty()) {
            return Err(ShareError::Config("format selectors cannot be blank".into()));
        }
        self.socket_timeout()?;
        self.file_search_window()?;
        Ok(())
    }

    pub fn socket_timeout(&self) -> Result<Duration> {
        parse_duration("socket_timeout", &self.socket_timeout)
    }

    pub fn file_search_window(&self) -> Result<Duration> {
        parse_duration("file_search_window", &self.file_search_window)
    }

    /// Effective download folder
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(default_output_dir)
    }

    /// Effective history database path
    pub fn database_path(&self) -> PathBuf {
        self.database_path.clone().unwrap_or_else(default_database_path)
    }

    /// Orchestrator options derived from this config
    pub fn download_options(&self) -> Result<DownloadOptions> {
        self.validate()?;
        Ok(DownloadOptions {
            formats: self.formats.clone(),
            output_dir: self.output_dir(),
            user_agent: self.user_agent.clone(),
            extractor_args: self.extractor_args.clone(),
            compat_options: self.compat_options.clone(),
            extractor_retries: self.extractor_retries,
            socket_timeout: self.socket_timeout()?,
            file_search_window: self.file_search_window()?,
        })
    }
}

fn parse_duration(field: &str, value: &str) -> Result<Duration> {
    humantime::parse_duration(value.trim())
        .map_err(|e| ShareError::Config(format!("invalid {} '{}': {}", field, value, e)))
}

/// `<Downloads>/EasyShare`, or `./Downloads/EasyShare` when the platform has no download dir
pub fn default_output_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("Downloads"))
        .join(FOLDER_NAME)
}

/// Default history database location under the platform data dir
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join("history.db")
}

/// Default config file location under the platform config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.tool_path, PathBuf::from("yt-dlp"));
        assert_eq!(config.formats.len(), 6);
        assert_eq!(config.formats[0], "best[height<=720][ext=mp4]");
        assert_eq!(config.formats[5], "worst");
        assert_eq!(config.socket_timeout().unwrap(), Duration::from_secs(30));
        assert_eq!(config.file_search_window().unwrap(), Duration::from_secs(60));
        assert!(config.record_history);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "formats": ["best[ext=mp4]", "worst"], "socket_timeout": "1m", "output_dir": "/srv/videos" }"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.formats, vec!["best[ext=mp4]", "worst"]);
        assert_eq!(config.socket_timeout().unwrap(), Duration::from_secs(60));
        assert_eq!(config.output_dir(), PathBuf::from("/srv/videos"));
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        std::fs::write(&path, r#"{ "formats": [] }"#).unwrap();
        assert!(matches!(Config::from_file(&path), Err(ShareError::Config(_))));

        std::fs::write(&path, r#"{ "socket_timeout": "soon" }"#).unwrap();
        assert!(matches!(Config::from_file(&path), Err(ShareError::Config(_))));

        std::fs::write(&path, r#"{ "unknown_field": 1 }"#).unwrap();
        assert!(matches!(Config::from_file(&path), Err(ShareError::JsonError(_))));

        assert!(matches!(
            Config::from_file(&dir.path().join("missing.json")),
            Err(ShareError::Config(_))
        ));
    }

    #[test]
    fn test_download_options_from_config() {
        let config = Config {
            output_dir: Some(PathBuf::from("/tmp/out")),
            extractor_retries: 5,
            ..Default::default()
        };
        let options = config.download_options().unwrap();
        assert_eq!(options.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(options.extractor_retries, 5);
        assert_eq!(options.formats, config.formats);
        assert_eq!(options.socket_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_default_paths_follow_platform_dirs() {
        let output = default_output_dir();
        assert!(output.ends_with(FOLDER_NAME));
        if let Some(downloads) = dirs::download_dir() {
            assert_eq!(output, downloads.join(FOLDER_NAME));
        }

        let database = default_database_path();
        assert!(database.ends_with("easyshare/history.db"));
        if let Some(data) = dirs::data_dir() {
            assert_eq!(database, data.join("easyshare").join("history.db"));
        }

        assert_eq!(
            default_config_path(),
            dirs::config_dir().map(|dir| dir.join("easyshare").join("config.json"))
        );
    }
}
