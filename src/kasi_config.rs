//! Configuration for the Kasi back-office client.
//!
//! Settings come from `kasi.toml` and are layered file → environment → CLI.
//! The file is looked up at `--config`, then `./.kasi/kasi.toml`, then
//! `<config_dir>/kasi/kasi.toml`; when none exists the defaults apply.
//!
//! # Configuration File Format
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:8000/api"
//! file_server_base_url = "http://localhost:8000"
//! upload_url = "http://localhost:8000/api/file-management/upload"
//! timeout_secs = 30
//!
//! [lists]
//! page_size = 10
//! category_page_size = 100
//!
//! [session]
//! path = "/home/me/.config/kasi/session.json"
//!
//! [logging]
//! level = "warn"
//! format = "pretty"
//! ```
//!
//! # Environment
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `KASI_API_BASE_URL` | `api.base_url` |
//! | `KASI_FILE_SERVER_BASE_URL` | `api.file_server_base_url` |
//! | `KASI_FILE_UPLOAD_URL` | `api.upload_url` |
//! | `KASI_TIMEOUT_SECS` | `api.timeout_secs` |
//! | `KASI_LOG` | `logging.level` |

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "kasi.toml";
pub const PROJECT_DIR: &str = ".kasi";

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Invalid log format '{}'. Valid values: pretty, json", s),
        }
    }
}

/// Where the REST API and file server live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Prefix for relative media URLs.
    #[serde(default = "default_file_server_base_url")]
    pub file_server_base_url: String,
    /// Upload endpoint; defaults to `<base_url>/file-management/upload`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_url: Option<String>,
    /// Per-request timeout. No timeout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_file_server_base_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            file_server_base_url: default_file_server_base_url(),
            upload_url: None,
            timeout_secs: None,
        }
    }
}

/// Page sizes per view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListsConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_category_page_size")]
    pub category_page_size: u32,
}

fn default_page_size() -> u32 {
    10
}

fn default_category_page_size() -> u32 {
    100
}

impl Default for ListsConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            category_page_size: default_category_page_size(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session file; defaults to `<config_dir>/kasi/session.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `warn` or `kasi_manager=debug`.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Parsed `kasi.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KasiToml {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub lists: ListsConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl KasiToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse kasi.toml")
    }

    /// Load `kasi.toml` from `dir`, or the defaults when it does not exist.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize kasi.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Apply environment overrides read through `lookup`. Returns a warning
    /// for every variable that was set but unusable.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut warnings = Vec::new();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty("KASI_API_BASE_URL") {
            self.api.base_url = url;
        }
        if let Some(url) = non_empty("KASI_FILE_SERVER_BASE_URL") {
            self.api.file_server_base_url = url;
        }
        if let Some(url) = non_empty("KASI_FILE_UPLOAD_URL") {
            self.api.upload_url = Some(url);
        }
        if let Some(raw) = non_empty("KASI_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = Some(secs),
                Err(_) => warnings.push(format!(
                    "Ignoring KASI_TIMEOUT_SECS='{}': expected a whole number of seconds",
                    raw
                )),
            }
        }
        if let Some(level) = non_empty("KASI_LOG") {
            self.logging.level = level;
        }
        warnings
    }

    pub fn apply_env(&mut self) -> Vec<String> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        for (key, value) in [
            ("api.base_url", Some(&self.api.base_url)),
            ("api.file_server_base_url", Some(&self.api.file_server_base_url)),
            ("api.upload_url", self.api.upload_url.as_ref()),
        ] {
            if let Some(url) = value
                && !is_http_url(url)
            {
                warnings.push(format!(
                    "Invalid {} '{}': should start with http:// or https://",
                    key, url
                ));
            }
        }

        if self.api.timeout_secs == Some(0) {
            warnings.push("api.timeout_secs = 0 would fail every request; omit it to disable the timeout".to_string());
        }
        if self.lists.page_size == 0 {
            warnings.push("lists.page_size must be at least 1".to_string());
        }
        if self.lists.category_page_size == 0 {
            warnings.push("lists.category_page_size must be at least 1".to_string());
        }
        if tracing_subscriber::EnvFilter::try_new(&self.logging.level).is_err() {
            warnings.push(format!(
                "Invalid logging.level '{}': not a valid filter directive",
                self.logging.level
            ));
        }

        warnings
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Effective configuration: file, then environment, then CLI flags.
#[derive(Debug, Clone)]
pub struct KasiConfig {
    pub toml: KasiToml,
    /// File the settings were read from, if any.
    pub source: Option<PathBuf>,
    env_warnings: Vec<String>,
}

impl KasiConfig {
    /// Candidate config files in lookup order, excluding `--config`.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(PROJECT_DIR).join(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("kasi").join(CONFIG_FILE));
        }
        paths
    }

    /// Resolve the config file and apply environment overrides.
    ///
    /// An explicit path must exist; the default locations are optional.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let (toml, source) = match explicit {
            Some(path) => (KasiToml::load(path)?, Some(path.to_path_buf())),
            None => match Self::search_paths().into_iter().find(|p| p.exists()) {
                Some(path) => (KasiToml::load(&path)?, Some(path)),
                None => (KasiToml::default(), None),
            },
        };
        Ok(Self::from_toml(toml, source))
    }

    pub fn from_toml(mut toml: KasiToml, source: Option<PathBuf>) -> Self {
        let env_warnings = toml.apply_env();
        Self {
            toml,
            source,
            env_warnings,
        }
    }

    /// Apply CLI flags, the last layer.
    pub fn with_cli_overrides(mut self, api_url: Option<String>, log_level: Option<String>) -> Self {
        if let Some(url) = api_url {
            self.toml.api.base_url = url;
        }
        if let Some(level) = log_level {
            self.toml.logging.level = level;
        }
        self
    }

    pub fn api(&self) -> &ApiConfig {
        &self.toml.api
    }

    pub fn page_size(&self) -> u32 {
        self.toml.lists.page_size.max(1)
    }

    pub fn category_page_size(&self) -> u32 {
        self.toml.lists.category_page_size.max(1)
    }

    pub fn log_level(&self) -> &str {
        &self.toml.logging.level
    }

    pub fn log_format(&self) -> LogFormat {
        self.toml.logging.format
    }

    /// Session file: configured path, else the per-user default.
    pub fn session_path(&self) -> Option<PathBuf> {
        self.toml
            .session
            .path
            .clone()
            .or_else(crate::session::FileSessionStore::default_path)
    }

    /// Validate configuration and return warnings, including unusable
    /// environment values.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = self.env_warnings.clone();
        warnings.extend(self.toml.validate());
        warnings
    }
}
