//! Configuration loading, validation, and management for mcpgate.
//!
//! Loads configuration from `~/.mcpgate/config.toml` with environment
//! variable overrides, once, at startup. The resulting [`AppConfig`] is
//! passed by reference into the router and clients; nothing downstream
//! reads the environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.mcpgate/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Inbound HTTP surface
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Remote gateway (primary tier)
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Dispatch settings
    #[serde(default)]
    pub router: RouterConfig,

    /// Backend capability clients (secondary tier)
    #[serde(default)]
    pub backends: BackendsConfig,
}

fn default_true() -> bool {
    true
}

/// Redact a secret for Debug output.
fn redact(s: &str) -> &'static str {
    if s.is_empty() { "None" } else { "[REDACTED]" }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the remote gateway (`MCP_SERVER_URL`)
    #[serde(default = "default_remote_url", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Bound on a single remote dispatch
    #[serde(default = "default_remote_timeout")]
    pub timeout_secs: u64,

    /// Bound on a single health probe
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_ms: u64,

    /// How long a probe result is reused. 0 = probe before every dispatch.
    #[serde(default = "default_probe_ttl")]
    pub probe_ttl_secs: u64,

    /// Background refresh interval. 0 = no background prober.
    #[serde(default)]
    pub probe_interval_secs: u64,
}

fn default_remote_url() -> Option<String> {
    Some("http://localhost:8080".into())
}
fn default_remote_timeout() -> u64 {
    10
}
fn default_probe_timeout() -> u64 {
    2000
}
fn default_probe_ttl() -> u64 {
    5
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: default_remote_url(),
            enabled: true,
            timeout_secs: default_remote_timeout(),
            probe_timeout_ms: default_probe_timeout(),
            probe_ttl_secs: default_probe_ttl(),
            probe_interval_secs: 0,
        }
    }
}

impl RemoteConfig {
    /// The remote URL if the tier is switched on.
    pub fn active_url(&self) -> Option<&str> {
        if self.enabled { self.url.as_deref() } else { None }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn probe_ttl(&self) -> Duration {
        Duration::from_secs(self.probe_ttl_secs)
    }

    pub fn probe_interval(&self) -> Option<Duration> {
        (self.probe_interval_secs > 0).then(|| Duration::from_secs(self.probe_interval_secs))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Bound on a single capability client operation
    #[serde(default = "default_client_timeout")]
    pub client_timeout_secs: u64,
}

fn default_client_timeout() -> u64 {
    10
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            client_timeout_secs: default_client_timeout(),
        }
    }
}

impl RouterConfig {
    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supabase: Option<SupabaseConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notion: Option<NotionConfig>,

    #[serde(default)]
    pub youtube: YoutubeConfig,
}

/// Relational backend (PostgREST).
#[derive(Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    pub url: String,

    /// Service-role key, sent as both `apikey` and bearer token
    pub api_key: String,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

/// Document workspace backend.
#[derive(Clone, Serialize, Deserialize)]
pub struct NotionConfig {
    pub token: String,

    /// Used when a request omits `database_id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_id: Option<String>,

    #[serde(default = "default_notion_api_url")]
    pub api_url: String,

    #[serde(default = "default_notion_version")]
    pub api_version: String,
}

fn default_notion_api_url() -> String {
    "https://api.notion.com/v1".into()
}
fn default_notion_version() -> String {
    "2022-06-28".into()
}

impl std::fmt::Debug for NotionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionConfig")
            .field("token", &redact(&self.token))
            .field("database_id", &self.database_id)
            .field("api_url", &self.api_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Video transcript backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoutubeConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_youtube_base_url")]
    pub base_url: String,

    #[serde(default = "default_lang")]
    pub default_lang: String,
}

fn default_youtube_base_url() -> String {
    "https://www.youtube.com".into()
}
fn default_lang() -> String {
    "en".into()
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_youtube_base_url(),
            default_lang: default_lang(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.mcpgate/config.toml),
    /// then apply environment overrides:
    /// - `MCP_SERVER_URL`
    /// - `SUPABASE_URL`, `SUPABASE_SERVICE_KEY` (or `SUPABASE_KEY`)
    /// - `NOTION_TOKEN`, `NOTION_DATABASE_ID`
    /// - `MCPGATE_PORT`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_path())
    }

    /// Load from `path`, then apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup("MCP_SERVER_URL") {
            self.remote.url = Some(url.trim_end_matches('/').to_string());
        }

        let supabase_url = lookup("SUPABASE_URL");
        let supabase_key = lookup("SUPABASE_SERVICE_KEY").or_else(|| lookup("SUPABASE_KEY"));
        if let Some(existing) = self.backends.supabase.as_mut() {
            if let Some(url) = supabase_url {
                existing.url = url;
            }
            if let Some(key) = supabase_key {
                existing.api_key = key;
            }
        } else if let (Some(url), Some(api_key)) = (supabase_url, supabase_key) {
            self.backends.supabase = Some(SupabaseConfig { url, api_key });
        }

        if let Some(token) = lookup("NOTION_TOKEN") {
            match &mut self.backends.notion {
                Some(existing) => existing.token = token,
                None => {
                    self.backends.notion = Some(NotionConfig {
                        token,
                        database_id: None,
                        api_url: default_notion_api_url(),
                        api_version: default_notion_version(),
                    })
                }
            }
        }
        if let (Some(id), Some(notion)) = (lookup("NOTION_DATABASE_ID"), &mut self.backends.notion) {
            notion.database_id = Some(id);
        }

        if let Some(port) = lookup("MCPGATE_PORT") {
            match port.parse() {
                Ok(port) => self.gateway.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid MCPGATE_PORT"),
            }
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".mcpgate")
    }

    /// Get the default configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.remote.url {
            require_http("remote.url", url)?;
        }
        if self.remote.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "remote.timeout_secs must be > 0".into(),
            ));
        }
        if self.remote.probe_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "remote.probe_timeout_ms must be > 0".into(),
            ));
        }
        if self.router.client_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "router.client_timeout_secs must be > 0".into(),
            ));
        }
        if let Some(supabase) = &self.backends.supabase {
            require_http("backends.supabase.url", &supabase.url)?;
            if supabase.api_key.is_empty() {
                return Err(ConfigError::ValidationError(
                    "backends.supabase.api_key must not be empty".into(),
                ));
            }
        }
        if let Some(notion) = &self.backends.notion {
            require_http("backends.notion.api_url", &notion.api_url)?;
        }
        require_http("backends.youtube.base_url", &self.backends.youtube.base_url)?;
        Ok(())
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

fn require_http(field: &str, url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{field} must start with http:// or https:// (got '{url}')"
        )))
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.gateway.port, 8000);
        assert_eq!(config.remote.active_url(), Some("http://localhost:8080"));
        assert_eq!(config.remote.timeout(), Duration::from_secs(10));
        assert!(config.backends.supabase.is_none());
        assert!(!config.backends.youtube.enabled);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.gateway.port, config.gateway.port);
        assert_eq!(parsed.remote.url, config.remote.url);
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.gateway.port, 8000);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[gateway]
port = 9100

[remote]
url = "http://gateway.internal:8080"
probe_ttl_secs = 0

[backends.supabase]
url = "https://db.example.co"
api_key = "service-key"

[backends.youtube]
enabled = true
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.gateway.port, 9100);
        assert_eq!(config.remote.probe_ttl(), Duration::ZERO);
        assert_eq!(
            config.backends.supabase.as_ref().map(|s| s.url.as_str()),
            Some("https://db.example.co")
        );
        assert!(config.backends.youtube.enabled);
        assert!(config.backends.notion.is_none());
    }

    #[test]
    fn unparseable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[gateway\nport = ").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn non_http_remote_url_rejected() {
        let mut config = AppConfig::default();
        config.remote.url = Some("ftp://nope".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut config = AppConfig::default();
        config.router.client_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = AppConfig::default();
        config.apply_overrides(env(&[
            ("MCP_SERVER_URL", "http://remote:9000/"),
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_KEY", "fallback-key"),
            ("NOTION_TOKEN", "secret_abc"),
            ("NOTION_DATABASE_ID", "db-1"),
            ("MCPGATE_PORT", "9999"),
        ]));

        assert_eq!(config.remote.url.as_deref(), Some("http://remote:9000"));
        let supabase = config.backends.supabase.as_ref().unwrap();
        assert_eq!(supabase.api_key, "fallback-key");
        let notion = config.backends.notion.as_ref().unwrap();
        assert_eq!(notion.database_id.as_deref(), Some("db-1"));
        assert_eq!(config.gateway.port, 9999);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn service_key_preferred_over_plain_key() {
        let mut config = AppConfig::default();
        config.apply_overrides(env(&[
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_SERVICE_KEY", "service"),
            ("SUPABASE_KEY", "anon"),
        ]));
        assert_eq!(config.backends.supabase.unwrap().api_key, "service");
    }

    #[test]
    fn supabase_needs_url_and_key() {
        let mut config = AppConfig::default();
        config.apply_overrides(env(&[("SUPABASE_URL", "https://abc.supabase.co")]));
        assert!(config.backends.supabase.is_none());
    }

    #[test]
    fn debug_redacts_secrets() {
        let supabase = SupabaseConfig {
            url: "https://abc.supabase.co".into(),
            api_key: "super-secret".into(),
        };
        let rendered = format!("{supabase:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn disabled_remote_has_no_active_url() {
        let mut config = AppConfig::default();
        config.remote.enabled = false;
        assert_eq!(config.remote.active_url(), None);
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("localhost:8080"));
        assert!(toml_str.contains("8000"));
    }
}
