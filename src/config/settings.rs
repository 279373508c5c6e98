//! Configuration settings for Undertekst.
//!
//! Loaded once at process start from a TOML file; every section has
//! defaults so a missing file means a fully default configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub server: ServerSettings,
    pub resolver: ResolverSettings,
    pub proxy: ProxySettings,
    pub fallback: FallbackSettings,
}


/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// CORS origin allowlist; "*" allows any origin.
    pub cors_allow_origins: Vec<String>,
    /// Per-client-IP limit on inbound requests per minute (0 disables).
    pub inbound_requests_per_minute: u32,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_allow_origins: vec!["*".to_string()],
            inbound_requests_per_minute: 60,
        }
    }
}

/// Transcript resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Client-side limit on outbound provider requests per minute (0 disables).
    pub requests_per_minute: u32,
    /// Directory for the on-disk transcript cache.
    pub cache_dir: String,
    /// Cache entry freshness window in seconds (0 disables caching).
    pub cache_max_age_seconds: u64,
    /// Language preference order used when the caller supplies none.
    pub default_languages: Vec<String>,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
            cache_dir: "~/.undertekst/cache".to_string(),
            cache_max_age_seconds: 600,
            default_languages: vec![
                "en".to_string(),
                "en-US".to_string(),
                "en-GB".to_string(),
            ],
        }
    }
}

/// Proxy routing for provider requests. Webshare credentials take precedence
/// over the static URL pool; with neither set, requests go direct.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct ProxySettings {
    /// Webshare rotating-proxy username.
    pub webshare_username: Option<String>,
    /// Webshare rotating-proxy password.
    pub webshare_password: Option<String>,
    /// Country codes to filter proxy exit locations by.
    pub countries: Vec<String>,
    /// Static proxy URLs, rotated round-robin.
    pub urls: Vec<String>,
}


/// Legacy audio-transcription fallback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackSettings {
    /// OpenAI transcription model.
    pub model: String,
    /// Directory for temporary audio downloads.
    pub temp_dir: String,
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini-transcribe".to_string(),
            temp_dir: "/tmp/undertekst".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::UndertekstError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("undertekst")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded cache directory path.
    pub fn cache_dir(&self) -> PathBuf {
        Self::expand_path(&self.resolver.cache_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.fallback.temp_dir)
    }
}
