use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf};

/// External services the bot needs credentials for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceId {
    /// Google Maps: geocoding and time-zone lookups share one key.
    Google,
    /// Dark Sky weather.
    DarkSky,
    /// webcams.travel (Mashape gateway).
    Webcams,
}

impl ServiceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceId::Google => "google",
            ServiceId::DarkSky => "darksky",
            ServiceId::Webcams => "webcams",
        }
    }

    pub const fn all() -> &'static [ServiceId] {
        &[ServiceId::Google, ServiceId::DarkSky, ServiceId::Webcams]
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ServiceId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "google" => Ok(ServiceId::Google),
            "darksky" => Ok(ServiceId::DarkSky),
            "webcams" => Ok(ServiceId::Webcams),
            _ => Err(anyhow!(
                "Unknown service '{value}'. Supported services: google, darksky, webcams."
            )),
        }
    }
}

/// Configuration for a single service (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub api_key: String,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Example TOML:
    /// [services.darksky]
    /// api_key = "..."
    pub services: HashMap<String, ServiceConfig>,
}

impl Config {
    /// Returns the API key for a service, if present.
    pub fn api_key(&self, service: ServiceId) -> Option<&str> {
        self.services.get(service.as_str()).map(|cfg| cfg.api_key.as_str())
    }

    /// Like [`Config::api_key`] but with a configuration hint on failure.
    pub fn require_api_key(&self, service: ServiceId) -> Result<&str> {
        self.api_key(service).ok_or_else(|| {
            anyhow!(
                "No API key configured for service '{service}'.\n\
                 Hint: run `weatherbot configure {service}` and enter your API key."
            )
        })
    }

    pub fn is_configured(&self, service: ServiceId) -> bool {
        self.api_key(service).is_some()
    }

    /// Set/replace a service API key.
    pub fn upsert_api_key(&mut self, service: ServiceId, api_key: String) {
        self.services.insert(service.as_str().to_string(), ServiceConfig { api_key });
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherbot", "weatherbot")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
