use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_MODULE_NAME: &str = "MMM-OpenWeatherMapForecast";
pub const DEFAULT_ENDPOINT: &str = "https://api.openweathermap.org/data/3.0/onecall";
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Helper configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// module_name = "MMM-OpenWeatherMapForecast"
/// default_endpoint = "https://api.openweathermap.org/data/3.0/onecall"
/// log_filter = "info"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name prefixed to every log line, matching the host module.
    pub module_name: String,

    /// Used when a request arrives without an `endpoint`.
    pub default_endpoint: String,

    /// `tracing` filter directive; `RUST_LOG` wins when set.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            module_name: DEFAULT_MODULE_NAME.to_string(),
            default_endpoint: DEFAULT_ENDPOINT.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "magicmirror", "forecast-helper")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Replace the fallback endpoint; rejects blank values.
    pub fn set_default_endpoint(&mut self, endpoint: &str) -> Result<()> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(anyhow!("Default endpoint must not be empty"));
        }
        reqwest::Url::parse(endpoint)
            .with_context(|| format!("Default endpoint is not a valid URL: {endpoint}"))?;

        self.default_endpoint = endpoint.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().expect("temp dir");
        let cfg = Config::load_from(&dir.path().join("config.toml")).expect("defaults");

        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.default_endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.module_name, DEFAULT_MODULE_NAME);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let cfg: Config = toml::from_str(r#"log_filter = "debug""#).expect("valid toml");

        assert_eq!(cfg.log_filter, "debug");
        assert_eq!(cfg.default_endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn save_then_load_keeps_changes() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.set_default_endpoint("https://example.test/onecall").expect("valid endpoint");
        cfg.module_name = "MMM-Test".into();

        cfg.save_to(&path).expect("save");
        let loaded = Config::load_from(&path).expect("load");

        assert_eq!(loaded, cfg);
    }

    #[test]
    fn set_default_endpoint_rejects_garbage() {
        let mut cfg = Config::default();

        assert!(cfg.set_default_endpoint("   ").is_err());
        let err = cfg.set_default_endpoint("not a url").unwrap_err();
        assert!(err.to_string().contains("not a valid URL"));
        assert_eq!(cfg.default_endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn invalid_toml_reports_path() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "module_name = [").expect("write");

        let err = Config::load_from(&path).unwrap_err();

        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
