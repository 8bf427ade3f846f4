//! CLI configuration

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{DynaformError, Result};
use crate::output::OutputFormat;

/// Keys accepted by `config set` / `config get`
pub const CONFIG_KEYS: [&str; 4] = ["api_url", "default_format", "log_level", "request_timeout_secs"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub api_url: Option<String>,
    pub default_format: Option<String>,
    pub log_level: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    /// Load the profile's config, or defaults if the file does not exist
    pub fn load(profile: Option<&str>) -> Result<Self> {
        Self::load_from(&Self::config_path(profile)?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, profile: Option<&str>) -> Result<PathBuf> {
        let path = Self::config_path(profile)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path(profile: Option<&str>) -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| DynaformError::Config("Cannot find home directory".into()))?;
        let filename = match profile {
            Some(p) => format!("config.{}.toml", p),
            None => "config.toml".to_string(),
        };
        Ok(home.join(".dynaform").join(filename))
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api_url" => {
                url::Url::parse(value)?;
                self.api_url = Some(value.to_string());
            }
            "default_format" => {
                OutputFormat::from_str(value, true)
                    .map_err(|_| DynaformError::Config(format!("Unknown format: {}", value)))?;
                self.default_format = Some(value.to_lowercase());
            }
            "log_level" => self.log_level = Some(value.to_string()),
            "request_timeout_secs" => {
                let secs = value.parse().map_err(|_| {
                    DynaformError::Config(format!("Not a number of seconds: {}", value))
                })?;
                self.request_timeout_secs = Some(secs);
            }
            _ => return Err(DynaformError::Config(format!("Unknown config key: {}", key))),
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        match key {
            "api_url" => Ok(self.api_url.clone()),
            "default_format" => Ok(self.default_format.clone()),
            "log_level" => Ok(self.log_level.clone()),
            "request_timeout_secs" => Ok(self.request_timeout_secs.map(|s| s.to_string())),
            _ => Err(DynaformError::Config(format!("Unknown config key: {}", key))),
        }
    }

    pub fn format(&self) -> Option<OutputFormat> {
        self.default_format
            .as_deref()
            .and_then(|f| OutputFormat::from_str(f, true).ok())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
