use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_server_url() -> String {
    "http://localhost:3000".into()
}

fn default_port() -> u16 {
    3000
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("student-portal"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

/// Anchor for "today" on the calendar and for past-due markers.
pub fn default_reference_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 9).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    #[serde(default = "default_reference_today")]
    pub reference_today: NaiveDate,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            port: default_port(),
            data_dir: default_data_dir(),
            public_dir: default_public_dir(),
            upload_dir: default_upload_dir(),
            reference_today: default_reference_today(),
        }
    }
}

impl Config {
    /// Config file if present, otherwise defaults; environment variables
    /// override either.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config at {}", path.display()))?;
                Self::from_toml(&contents)?
            }
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).with_context(|| "Failed to parse config.toml")
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = var("PORTAL_URL") {
            self.server_url = url;
        }
        if let Some(port) = var("PORTAL_PORT") {
            self.port = port
                .parse()
                .with_context(|| format!("PORTAL_PORT is not a port number: {port}"))?;
        }
        if let Some(dir) = var("PORTAL_DATA_DIR") {
            self.data_dir = dir.into();
        }
        if let Some(dir) = var("PORTAL_PUBLIC_DIR") {
            self.public_dir = dir.into();
        }
        if let Some(dir) = var("PORTAL_UPLOAD_DIR") {
            self.upload_dir = dir.into();
        }
        if let Some(today) = var("PORTAL_TODAY") {
            self.reference_today = today
                .parse()
                .with_context(|| format!("PORTAL_TODAY must be YYYY-MM-DD, got {today}"))?;
        }
        Ok(())
    }

    pub fn generate_default() -> Result<PathBuf> {
        let path = Self::config_path()
            .with_context(|| "Could not determine config directory")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_str = toml::to_string_pretty(&Config::default())?;
        std::fs::write(&path, toml_str)?;
        Ok(path)
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("student-portal").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_in_defaults() {
        let config = Config::from_toml("server_url = \"http://portal.test:8080\"\n").unwrap();
        assert_eq!(config.server_url, "http://portal.test:8080");
        assert_eq!(config.port, 3000);
        assert_eq!(config.reference_today, default_reference_today());
    }

    #[test]
    fn reference_today_is_configurable() {
        let config = Config::from_toml("reference_today = \"2026-01-15\"\n").unwrap();
        assert_eq!(config.reference_today, NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = Config::default();
        config
            .apply_env(|key| match key {
                "PORTAL_PORT" => Some("4100".into()),
                "PORTAL_TODAY" => Some("2025-10-01".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.port, 4100);
        assert_eq!(config.reference_today.to_string(), "2025-10-01");
    }

    #[test]
    fn bad_env_values_are_reported() {
        let mut config = Config::default();
        let err = config
            .apply_env(|key| (key == "PORTAL_PORT").then(|| "lots".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("PORTAL_PORT"));
    }

    #[test]
    fn default_round_trips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), Config::default());
    }
}
