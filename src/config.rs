//! Application settings: where invoice data and rendered documents live,
//! and which invoice service to talk to. Stored as TOML in the platform
//! config directory.

use std::fs;
use std::path::PathBuf;

use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {}: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub data_root: String,
    #[serde(default = "default_store_url")]
    pub store_url: String,
}

fn default_store_url() -> String {
    "http://localhost:3001".to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            data_root: "~/Documents/Invoices".to_string(),
            store_url: default_store_url(),
        }
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "invoice-desk", "app") {
        let config_dir = proj_dirs.config_dir();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).ok();
        }
        return config_dir.join("settings.toml");
    }
    PathBuf::from("settings.toml")
}

pub fn load_settings() -> Option<AppSettings> {
    let path = get_config_path();
    if !path.exists() {
        return None;
    }
    let content = fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

pub fn save_settings(settings: &AppSettings) -> Result<(), ConfigError> {
    let path = get_config_path();
    let toml_str = toml::to_string_pretty(settings).expect("settings serialize to TOML");
    fs::write(&path, toml_str).map_err(|source| ConfigError::Io { path, source })
}

pub fn expand_home_dir(path: &str) -> String {
    if path.starts_with("~") {
        if let Some(base_dirs) = BaseDirs::new() {
            let home = base_dirs.home_dir().to_string_lossy();
            return path.replacen("~", &home, 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_round_trip_through_toml() {
        let settings = AppSettings {
            data_root: "~/Documents/Invoices".to_string(),
            store_url: "http://billing.internal:8080".to_string(),
        };
        let text = toml::to_string_pretty(&settings).unwrap();
        let parsed: AppSettings = toml::from_str(&text).unwrap();
        assert_eq!(parsed.data_root, settings.data_root);
        assert_eq!(parsed.store_url, settings.store_url);
    }

    #[test]
    fn missing_store_url_gets_the_default() {
        let parsed: AppSettings = toml::from_str("data_root = \"/srv/invoices\"").unwrap();
        assert_eq!(parsed.store_url, "http://localhost:3001");
    }

    #[test]
    fn expand_home_only_touches_leading_tilde() {
        assert_eq!(expand_home_dir("/absolute/path"), "/absolute/path");
        let expanded = expand_home_dir("~/Documents/Invoices");
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("/Documents/Invoices"));
    }
}
