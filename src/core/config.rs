//! Client configuration.
//!
//! A small TOML file under the platform config directory. Every field is
//! optional; missing values fall back to the built-in defaults, and the
//! `MAUM_API_URL` environment variable overrides the configured base URL.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Base URL of the deployed service.
pub const DEFAULT_API_URL: &str = "https://hearthug.netlify.app/api";

const API_URL_ENV: &str = "MAUM_API_URL";

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    /// API base URL, e.g. `http://localhost:4000/api` for local development.
    pub api_base_url: Option<String>,
    /// Conversation style the chat starts with ("default", "cheerful",
    /// "calm", "wise").
    pub default_style: Option<String>,
    /// Transcript log file enabled at startup.
    pub log_file: Option<String>,
}

impl Config {
    pub fn load() -> Result<Config, Box<dyn std::error::Error>> {
        Self::load_from_path(&get_config_path()?)
    }

    pub fn load_from_path(config_path: &PathBuf) -> Result<Config, Box<dyn std::error::Error>> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to_path(&get_config_path()?)
    }

    pub fn save_to_path(&self, config_path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Effective base URL: environment override, then config file, then the
    /// deployed service.
    pub fn api_base_url(&self) -> String {
        if let Ok(url) = env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                return url;
            }
        }
        self.api_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }
}

pub fn config_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let proj_dirs = ProjectDirs::from("org", "permacommons", "maum")
        .ok_or("Failed to determine config directory")?;
    Ok(proj_dirs.config_dir().to_path_buf())
}

fn get_config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    Ok(config_dir()?.join("config.toml"))
}
