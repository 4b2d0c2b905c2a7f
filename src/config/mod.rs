use std::env;
use std::fs;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
}

/// Which catalog API endpoint the client talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Local,
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub local_url: String,
    pub remote_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("BIBLIO_ENV").as_deref() {
            Ok("remote") => Environment::Remote,
            _ => Environment::Local,
        };

        let mut config = Self {
            environment,
            api: ApiConfig {
                local_url: "http://localhost:8000".to_string(),
                remote_url: "https://biblioteca-api.fly.dev".to_string(),
            },
        };

        if let Ok(v) = env::var("BIBLIO_API_LOCAL") {
            config.api.local_url = v;
        }
        if let Ok(v) = env::var("BIBLIO_API_REMOTE") {
            config.api.remote_url = v;
        }

        config
    }

    /// Base URL of the selected API endpoint, without a trailing slash.
    pub fn base_url(&self) -> &str {
        let url = match self.environment {
            Environment::Local => &self.api.local_url,
            Environment::Remote => &self.api.remote_url,
        };
        url.trim_end_matches('/')
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

/// Directory holding persisted client state (the bearer token slot).
pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = env::var("BIBLIO_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("biblioteca").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}
