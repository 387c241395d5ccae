// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{ChallengeError, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub page_size: u32,
    pub page_delay_ms: u64,
    pub tag_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub backup_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    pub dir: PathBuf,
    pub expiry_hours: u64,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("CHALLENGE_SYNC")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| ChallengeError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| ChallengeError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            api: ApiConfig {
                base_url: "https://dev.to/api".to_string(),
                page_size: 30,
                page_delay_ms: 100,
                tag_delay_ms: 2000,
            },
            storage: StorageConfig {
                data_dir: PathBuf::from("./public/data"),
                backup_dir: PathBuf::from("./backup"),
            },
            cache: CacheConfig {
                dir: PathBuf::from("./.cache"),
                expiry_hours: 24,
            },
        }
    }

    fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            return Err(ChallengeError::Config(
                "api.base_url must not be empty".to_string(),
            ));
        }

        if self.api.page_size == 0 {
            return Err(ChallengeError::Config(
                "api.page_size must be greater than 0".to_string(),
            ));
        }

        if self.cache.expiry_hours == 0 {
            return Err(ChallengeError::Config(
                "cache.expiry_hours must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
