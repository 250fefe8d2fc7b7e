//! Configuration module for loading TOML config files.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ArenaError;
use crate::topic::{Topic, TopicCatalog};

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Replaces the built-in catalog when non-empty.
    #[serde(default)]
    pub topics: Vec<Topic>,
}

/// Where the ledger and active sessions are kept.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub history_file: String,
    pub sessions_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            history_file: "debate-history.json".to_string(),
            sessions_file: "active-debates.json".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(&self.history_file)
    }

    pub fn sessions_path(&self) -> PathBuf {
        self.data_dir.join(&self.sessions_file)
    }
}

/// Models used for the opponent and the judges.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub opponent: ModelConfig,
    pub judge: ModelConfig,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            opponent: ModelConfig {
                temperature: 0.8,
                ..ModelConfig::default()
            },
            judge: ModelConfig {
                temperature: 0.2,
                ..ModelConfig::default()
            },
        }
    }
}

/// Settings for one model role.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub name: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Attempts per request, including the first.
    pub max_retries: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "gpt-4o-mini".to_string(),
            max_tokens: 500,
            temperature: 0.8,
            max_retries: 3,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ArenaError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ArenaError::ConfigError(format!("Failed to read config: {}", e)))?;

        Self::from_toml_str(&content)
    }

    /// Load configuration from string content.
    pub fn from_toml_str(content: &str) -> Result<Self, ArenaError> {
        toml::from_str(content)
            .map_err(|e| ArenaError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// The configured topics, or the built-in catalog when none are given.
    pub fn catalog(&self) -> TopicCatalog {
        if self.topics.is_empty() {
            TopicCatalog::builtin()
        } else {
            TopicCatalog::new(self.topics.clone())
        }
    }
}

/// Default configuration embedded in the binary.
pub fn default_config() -> Config {
    Config {
        storage: StorageConfig::default(),
        generation: GenerationConfig::default(),
        topics: Vec::new(),
    }
}
