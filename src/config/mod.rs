//! Configuration management for tradekb
//!
//! Handles loading, validation, and persistence of the library configuration.
//! All tunables that govern chunking, embedding, and retrieval live here so
//! that invalid parameters are rejected before any work starts.

use crate::error::{Result, TradekbError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub chunking: ChunkingConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Chunking configuration (character budgets)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Characters of trailing context repeated at the start of the next chunk
    pub overlap: usize,
    /// Chunks shorter than this are dropped
    pub min_chunk_size: usize,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider model identifier (e.g. "amazon.titan-embed-text-v1")
    pub model_id: String,
    /// Number of texts embedded per batch group
    pub batch_size: usize,
    /// Maximum attempts for throttled provider calls
    pub max_retries: usize,
    /// Fixed delay between batch groups, in milliseconds
    pub inter_batch_delay_ms: u64,
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Rank constant in the RRF formula (commonly 60)
    pub rank_constant: u32,
    /// Timeout applied to each backend query, in milliseconds
    pub query_timeout_ms: u64,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TradekbError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| TradekbError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        // Apply environment variable overrides
        config.apply_env_overrides();

        // Validate configuration
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| TradekbError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: TRADEKB_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("TRADEKB_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "EMBEDDING__MODEL_ID" => {
                self.embedding.model_id = value.to_string();
            }
            "EMBEDDING__BATCH_SIZE" => {
                self.embedding.batch_size = Self::parse_env(path, value)?;
            }
            "EMBEDDING__MAX_RETRIES" => {
                self.embedding.max_retries = Self::parse_env(path, value)?;
            }
            "CHUNKING__CHUNK_SIZE" => {
                self.chunking.chunk_size = Self::parse_env(path, value)?;
            }
            "CHUNKING__OVERLAP" => {
                self.chunking.overlap = Self::parse_env(path, value)?;
            }
            "RETRIEVAL__QUERY_TIMEOUT_MS" => {
                self.retrieval.query_timeout_ms = Self::parse_env(path, value)?;
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    fn parse_env<T: std::str::FromStr>(path: &str, value: &str) -> Result<T> {
        value.parse().map_err(|_| TradekbError::InvalidConfigValue {
            path: path.to_string(),
            message: format!("Cannot parse '{}'", value),
        })
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| TradekbError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("tradekb").join("config.toml"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: "1.0.0".to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            chunking: ChunkingConfig {
                chunk_size: 1000,
                overlap: 200,
                min_chunk_size: 100,
            },
            embedding: EmbeddingConfig {
                model_id: "amazon.titan-embed-text-v1".to_string(),
                batch_size: 25,
                max_retries: 3,
                inter_batch_delay_ms: 500,
            },
            retrieval: RetrievalConfig {
                rank_constant: 60,
                query_timeout_ms: 30_000,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");

        let config = Config::default();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.chunking.chunk_size, config.chunking.chunk_size);
        assert_eq!(loaded.embedding.model_id, config.embedding.model_id);
        assert_eq!(loaded.retrieval.rank_constant, config.retrieval.rank_constant);
    }

    #[test]
    fn load_missing_file_fails() {
        let result = Config::load(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(TradekbError::ConfigNotFound { .. })));
    }
}
