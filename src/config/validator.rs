use crate::config::Config;
use crate::embedding::ModelFamily;
use crate::error::{Result, TradekbError, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_chunking(config, &mut errors);
        Self::validate_embedding(config, &mut errors);
        Self::validate_retrieval(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(TradekbError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_chunking(config: &Config, errors: &mut Vec<ValidationError>) {
        let c = &config.chunking;
        if c.chunk_size == 0 {
            errors.push(ValidationError::new(
                "chunking.chunk_size",
                "chunk_size must be greater than zero",
            ));
        }
        if c.overlap >= c.chunk_size {
            errors.push(ValidationError::new(
                "chunking.overlap",
                format!(
                    "overlap ({}) must be smaller than chunk_size ({})",
                    c.overlap, c.chunk_size
                ),
            ));
        }
        if c.min_chunk_size > c.chunk_size {
            errors.push(ValidationError::new(
                "chunking.min_chunk_size",
                format!(
                    "min_chunk_size ({}) must not exceed chunk_size ({})",
                    c.min_chunk_size, c.chunk_size
                ),
            ));
        }
    }

    fn validate_embedding(config: &Config, errors: &mut Vec<ValidationError>) {
        let e = &config.embedding;
        if e.batch_size == 0 {
            errors.push(ValidationError::new(
                "embedding.batch_size",
                "batch_size must be greater than zero",
            ));
        }
        if e.max_retries == 0 {
            errors.push(ValidationError::new(
                "embedding.max_retries",
                "max_retries must be at least 1",
            ));
        }
        if ModelFamily::for_model_id(&e.model_id).is_none() {
            errors.push(ValidationError::new(
                "embedding.model_id",
                format!("No known model family for '{}'", e.model_id),
            ));
        }
    }

    fn validate_retrieval(config: &Config, errors: &mut Vec<ValidationError>) {
        let r = &config.retrieval;
        if r.rank_constant == 0 {
            errors.push(ValidationError::new(
                "retrieval.rank_constant",
                "rank_constant must be greater than zero",
            ));
        }
        if r.query_timeout_ms == 0 {
            errors.push(ValidationError::new(
                "retrieval.query_timeout_ms",
                "query_timeout_ms must be greater than zero",
            ));
        }
    }
}
