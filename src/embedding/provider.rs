//! Embedding provider collaborator seam

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Failure classes reported by a provider invocation.
///
/// `Throttled` and `Timeout` are the retryable class; everything else is a
/// hard fault and fails the call on first occurrence.
#[derive(Error, Debug, Clone)]
pub enum InvokeError {
    #[error("provider throttled the request: {0}")]
    Throttled(String),

    #[error("provider request timed out: {0}")]
    Timeout(String),

    #[error("provider error: {0}")]
    Provider(String),
}

impl InvokeError {
    /// Whether this failure belongs to the retryable (throttling) class.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Throttled(_) | Self::Timeout(_))
    }
}

/// External embedding provider.
///
/// The request and response bodies are raw JSON envelopes; their shape is
/// model-family specific and owned by [`crate::embedding::ModelFamily`].
/// Implementations cover the actual transport (e.g. an AWS Bedrock runtime
/// client) and credential handling, both outside this crate's scope.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, model_id: &str, request: &Value) -> Result<Value, InvokeError>;
}
