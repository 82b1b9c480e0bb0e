//! Embedding generation through an external provider
//!
//! The provider is reached through the [`ModelInvoker`] seam; this module
//! owns request shaping per model family, truncation, retry with exponential
//! backoff, and batch pacing.

mod model;
mod orchestrator;
mod provider;
mod retry;

pub use model::ModelFamily;
pub use orchestrator::{EmbeddingOrchestrator, EmbeddingProviderError};
pub use provider::{InvokeError, ModelInvoker};
pub use retry::{call_with_retry, RetryError, RetryPolicy, Sleeper, TokioSleeper};
