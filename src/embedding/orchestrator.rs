//! Embedding orchestration: truncation, retry, validation, batch pacing

use crate::config::EmbeddingConfig;
use crate::embedding::{
    call_with_retry, InvokeError, ModelFamily, ModelInvoker, RetryError, RetryPolicy, Sleeper,
    TokioSleeper,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Failures surfaced by the embedding orchestrator. Never silently
/// swallowed; one unrecoverable failure aborts the remaining batch.
#[derive(Error, Debug)]
pub enum EmbeddingProviderError {
    #[error("embedding retries exhausted after {attempts} attempts: {source}")]
    RetriesExhausted { attempts: usize, source: InvokeError },

    #[error("embedding provider call failed: {0}")]
    Provider(InvokeError),

    #[error("could not extract embedding from {family:?} response")]
    MalformedResponse { family: ModelFamily },

    #[error("unsupported embedding model id: {0}")]
    UnsupportedModel(String),
}

/// Turns chunk text into vectors through the [`ModelInvoker`] collaborator.
///
/// Inputs are truncated to the family's character budget before sending
/// (silent, but counted and logged). Throttling-class failures retry with
/// exponential backoff; hard provider faults fail on first occurrence. A
/// returned vector whose length disagrees with the model's declared
/// dimension is logged as a warning but still returned: the index layer owns
/// the dimension agreement contract with the search backend schema.
pub struct EmbeddingOrchestrator<P> {
    invoker: P,
    model_id: String,
    family: ModelFamily,
    expected_dimension: Option<usize>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    batch_size: usize,
    inter_batch_delay: Duration,
    truncations: AtomicU64,
}

impl<P: ModelInvoker> EmbeddingOrchestrator<P> {
    pub fn new(invoker: P, config: &EmbeddingConfig) -> Result<Self, EmbeddingProviderError> {
        Self::with_sleeper(invoker, config, Arc::new(TokioSleeper))
    }

    /// Like [`Self::new`] but with an injected sleeper, so backoff and batch
    /// pacing can be observed in tests.
    pub fn with_sleeper(
        invoker: P,
        config: &EmbeddingConfig,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, EmbeddingProviderError> {
        let family = ModelFamily::for_model_id(&config.model_id)
            .ok_or_else(|| EmbeddingProviderError::UnsupportedModel(config.model_id.clone()))?;
        let expected_dimension = ModelFamily::dimension_for(&config.model_id);

        tracing::info!(
            model_id = %config.model_id,
            ?family,
            ?expected_dimension,
            "initialized embedding orchestrator"
        );

        Ok(Self {
            invoker,
            model_id: config.model_id.clone(),
            family,
            expected_dimension,
            policy: RetryPolicy::new(config.max_retries, Duration::from_secs(1)),
            sleeper,
            batch_size: config.batch_size.max(1),
            inter_batch_delay: Duration::from_millis(config.inter_batch_delay_ms),
            truncations: AtomicU64::new(0),
        })
    }

    /// Generate the embedding for a single text.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingProviderError> {
        let text = self.truncate(text);
        let request = self.family.build_request(text);

        let response = call_with_retry(
            &self.policy,
            self.sleeper.as_ref(),
            InvokeError::is_retryable,
            || self.invoker.invoke(&self.model_id, &request),
        )
        .await
        .map_err(|e| match e {
            RetryError::Exhausted { attempts, last } => {
                EmbeddingProviderError::RetriesExhausted {
                    attempts,
                    source: last,
                }
            }
            RetryError::Fatal(source) => EmbeddingProviderError::Provider(source),
        })?;

        let vector = self
            .family
            .parse_response(&response)
            .ok_or(EmbeddingProviderError::MalformedResponse {
                family: self.family,
            })?;

        if let Some(expected) = self.expected_dimension {
            if vector.len() != expected {
                tracing::warn!(
                    actual = vector.len(),
                    expected,
                    "unexpected embedding dimension"
                );
            }
        }

        Ok(vector)
    }

    /// Generate embeddings for multiple texts, order-preserving.
    ///
    /// Partitions the input into groups of `batch_size`, embeds sequentially
    /// within a group, and sleeps a fixed delay between groups to respect
    /// provider rate limits. The first unrecoverable failure aborts the
    /// remaining batch; there is no partial-success mode.
    pub async fn embed_batch(
        &self,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, EmbeddingProviderError> {
        let mut embeddings = Vec::with_capacity(texts.len());

        let group_count = texts.len().div_ceil(self.batch_size);
        for (group_index, group) in texts.chunks(self.batch_size).enumerate() {
            tracing::info!(
                group = group_index + 1,
                of = group_count,
                size = group.len(),
                "embedding batch group"
            );

            for text in group {
                embeddings.push(self.embed(text).await?);
            }

            if group_index + 1 < group_count {
                self.sleeper.sleep(self.inter_batch_delay).await;
            }
        }

        tracing::info!(count = embeddings.len(), "generated embeddings");
        Ok(embeddings)
    }

    /// Number of inputs truncated to the provider's character budget so far.
    pub fn truncation_count(&self) -> u64 {
        self.truncations.load(Ordering::Relaxed)
    }

    fn truncate<'a>(&self, text: &'a str) -> &'a str {
        let budget = self.family.max_input_chars();
        if text.len() <= budget {
            return text;
        }

        let mut end = budget;
        while !text.is_char_boundary(end) {
            end -= 1;
        }

        self.truncations.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(
            from = text.len(),
            to = end,
            "truncating text before embedding"
        );
        &text[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct MockInvoker {
        responses: Mutex<VecDeque<Result<Value, InvokeError>>>,
        requests: Mutex<Vec<Value>>,
    }

    impl MockInvoker {
        fn new(responses: Vec<Result<Value, InvokeError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn titan_ok(vector: &[f32]) -> Result<Value, InvokeError> {
            Ok(json!({ "embedding": vector }))
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn request(&self, index: usize) -> Value {
            self.requests.lock().unwrap()[index].clone()
        }
    }

    #[async_trait]
    impl ModelInvoker for MockInvoker {
        async fn invoke(&self, _model_id: &str, request: &Value) -> Result<Value, InvokeError> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(InvokeError::Provider("no scripted response".into())))
        }
    }

    struct RecordingSleeper {
        waits: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        fn new() -> Self {
            Self {
                waits: Mutex::new(Vec::new()),
            }
        }

        fn waits(&self) -> Vec<Duration> {
            self.waits.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.waits.lock().unwrap().push(duration);
        }
    }

    fn config() -> EmbeddingConfig {
        EmbeddingConfig {
            model_id: "amazon.titan-embed-text-v1".to_string(),
            batch_size: 2,
            max_retries: 3,
            inter_batch_delay_ms: 500,
        }
    }

    fn orchestrator(
        invoker: MockInvoker,
    ) -> (EmbeddingOrchestrator<MockInvoker>, Arc<RecordingSleeper>) {
        let sleeper = Arc::new(RecordingSleeper::new());
        let orchestrator =
            EmbeddingOrchestrator::with_sleeper(invoker, &config(), sleeper.clone()).unwrap();
        (orchestrator, sleeper)
    }

    #[test]
    fn rejects_unknown_model_id() {
        let mut cfg = config();
        cfg.model_id = "acme.super-embed-v9".to_string();

        let result = EmbeddingOrchestrator::new(MockInvoker::new(vec![]), &cfg);
        assert!(matches!(
            result.err(),
            Some(EmbeddingProviderError::UnsupportedModel(_))
        ));
    }

    #[tokio::test]
    async fn embeds_a_single_text() {
        let invoker = MockInvoker::new(vec![MockInvoker::titan_ok(&[0.1, 0.2, 0.3])]);
        let (orchestrator, _) = orchestrator(invoker);

        let vector = orchestrator.embed("RSI shows overbought at 75.").await.unwrap();
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
        assert_eq!(
            orchestrator.invoker.request(0)["inputText"],
            "RSI shows overbought at 75."
        );
    }

    #[tokio::test]
    async fn throttled_twice_then_succeeds_with_recorded_backoffs() {
        let invoker = MockInvoker::new(vec![
            Err(InvokeError::Throttled("slow down".into())),
            Err(InvokeError::Throttled("slow down".into())),
            MockInvoker::titan_ok(&[1.0, 2.0]),
        ]);
        let (orchestrator, sleeper) = orchestrator(invoker);

        let vector = orchestrator.embed("buy the dip").await.unwrap();
        assert_eq!(vector, vec![1.0, 2.0]);
        assert_eq!(
            sleeper.waits(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[tokio::test]
    async fn exhausted_retries_carry_the_last_error() {
        let invoker = MockInvoker::new(vec![
            Err(InvokeError::Throttled("1".into())),
            Err(InvokeError::Throttled("2".into())),
            Err(InvokeError::Throttled("3".into())),
        ]);
        let (orchestrator, _) = orchestrator(invoker);

        let err = orchestrator.embed("text").await.unwrap_err();
        match err {
            EmbeddingProviderError::RetriesExhausted { attempts, source } => {
                assert_eq!(attempts, 3);
                assert!(matches!(source, InvokeError::Throttled(msg) if msg == "3"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn hard_provider_fault_fails_without_retry() {
        let invoker = MockInvoker::new(vec![Err(InvokeError::Provider("bad request".into()))]);
        let (orchestrator, sleeper) = orchestrator(invoker);

        let err = orchestrator.embed("text").await.unwrap_err();
        assert!(matches!(err, EmbeddingProviderError::Provider(_)));
        assert_eq!(orchestrator.invoker.request_count(), 1);
        assert!(sleeper.waits().is_empty());
    }

    #[tokio::test]
    async fn dimension_mismatch_warns_but_returns_the_vector() {
        // titan-embed-text-v1 declares 1536 dims; a 3-dim response is soft.
        let invoker = MockInvoker::new(vec![MockInvoker::titan_ok(&[0.5, 0.5, 0.5])]);
        let (orchestrator, _) = orchestrator(invoker);

        let vector = orchestrator.embed("text").await.unwrap();
        assert_eq!(vector.len(), 3);
    }

    #[tokio::test]
    async fn truncates_oversized_input_and_counts_it() {
        let invoker = MockInvoker::new(vec![MockInvoker::titan_ok(&[0.0])]);
        let (orchestrator, _) = orchestrator(invoker);

        let long_text = "a".repeat(40_000);
        orchestrator.embed(&long_text).await.unwrap();

        let sent = orchestrator.invoker.request(0)["inputText"]
            .as_str()
            .unwrap()
            .len();
        assert_eq!(sent, 32_000);
        assert_eq!(orchestrator.truncation_count(), 1);
    }

    #[tokio::test]
    async fn batch_preserves_order_and_paces_groups() {
        let invoker = MockInvoker::new(vec![
            MockInvoker::titan_ok(&[1.0]),
            MockInvoker::titan_ok(&[2.0]),
            MockInvoker::titan_ok(&[3.0]),
        ]);
        let (orchestrator, sleeper) = orchestrator(invoker);

        let texts = vec!["one".to_string(), "two".to_string(), "three".to_string()];
        let vectors = orchestrator.embed_batch(&texts).await.unwrap();

        assert_eq!(vectors, vec![vec![1.0], vec![2.0], vec![3.0]]);
        // batch_size 2 → two groups → one inter-group delay.
        assert_eq!(sleeper.waits(), vec![Duration::from_millis(500)]);
    }

    #[tokio::test]
    async fn batch_aborts_on_first_unrecoverable_failure() {
        let invoker = MockInvoker::new(vec![
            MockInvoker::titan_ok(&[1.0]),
            Err(InvokeError::Provider("boom".into())),
            MockInvoker::titan_ok(&[3.0]),
        ]);
        let (orchestrator, _) = orchestrator(invoker);

        let texts = vec!["one".to_string(), "two".to_string(), "three".to_string()];
        let err = orchestrator.embed_batch(&texts).await.unwrap_err();

        assert!(matches!(err, EmbeddingProviderError::Provider(_)));
        // The third text was never sent.
        assert_eq!(orchestrator.invoker.request_count(), 2);
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let invoker = MockInvoker::new(vec![]);
        let (orchestrator, sleeper) = orchestrator(invoker);

        let vectors = orchestrator.embed_batch(&[]).await.unwrap();
        assert!(vectors.is_empty());
        assert!(sleeper.waits().is_empty());
    }
}
