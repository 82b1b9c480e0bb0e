//! Hybrid search combining vector and lexical queries

use crate::config::RetrievalConfig;
use crate::retrieval::{
    reciprocal_rank_fusion, BackendError, Filter, FusedResult, SearchBackend,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Both backend queries over-fetch by this factor, trading extra backend
/// cost for fusion quality. Fixed policy.
const OVERFETCH_FACTOR: usize = 2;

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("vector query failed: {0}")]
    VectorQuery(BackendError),

    #[error("lexical query failed: {0}")]
    LexicalQuery(BackendError),

    #[error("backend query timed out after {0:?}")]
    Timeout(Duration),
}

/// Issues concurrent vector and lexical queries against the search backend
/// and fuses their rankings.
///
/// Both queries carry the same filters so the fused candidate pools are
/// comparably constrained, and the same timeout so one query cannot hang the
/// other. If either query fails the whole search fails; there is no silent
/// degrade to single-mode search.
pub struct HybridRetriever<B> {
    backend: Arc<B>,
    config: RetrievalConfig,
}

impl<B: SearchBackend> HybridRetriever<B> {
    pub fn new(backend: Arc<B>, config: RetrievalConfig) -> Self {
        Self { backend, config }
    }

    /// Hybrid search for the top `k` chunks.
    ///
    /// `alpha` weights the vector ranking; `1 - alpha` the lexical ranking.
    pub async fn search(
        &self,
        query_text: &str,
        query_vector: &[f32],
        k: usize,
        alpha: f64,
        filters: Option<&Filter>,
    ) -> Result<Vec<FusedResult>, RetrievalError> {
        if query_text.is_empty() {
            return Err(RetrievalError::InvalidQuery(
                "query text cannot be empty".to_string(),
            ));
        }
        if k == 0 {
            return Err(RetrievalError::InvalidQuery(
                "k must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&alpha) {
            return Err(RetrievalError::InvalidQuery(format!(
                "alpha must be within [0, 1], got {alpha}"
            )));
        }

        let candidates = k * OVERFETCH_FACTOR;
        let timeout = Duration::from_millis(self.config.query_timeout_ms);

        let (vector_outcome, lexical_outcome) = tokio::join!(
            tokio::time::timeout(
                timeout,
                self.backend.vector_search(query_vector, candidates, filters),
            ),
            tokio::time::timeout(
                timeout,
                self.backend.lexical_search(query_text, candidates, filters),
            ),
        );

        let vector_results = vector_outcome
            .map_err(|_| RetrievalError::Timeout(timeout))?
            .map_err(RetrievalError::VectorQuery)?;
        let lexical_results = lexical_outcome
            .map_err(|_| RetrievalError::Timeout(timeout))?
            .map_err(RetrievalError::LexicalQuery)?;

        tracing::debug!(
            vector = vector_results.len(),
            lexical = lexical_results.len(),
            k,
            alpha,
            "fusing ranked lists"
        );

        Ok(reciprocal_rank_fusion(
            vector_results,
            lexical_results,
            k,
            alpha,
            self.config.rank_constant,
        ))
    }
}
