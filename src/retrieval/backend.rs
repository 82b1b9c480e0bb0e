//! Search backend collaborator seam

use crate::retrieval::{Filter, SearchResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Backend failures, reported per query or upsert call.
#[derive(Error, Debug, Clone)]
pub enum BackendError {
    #[error("backend query failed: {0}")]
    Query(String),

    #[error("backend indexing failed: {0}")]
    Index(String),
}

/// One chunk as handed to the backend's upsert call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDocument {
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
    pub metadata: Map<String, Value>,
}

/// The query/index contract this crate consumes.
///
/// The backend owns its index schema: an analyzed text field for lexical
/// relevance, a nearest-neighbor vector field whose dimension must agree
/// with the embedding model, and filterable metadata sub-fields. Both query
/// modes accept the same [`Filter`] grammar.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn upsert(&self, documents: &[IndexDocument]) -> Result<(), BackendError>;

    async fn vector_search(
        &self,
        vector: &[f32],
        k: usize,
        filters: Option<&Filter>,
    ) -> Result<Vec<SearchResult>, BackendError>;

    async fn lexical_search(
        &self,
        query: &str,
        k: usize,
        filters: Option<&Filter>,
    ) -> Result<Vec<SearchResult>, BackendError>;
}
