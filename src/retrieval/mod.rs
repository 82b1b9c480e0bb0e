//! Hybrid retrieval: parallel vector and lexical queries against the search
//! backend, fused with Reciprocal Rank Fusion.

mod backend;
mod fusion;
mod hybrid;

pub use backend::{BackendError, IndexDocument, SearchBackend};
pub use fusion::reciprocal_rank_fusion;
pub use hybrid::{HybridRetriever, RetrievalError};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One scored hit from a vector or lexical query. Ephemeral; not persisted
/// by this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub score: f64,
    pub text: String,
    pub metadata: Map<String, Value>,
}

/// A search result with its RRF-combined score. Result lists are ordered
/// descending by `fused_score`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusedResult {
    pub fused_score: f64,
    #[serde(flatten)]
    pub result: SearchResult,
}

/// Metadata filters applied identically to both query modes so the fused
/// candidate pools are comparably constrained. Entries are AND-combined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter(pub BTreeMap<String, FilterValue>);

/// A single value means equality match; a set means membership match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Many(Vec<Value>),
    One(Value),
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`.
    pub fn equals(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), FilterValue::One(value.into()));
        self
    }

    /// Require `field` to match any of `values`.
    pub fn any_of<V: Into<Value>>(
        mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.0.insert(
            field.into(),
            FilterValue::Many(values.into_iter().map(Into::into).collect()),
        );
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
