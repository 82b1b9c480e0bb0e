//! Model-family request/response strategy
//!
//! Each supported provider family has its own request envelope and response
//! field names. The family is resolved from the model identifier once at
//! configuration time; call sites never string-match on the id.

use serde_json::{json, Value};

/// Approximate characters per token, used to turn the provider's token limit
/// into a conservative character budget.
const CHARS_PER_TOKEN: usize = 4;

/// Supported embedding model families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    Titan,
    Cohere,
}

impl ModelFamily {
    /// Resolve the family for a model identifier. `None` means the id is
    /// unsupported and should be rejected at configuration time.
    pub fn for_model_id(model_id: &str) -> Option<Self> {
        let id = model_id.to_ascii_lowercase();
        if id.contains("titan") {
            Some(Self::Titan)
        } else if id.contains("cohere") {
            Some(Self::Cohere)
        } else {
            None
        }
    }

    /// Expected vector dimension for a known model identifier.
    pub fn dimension_for(model_id: &str) -> Option<usize> {
        match model_id {
            "amazon.titan-embed-text-v1" => Some(1536),
            "amazon.titan-embed-text-v2:0" => Some(1024),
            "cohere.embed-english-v3" | "cohere.embed-multilingual-v3" => Some(1024),
            _ => None,
        }
    }

    /// Provider token limit for one input text.
    pub fn max_input_tokens(&self) -> usize {
        // Both supported families accept 8K-token inputs.
        8000
    }

    /// Character budget derived from the token limit.
    pub fn max_input_chars(&self) -> usize {
        self.max_input_tokens() * CHARS_PER_TOKEN
    }

    /// Build the family-specific request envelope for one text.
    pub fn build_request(&self, text: &str) -> Value {
        match self {
            Self::Titan => json!({ "inputText": text }),
            Self::Cohere => json!({
                "texts": [text],
                "input_type": "search_document",
                "truncate": "END",
            }),
        }
    }

    /// Extract the embedding vector from the family-specific response body.
    pub fn parse_response(&self, body: &Value) -> Option<Vec<f32>> {
        let values = match self {
            Self::Titan => body.get("embedding")?.as_array()?,
            Self::Cohere => body.get("embeddings")?.as_array()?.first()?.as_array()?,
        };

        values
            .iter()
            .map(|v| v.as_f64().map(|f| f as f32))
            .collect()
    }
}
