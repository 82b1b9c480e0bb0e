//! Document model: caller-supplied metadata and the chunk records the
//! chunker emits.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Metadata for a trading document, supplied by the caller before chunking.
///
/// `page_count` is filled in by the (external) extraction step and copied
/// verbatim into every chunk's metadata snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: String,
    pub author: Option<String>,
    /// swing_trading, technical_analysis, risk_management, ...
    pub strategy_type: String,
    /// "3-7 days", "7-14 days", ...
    pub timeframe: String,
    /// trending, ranging, volatile
    pub market_conditions: Vec<String>,
    /// equities, forex, commodities
    pub asset_class: Vec<String>,
    pub key_concepts: Vec<String>,
    pub source_file: String,
    /// test_doc, ebook, article, ...
    pub document_type: String,
    pub page_count: Option<u32>,
}

impl DocumentMetadata {
    /// Build the metadata snapshot carried by one chunk.
    pub fn chunk_metadata(&self, chunk_index: usize) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("title".to_string(), json!(self.title));
        map.insert("author".to_string(), json!(self.author));
        map.insert("strategy_type".to_string(), json!(self.strategy_type));
        map.insert("timeframe".to_string(), json!(self.timeframe));
        map.insert(
            "market_conditions".to_string(),
            json!(self.market_conditions),
        );
        map.insert("asset_class".to_string(), json!(self.asset_class));
        map.insert("key_concepts".to_string(), json!(self.key_concepts));
        map.insert("source_file".to_string(), json!(self.source_file));
        map.insert("chunk_index".to_string(), json!(chunk_index));
        map.insert("document_type".to_string(), json!(self.document_type));
        if let Some(pages) = self.page_count {
            map.insert("page_count".to_string(), json!(pages));
        }
        map
    }
}

/// A bounded, sentence-aligned segment of a document's text; the unit of
/// embedding and indexing. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    /// Contiguous from 0 in emission order within one document
    pub index: usize,
    pub metadata: Map<String, Value>,
    /// Pages the chunk text came from. Always empty for now: the core does
    /// not track which sentences came from which page.
    // TODO: populate once the extraction step reports per-page offsets
    pub source_pages: Vec<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metadata() -> DocumentMetadata {
        DocumentMetadata {
            title: "Technical Analysis of the Financial Markets".to_string(),
            author: Some("John Murphy".to_string()),
            strategy_type: "technical_analysis".to_string(),
            timeframe: "swing_trading".to_string(),
            market_conditions: vec!["trending".to_string(), "ranging".to_string()],
            asset_class: vec!["equities".to_string()],
            key_concepts: vec!["chart_patterns".to_string()],
            source_file: "technical_analysis_murphy.pdf".to_string(),
            document_type: "ebook".to_string(),
            page_count: Some(576),
        }
    }

    #[test]
    fn chunk_metadata_carries_index_and_page_count() {
        let meta = sample_metadata().chunk_metadata(7);

        assert_eq!(meta["chunk_index"], 7);
        assert_eq!(meta["page_count"], 576);
        assert_eq!(meta["strategy_type"], "technical_analysis");
    }

    #[test]
    fn chunk_metadata_omits_missing_page_count() {
        let mut doc = sample_metadata();
        doc.page_count = None;

        let meta = doc.chunk_metadata(0);
        assert!(!meta.contains_key("page_count"));
    }
}
