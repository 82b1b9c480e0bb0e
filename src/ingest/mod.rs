//! Document ingestion pipeline
//!
//! Glue over the core pieces: clean the extracted text, chunk it, embed the
//! chunk texts, and hand (chunk, vector) pairs to the search backend's
//! upsert call. Extraction itself (PDF parsing, page counting) happens
//! upstream; callers supply plain text and completed [`DocumentMetadata`].

use crate::chunking::{clean_text, Chunker};
use crate::document::DocumentMetadata;
use crate::embedding::{EmbeddingOrchestrator, ModelInvoker};
use crate::error::Result;
use crate::retrieval::{IndexDocument, SearchBackend};
use std::sync::Arc;
use uuid::Uuid;

/// Outcome of ingesting one document.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub document_id: String,
    pub chunks: usize,
    pub indexed: usize,
}

/// Ingestion pipeline: text → chunks → embeddings → index upsert.
pub struct IngestPipeline<P, B> {
    chunker: Chunker,
    orchestrator: EmbeddingOrchestrator<P>,
    backend: Arc<B>,
}

impl<P: ModelInvoker, B: SearchBackend> IngestPipeline<P, B> {
    pub fn new(
        chunker: Chunker,
        orchestrator: EmbeddingOrchestrator<P>,
        backend: Arc<B>,
    ) -> Self {
        Self {
            chunker,
            orchestrator,
            backend,
        }
    }

    /// Ingest one document's extracted text.
    ///
    /// A fresh document id is generated when none is supplied. One
    /// unrecoverable embedding failure aborts the document: nothing is
    /// persisted for it (persistence is transactional at the batch level).
    /// A document that yields no chunk meeting the size floor ingests
    /// cleanly as zero chunks.
    pub async fn ingest_document(
        &self,
        document_id: Option<&str>,
        text: &str,
        metadata: &DocumentMetadata,
    ) -> Result<IngestReport> {
        let document_id = document_id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let cleaned = clean_text(text);
        let chunks = self.chunker.chunk(&cleaned, metadata);
        if chunks.is_empty() {
            tracing::info!(document_id = %document_id, "document produced no chunks");
            return Ok(IngestReport {
                document_id,
                chunks: 0,
                indexed: 0,
            });
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.orchestrator.embed_batch(&texts).await?;

        let documents: Vec<IndexDocument> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexDocument {
                id: format!("{document_id}_chunk_{}", chunk.index),
                text: chunk.text.clone(),
                embedding,
                metadata: chunk.metadata.clone(),
            })
            .collect();

        self.backend.upsert(&documents).await?;

        tracing::info!(
            document_id = %document_id,
            chunks = chunks.len(),
            truncations = self.orchestrator.truncation_count(),
            "ingested document"
        );

        Ok(IngestReport {
            document_id,
            chunks: chunks.len(),
            indexed: documents.len(),
        })
    }
}
