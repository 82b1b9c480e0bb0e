//! Overlapping, sentence-bounded chunking

use crate::chunking::split_sentences;
use crate::config::ChunkingConfig;
use crate::document::{Chunk, DocumentMetadata};
use ahash::AHashSet;
use thiserror::Error;

/// Invalid chunking parameters, rejected before any work starts
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("overlap ({overlap}) must be smaller than chunk_size ({chunk_size})")]
    OverlapTooLarge { overlap: usize, chunk_size: usize },

    #[error("min_chunk_size ({min_chunk_size}) must not exceed chunk_size ({chunk_size})")]
    MinChunkSizeTooLarge {
        min_chunk_size: usize,
        chunk_size: usize,
    },
}

/// Splits cleaned document text into overlapping, sentence-bounded chunks.
///
/// Sentence boundaries are never broken: a single sentence longer than
/// `chunk_size` becomes its own oversized chunk. Candidate chunks shorter
/// than `min_chunk_size` are dropped silently, including a small trailing
/// accumulation at the end of the document.
#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
    min_chunk_size: usize,
}

impl Chunker {
    pub fn new(
        chunk_size: usize,
        overlap: usize,
        min_chunk_size: usize,
    ) -> Result<Self, ConfigurationError> {
        if overlap >= chunk_size {
            return Err(ConfigurationError::OverlapTooLarge {
                overlap,
                chunk_size,
            });
        }
        if min_chunk_size > chunk_size {
            return Err(ConfigurationError::MinChunkSizeTooLarge {
                min_chunk_size,
                chunk_size,
            });
        }

        Ok(Self {
            chunk_size,
            overlap,
            min_chunk_size,
        })
    }

    pub fn from_config(config: &ChunkingConfig) -> Result<Self, ConfigurationError> {
        Self::new(config.chunk_size, config.overlap, config.min_chunk_size)
    }

    /// Chunk one document's text.
    ///
    /// Accumulates sentences until the next one would push the accumulator
    /// past `chunk_size`, emits the accumulator, then seeds the next chunk
    /// with trailing sentences whose combined length stays strictly below
    /// `overlap`. Indices of retained chunks are contiguous from 0.
    ///
    /// Chunks whose text was already emitted for this document are skipped,
    /// so repeated boilerplate collapses to its first occurrence. The seen
    /// set lives for exactly one call; concurrent calls share nothing.
    pub fn chunk(&self, text: &str, metadata: &DocumentMetadata) -> Vec<Chunk> {
        let sentences = split_sentences(text);

        let mut chunks = Vec::new();
        let mut seen: AHashSet<[u8; 32]> = AHashSet::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_len = 0usize;

        for sentence in &sentences {
            let sentence_len = sentence.len();

            if current_len + sentence_len > self.chunk_size && !current.is_empty() {
                self.emit(&current, metadata, &mut chunks, &mut seen);

                // Seed the next chunk with trailing sentences that fit
                // strictly below the overlap budget.
                let mut seed_len = 0usize;
                let mut seed_start = current.len();
                for (i, kept) in current.iter().enumerate().rev() {
                    if seed_len + kept.len() < self.overlap {
                        seed_len += kept.len();
                        seed_start = i;
                    } else {
                        break;
                    }
                }
                current.drain(..seed_start);
                current_len = seed_len;
            }

            current.push(sentence);
            current_len += sentence_len;
        }

        if !current.is_empty() {
            self.emit(&current, metadata, &mut chunks, &mut seen);
        }

        tracing::debug!(
            chunks = chunks.len(),
            sentences = sentences.len(),
            "chunked document"
        );

        chunks
    }

    /// Emit the accumulator if it clears the size floor and has not been
    /// emitted before in this call.
    fn emit(
        &self,
        sentences: &[&str],
        metadata: &DocumentMetadata,
        chunks: &mut Vec<Chunk>,
        seen: &mut AHashSet<[u8; 32]>,
    ) {
        let text = sentences.join(" ");
        if text.len() < self.min_chunk_size {
            tracing::debug!(len = text.len(), "dropping chunk below size floor");
            return;
        }

        let hash = *blake3::hash(text.as_bytes()).as_bytes();
        if !seen.insert(hash) {
            tracing::debug!("skipping duplicate chunk text");
            return;
        }

        let index = chunks.len();
        chunks.push(Chunk {
            text,
            index,
            metadata: metadata.chunk_metadata(index),
            source_pages: Vec::new(),
        });
    }
}
