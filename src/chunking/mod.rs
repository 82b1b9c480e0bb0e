//! Text chunking: cleaning, sentence splitting, and overlapping
//! sentence-bounded chunk emission.
//!
//! Everything in this module is pure and synchronous; it operates on
//! already-extracted plain text and needs no knowledge of the source format.

mod chunker;
mod cleaner;
mod sentence;

pub use chunker::{Chunker, ConfigurationError};
pub use cleaner::clean_text;
pub use sentence::split_sentences;
