//! tradekb - Trading Knowledge Base Core
//!
//! Ingests long trading documents into a searchable knowledge base and
//! answers queries by combining semantic (vector) and lexical relevance.
//! The embedding provider and the search backend are external collaborators,
//! reached through the [`embedding::ModelInvoker`] and
//! [`retrieval::SearchBackend`] seams.

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod retrieval;

pub use error::{Result, TradekbError};
