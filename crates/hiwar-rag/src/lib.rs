//! Persisted local vector index for HiwarBot
//!
//! This crate provides the on-disk nearest-neighbor index the chatbot
//! retrieves context from, plus the indexer that builds it from a CSV of
//! dialogue text.

mod embedding;
mod indexer;
mod store;


pub use embedding::HashEmbedder;
pub use indexer::{index_dialogue_csv, IndexingReport};
pub use store::LocalVectorStore;

// Re-export core types for convenience
pub use hiwar_core::{Error, Result, ScoredPassage, VectorStore};
