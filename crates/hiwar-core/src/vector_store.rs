//! Vector store trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// One retrieved passage with its similarity score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPassage {
    pub content: String,
    pub score: f32,
}

/// Trait for nearest-neighbor search over stored text passages
///
/// The conversation core only reads: the index is built ahead of time and
/// shared read-only across sessions, so implementations need no locking
/// on the search path.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Return the `top_k` passages most similar to `query`, best first.
    /// An empty result is valid; it is not an error.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredPassage>>;

    /// Total number of stored passages
    async fn count(&self) -> Result<usize>;
}
