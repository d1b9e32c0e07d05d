//! Persisted local vector store

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use hiwar_core::{Error, Result, ScoredPassage, VectorStore};

use crate::embedding::{cosine_similarity, HashEmbedder};

const INDEX_FILE: &str = "index.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PassageRecord {
    id: String,
    content: String,
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexData {
    embedding_dimension: usize,
    passages: Vec<PassageRecord>,
}

/// A vector index persisted as a JSON file in a directory.
///
/// Built once by the indexer, then opened read-only by the chat loop and
/// shared across sessions behind an `Arc`.
pub struct LocalVectorStore {
    index_dir: PathBuf,
    embedder: HashEmbedder,
    passages: Vec<PassageRecord>,
}

impl LocalVectorStore {
    /// Open an existing index directory. Fails with [`Error::Retrieval`]
    /// when the index file is missing or unreadable.
    pub fn open(index_dir: impl AsRef<Path>) -> Result<Self> {
        let index_dir = index_dir.as_ref().to_path_buf();
        let index_file = index_dir.join(INDEX_FILE);

        let raw = fs::read_to_string(&index_file).map_err(|e| {
            Error::Retrieval(format!(
                "cannot read vector index at {}: {}",
                index_file.display(),
                e
            ))
        })?;

        let data: IndexData = serde_json::from_str(&raw)
            .map_err(|e| Error::Retrieval(format!("corrupt vector index: {}", e)))?;

        Ok(Self {
            index_dir,
            embedder: HashEmbedder::new(data.embedding_dimension),
            passages: data.passages,
        })
    }

    /// Create an empty store rooted at `index_dir`, for building a new index
    pub fn create(index_dir: impl AsRef<Path>) -> Self {
        Self {
            index_dir: index_dir.as_ref().to_path_buf(),
            embedder: HashEmbedder::default(),
            passages: Vec::new(),
        }
    }

    /// Embed and add one passage. Re-adding identical content replaces the
    /// previous record, so rebuilding an index is idempotent.
    pub fn index_passage(&mut self, content: &str) -> String {
        let id = format!("{:x}", md5::compute(content.as_bytes()));
        let embedding = self.embedder.embed(content);

        self.passages.retain(|p| p.id != id);
        self.passages.push(PassageRecord {
            id: id.clone(),
            content: content.to_string(),
            embedding,
        });

        id
    }

    /// Write the index file, creating the directory if needed
    pub fn save(&self) -> Result<()> {
        fs::create_dir_all(&self.index_dir)?;

        let data = IndexData {
            embedding_dimension: self.embedder.dimension(),
            passages: self.passages.clone(),
        };

        let raw = serde_json::to_string(&data)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(self.index_dir.join(INDEX_FILE), raw)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredPassage>> {
        let query_embedding = self.embedder.embed(query);

        let mut scored: Vec<(f32, &PassageRecord)> = self
            .passages
            .iter()
            .map(|p| (cosine_similarity(&query_embedding, &p.embedding), p))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(score, p)| ScoredPassage {
                content: p.content.clone(),
                score,
            })
            .collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.passages.len())
    }
}
