//! Hash-feature text embeddings
//!
//! Deterministic bag-of-features embeddings: each word and word bigram is
//! hashed onto a handful of dimensions, weighted by position, and the
//! vector is L2-normalized. No model download, no network; good enough to
//! rank short dialogue passages against a question.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Embedding dimension, fixed for the lifetime of an index file
pub const EMBEDDING_DIMENSION: usize = 384;

#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(EMBEDDING_DIMENSION)
    }
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embed a text into a normalized feature vector
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let normalized = text.to_lowercase();
        let words: Vec<&str> = normalized.split_whitespace().collect();

        let mut vector = vec![0.0f32; self.dimension];

        for (pos, word) in words.iter().enumerate() {
            let hash = hash_of(word);

            // Spread each word over three dimensions derived from its hash
            let idx1 = (hash % self.dimension as u64) as usize;
            let idx2 = ((hash >> 16) % self.dimension as u64) as usize;
            let idx3 = ((hash >> 32) % self.dimension as u64) as usize;

            // Earlier words get higher weight
            let position_weight = 1.0 / (pos as f32 + 1.0);

            vector[idx1] += position_weight;
            vector[idx2] += position_weight * 0.7;
            vector[idx3] += position_weight * 0.5;
        }

        for pair in words.windows(2) {
            let bigram = format!("{} {}", pair[0], pair[1]);
            let idx = (hash_of(&bigram) % self.dimension as u64) as usize;
            vector[idx] += 0.8;
        }

        normalize(&mut vector);
        vector
    }
}

fn hash_of(token: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    token.hash(&mut hasher);
    hasher.finish()
}

fn normalize(vector: &mut [f32]) {
    let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for value in vector.iter_mut() {
            *value /= magnitude;
        }
    }
}

/// Cosine similarity between two equal-length vectors
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}
