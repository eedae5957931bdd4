//! Deterministic hash-based embeddings.
//!
//! Each lowercased whitespace token is hashed into one of `dim` buckets and
//! the resulting count vector is L2-normalized. The same `(text, dim)` pair
//! always produces the same vector, so re-ingesting a term can never leave a
//! stored row stale relative to its own text.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use termx_core::Result;

use crate::EmbeddingProvider;

/// Offline token-bucket embedder.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    #[must_use]
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    /// Embed a single text into a `dim`-length vector.
    ///
    /// Empty text yields the zero vector rather than an error; cosine
    /// similarity against it is defined as 0.
    #[must_use]
    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        let normalized = text.to_lowercase();

        for token in normalized.split_whitespace() {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let pos = (hasher.finish() as usize) % self.dim;
            vector[pos] += 1.0;
        }

        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for v in &mut vector {
                *v /= magnitude;
            }
        }

        vector
    }
}

impl EmbeddingProvider for HashEmbedder {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &str {
        "hash"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_across_calls() {
        let embedder = HashEmbedder::new(64);
        let texts = vec!["MR BRAIN W/WO".to_string(), "ct chest".to_string()];
        let first = embedder.embed_batch(&texts).unwrap();
        let second = embedder.embed_batch(&texts).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_case_insensitive() {
        let embedder = HashEmbedder::new(32);
        assert_eq!(embedder.embed_one("MR FETUS"), embedder.embed_one("mr fetus"));
    }

    #[test]
    fn test_unit_length() {
        let embedder = HashEmbedder::new(64);
        let vector = embedder.embed_one("mr brain w/wo contrast");
        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashEmbedder::new(16);
        let vector = embedder.embed_one("");
        assert_eq!(vector, vec![0.0; 16]);
    }

    #[test]
    fn test_batch_preserves_order_and_length() {
        let embedder = HashEmbedder::new(64);
        let texts = vec![
            "mr brain".to_string(),
            "ct chest".to_string(),
            "mr brain".to_string(),
        ];
        let vectors = embedder.embed_batch(&texts).unwrap();
        assert_eq!(vectors.len(), 3);
        assert_eq!(vectors[0], vectors[2]);
        assert_ne!(vectors[0], vectors[1]);
    }

    #[test]
    fn test_shared_tokens_raise_similarity() {
        use termx_core::Vector;

        let embedder = HashEmbedder::new(64);
        let query = Vector::new(embedder.embed_one("mr fetus"));
        let fetus = Vector::new(embedder.embed_one("MR FETUS"));
        let brain = Vector::new(embedder.embed_one("MR BRAIN"));

        let exact = query.cosine_similarity(&fetus);
        let partial = query.cosine_similarity(&brain);
        assert!(exact > partial);
        assert!((exact - 1.0).abs() < 1e-5);
    }
}
