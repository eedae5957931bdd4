//! Similarity retrieval over the stored term vectors.
//!
//! An exact linear scan: at the target scale (hundreds to low thousands of
//! rows) there is nothing to gain from an approximate index, and the exact
//! scan keeps ranking deterministic.

use std::cmp::Ordering;

use serde::Serialize;

use termx_core::{Error, Level, Result, TermRecord, Vector};
use termx_embed::EmbeddingProvider;
use termx_storage::TermStore;

/// One ranked retrieval result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub text: String,
    pub score: f32,
    pub level: Level,
    pub modality: Option<String>,
    pub count: u64,
    pub last_seen_date: Option<String>,
}

impl Suggestion {
    fn new(record: TermRecord, score: f32) -> Self {
        Self {
            text: record.text,
            score,
            level: record.level,
            modality: record.modality,
            count: record.count,
            last_seen_date: record.last_seen_date,
        }
    }
}

/// Rank stored terms against a query string.
///
/// The query is embedded with the caller's provider, which must match the
/// store's build-time configuration. Results below `min_score` are dropped;
/// the rest are ordered by score descending, then count descending, then
/// text ascending, and truncated to `top_k`. An empty query or an empty
/// store yields an empty list, not an error.
pub fn retrieve(
    store: &TermStore,
    provider: &dyn EmbeddingProvider,
    query: &str,
    top_k: usize,
    min_score: f32,
) -> Result<Vec<Suggestion>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let mut vectors = provider.embed_batch(std::slice::from_ref(&query.to_string()))?;
    if vectors.is_empty() {
        return Err(Error::Provider("provider returned no vector".to_string()));
    }
    let query_vector = Vector::new(vectors.remove(0));

    let mut results: Vec<Suggestion> = Vec::new();
    for (record, embedding) in store.all_vectors()? {
        let score = query_vector.cosine_similarity(&Vector::new(embedding));
        if score < min_score {
            continue;
        }
        results.push(Suggestion::new(record, score));
    }

    results.sort_by(compare_suggestions);
    results.truncate(top_k);
    Ok(results)
}

fn compare_suggestions(a: &Suggestion, b: &Suggestion) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.count.cmp(&a.count))
        .then_with(|| a.text.cmp(&b.text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use termx_core::NormalizedTerm;
    use termx_embed::HashEmbedder;

    fn seeded_store(embedder: &HashEmbedder, texts: &[&str]) -> TermStore {
        let store = TermStore::open_in_memory().unwrap();
        for text in texts {
            let term = NormalizedTerm::new(*text, Level::Study);
            store.upsert(&term, &embedder.embed_one(text)).unwrap();
        }
        store
    }

    #[test]
    fn test_ranks_exact_token_match_first() {
        let embedder = HashEmbedder::new(64);
        let store = seeded_store(&embedder, &["MR BRAIN", "MR FETUS"]);

        let results = retrieve(&store, &embedder, "mr fetus", 10, 0.2).unwrap();
        assert!(!results.is_empty());
        assert_eq!(results[0].text, "MR FETUS");
    }

    #[test]
    fn test_min_score_floor_applied() {
        let embedder = HashEmbedder::new(64);
        let store = seeded_store(&embedder, &["MR BRAIN", "CT CHEST"]);

        let results = retrieve(&store, &embedder, "mr brain", 10, 0.9).unwrap();
        assert!(results.iter().all(|s| s.score >= 0.9));
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_scores_bounded() {
        let embedder = HashEmbedder::new(32);
        let store = seeded_store(&embedder, &["MR BRAIN", "CT CHEST", "US ABDOMEN"]);

        let results = retrieve(&store, &embedder, "brain", 10, 0.0).unwrap();
        assert!(results.iter().all(|s| (-1.0..=1.0).contains(&s.score)));
    }

    #[test]
    fn test_empty_query_is_empty_result() {
        let embedder = HashEmbedder::new(16);
        let store = seeded_store(&embedder, &["MR BRAIN"]);
        assert!(retrieve(&store, &embedder, "   ", 10, 0.0).unwrap().is_empty());
    }

    #[test]
    fn test_empty_store_is_empty_result() {
        let embedder = HashEmbedder::new(16);
        let store = TermStore::open_in_memory().unwrap();
        assert!(retrieve(&store, &embedder, "mr", 10, 0.0).unwrap().is_empty());
    }

    #[test]
    fn test_top_k_truncates() {
        let embedder = HashEmbedder::new(64);
        let store = seeded_store(&embedder, &["MR A", "MR B", "MR C", "MR D"]);

        let results = retrieve(&store, &embedder, "mr", 2, 0.0).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_deterministic_order_with_ties() {
        let embedder = HashEmbedder::new(64);
        let store = TermStore::open_in_memory().unwrap();
        // Identical embeddings, identical counts: ties break on text.
        for text in ["MR ZEBRA", "MR ALPHA"] {
            let term = NormalizedTerm::new(text, Level::Study);
            store.upsert(&term, &[1.0, 0.0]).unwrap();
        }
        // Higher count outranks text order at equal score.
        let favored = NormalizedTerm::new("MR OMEGA", Level::Study);
        store.upsert(&favored, &[1.0, 0.0]).unwrap();
        store.upsert(&favored, &[1.0, 0.0]).unwrap();

        struct FixedProvider;
        impl EmbeddingProvider for FixedProvider {
            fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
                Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
            }
            fn dim(&self) -> usize {
                2
            }
            fn name(&self) -> &str {
                "fixed"
            }
        }

        let first = retrieve(&store, &FixedProvider, "anything", 10, 0.0).unwrap();
        let second = retrieve(&store, &FixedProvider, "anything", 10, 0.0).unwrap();
        assert_eq!(first, second);

        let texts: Vec<&str> = first.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, ["MR OMEGA", "MR ALPHA", "MR ZEBRA"]);
    }
}
