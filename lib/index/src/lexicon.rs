//! Lexicon export: a human-reviewable summary of the stored terms.
//!
//! Three sections feed manual curation: an empty synonym bucket per frequent
//! text, bigram frequencies, and a greedy token-overlap clustering. None of
//! this is optimal grouping; it is a deterministic starting point for a
//! reviewer.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use termx_core::Result;
use termx_storage::TermStore;

/// Token-set overlap required to join an existing cluster.
const JACCARD_THRESHOLD: f32 = 0.6;

/// Tokens carrying no clinical signal, dropped before n-grams and clustering.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "exam", "for", "from", "in", "of", "on", "or", "study", "the", "to", "with",
    "without",
];

/// A bigram and how often it occurs across qualifying term texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NgramCount {
    pub text: String,
    pub count: u64,
}

/// A greedy cluster: the seed text plus every member that joined it.
///
/// `score` is the token-set similarity of the most recently merged member
/// to the seed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    pub seed: String,
    pub terms: Vec<String>,
    pub score: f32,
}

/// The exported review document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LexiconDocument {
    /// One empty bucket per qualifying text, for manual synonym curation.
    pub synonyms: BTreeMap<String, Vec<String>>,
    /// Bigram frequencies, count descending then text ascending.
    pub ngrams: Vec<NgramCount>,
    /// Multi-member clusters only; singletons add nothing to review.
    pub clusters: Vec<Cluster>,
}

/// Build the lexicon document from every record with `count >= min_count`.
pub fn export(store: &TermStore, min_count: u64) -> Result<LexiconDocument> {
    let records = store.min_count_filter(min_count)?;

    let mut synonyms = BTreeMap::new();
    // Records arrive count-descending then text-ascending; keep that order
    // for clustering and deduplicate texts that recur across level/modality.
    let mut ordered_texts: Vec<&str> = Vec::new();
    for record in &records {
        synonyms.entry(record.text.clone()).or_insert_with(Vec::new);
        if !ordered_texts.contains(&record.text.as_str()) {
            ordered_texts.push(&record.text);
        }
    }

    let mut ngram_counts: HashMap<String, u64> = HashMap::new();
    for record in &records {
        let tokens = tokenize(&record.text);
        for pair in tokens.windows(2) {
            let gram = format!("{} {}", pair[0], pair[1]);
            // Weighted by observation count: a bigram from a term seen ten
            // times matters more than one from a term seen once.
            *ngram_counts.entry(gram).or_insert(0) += record.count;
        }
    }
    let mut ngrams: Vec<NgramCount> = ngram_counts
        .into_iter()
        .filter(|(_, count)| *count >= min_count)
        .map(|(text, count)| NgramCount { text, count })
        .collect();
    ngrams.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.text.cmp(&b.text)));

    let clusters = cluster_texts(&ordered_texts);

    Ok(LexiconDocument {
        synonyms,
        ngrams,
        clusters,
    })
}

/// Greedy token-set clustering over texts in their given order.
///
/// Each text joins the first existing cluster whose seed it overlaps at
/// [`JACCARD_THRESHOLD`] or above, else it seeds a new cluster. Only
/// clusters that attracted more than one member are returned.
fn cluster_texts(texts: &[&str]) -> Vec<Cluster> {
    let mut clusters: Vec<(Cluster, HashSet<String>)> = Vec::new();

    for &text in texts {
        let tokens: HashSet<String> = tokenize(text).into_iter().collect();
        if tokens.is_empty() {
            continue;
        }
        let mut placed = false;
        for (cluster, seed_tokens) in &mut clusters {
            let score = jaccard(&tokens, seed_tokens);
            if score >= JACCARD_THRESHOLD {
                cluster.terms.push(text.to_string());
                cluster.score = score;
                placed = true;
                break;
            }
        }
        if !placed {
            clusters.push((
                Cluster {
                    seed: text.to_string(),
                    terms: vec![text.to_string()],
                    score: 1.0,
                },
                tokens,
            ));
        }
    }

    clusters
        .into_iter()
        .map(|(cluster, _)| cluster)
        .filter(|cluster| cluster.terms.len() > 1)
        .collect()
}

/// Lowercase alphanumeric tokens, stopwords and single characters removed.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_alphanumeric() {
            current.push(ch);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
        .into_iter()
        .filter(|token| token.len() >= 2 && !STOPWORDS.contains(&token.as_str()))
        .collect()
}

fn jaccard(left: &HashSet<String>, right: &HashSet<String>) -> f32 {
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let intersection = left.intersection(right).count();
    let union = left.union(right).count();
    intersection as f32 / union as f32
}
