//! # termx Index
//!
//! Operations over the termx store: batch ingestion of raw observations,
//! cosine-similarity retrieval, and lexicon export for manual review.

pub mod ingest;
pub mod lexicon;
pub mod retrieve;

pub use ingest::{ingest, ingest_json, load_observations, IngestReport};
pub use lexicon::{export, Cluster, LexiconDocument, NgramCount};
pub use retrieve::{retrieve, Suggestion};
