//! # termx
//!
//! A small, local terminology index for medical-imaging study/series
//! metadata. Raw attribute dictionaries are normalized, filtered for PHI,
//! embedded, and aggregated into one SQLite file; nearest-term retrieval
//! and lexicon export run against that file.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! termx ingest --index terms.sqlite --input batch.json
//! termx retrieve --index terms.sqlite --query "mr fetus"
//! termx export-lexicon --index terms.sqlite --output lexicon.yaml
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use termx::prelude::*;
//!
//! let store = TermStore::open_in_memory().unwrap();
//! let config = EmbedderConfig::default();
//! let embedder = build_embedder(&config).unwrap();
//!
//! let mut raw = RawObservation::new(Level::Study);
//! raw.study_description = Some("MR BRAIN W/WO".to_string());
//! let report = ingest(&store, embedder.as_ref(), &[raw]).unwrap();
//! assert_eq!(report.accepted, 1);
//!
//! let results = retrieve(&store, embedder.as_ref(), "mr brain", 10, 0.2).unwrap();
//! assert_eq!(results[0].text, "MR BRAIN W/WO");
//! ```
//!
//! ## Crate Structure
//!
//! termx is composed of several crates:
//!
//! - `termx-core` - term model, normalization, PHI filter, vector math
//! - `termx-embed` - embedding providers (deterministic hash, Ollama HTTP)
//! - `termx-storage` - SQLite term store with aggregating upserts
//! - `termx-index` - ingestion, retrieval, lexicon export

// Re-export core types
pub use termx_core::{
    is_canonical_date, is_phi, normalize, Error, Level, Modality, NormalizedTerm, RawObservation,
    Result, TermRecord, Vector,
};

// Re-export embedding providers
pub use termx_embed::{
    build_embedder, EmbedderConfig, EmbeddingProvider, HashEmbedder, OllamaEmbedder, ProviderKind,
};

// Re-export storage
pub use termx_storage::TermStore;

// Re-export index operations
pub use termx_index::{
    export, ingest, ingest_json, retrieve, IngestReport, LexiconDocument, Suggestion,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        build_embedder, export, ingest, ingest_json, is_phi, normalize, retrieve, EmbedderConfig,
        EmbeddingProvider, Error, HashEmbedder, IngestReport, Level, LexiconDocument, Modality,
        NormalizedTerm, ProviderKind, RawObservation, Result, Suggestion, TermRecord, TermStore,
        Vector,
    };
}
