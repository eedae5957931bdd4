//! # termx Core
//!
//! Core library for the termx terminology index.
//!
//! This crate provides the fundamental data structures and pure functions:
//!
//! - [`Vector`] - Dense vector representation with cosine similarity
//! - [`TermRecord`] / [`NormalizedTerm`] - The persisted term model
//! - [`normalize`] - Raw attribute dictionaries to normalized terms
//! - [`is_phi`] - The PHI rejection predicate
//!
//! ## Example
//!
//! ```rust
//! use termx_core::{normalize, Level, RawObservation};
//!
//! let mut raw = RawObservation::new(Level::Study);
//! raw.study_description = Some("MR BRAIN W/WO".to_string());
//!
//! let terms = normalize(&raw);
//! assert_eq!(terms[0].text, "MR BRAIN W/WO");
//! ```

pub mod error;
pub mod normalize;
pub mod phi;
pub mod term;
pub mod vector;

pub use error::{Error, Result};
pub use normalize::{
    is_canonical_date, normalize, normalize_date, normalize_modality, normalize_text, Modality,
    RawObservation,
};
pub use phi::is_phi;
pub use term::{Level, NormalizedTerm, TermRecord};
pub use vector::Vector;
