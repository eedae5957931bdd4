//! # termx Storage
//!
//! SQLite persistence for the termx terminology index: one `terms` table
//! keyed by `(text, level, modality)`, embeddings stored as little-endian
//! f32 blobs, aggregation expressed as transactional upserts.

pub mod blob;
pub mod store;

pub use blob::{decode_embedding, encode_embedding};
pub use store::TermStore;
