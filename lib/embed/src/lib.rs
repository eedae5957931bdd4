//! # termx Embed
//!
//! Embedding providers for the termx terminology index.
//!
//! Two providers implement [`EmbeddingProvider`]:
//!
//! - [`HashEmbedder`] - deterministic, offline token-bucket vectors
//! - [`OllamaEmbedder`] - remote embeddings from a local Ollama server
//!
//! Vectors from different providers, or from the same provider at different
//! dimensionalities, are not comparable; every index is bound to one
//! `(provider, dim)` configuration at build time.

pub mod hash;
pub mod ollama;

pub use hash::HashEmbedder;
pub use ollama::OllamaEmbedder;

use serde::{Deserialize, Serialize};
use termx_core::{Error, Result};

/// Default vector dimensionality for the hash provider.
pub const DEFAULT_DIM: usize = 64;

/// Default request timeout for the remote provider.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A source of fixed-length embedding vectors.
///
/// `embed_batch` returns one vector per input text, in input order. The hash
/// provider is pure and never fails; the remote provider surfaces transport
/// and protocol failures as [`Error::Provider`].
pub trait EmbeddingProvider: Send + Sync {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Vector length this provider produces.
    fn dim(&self) -> usize;

    /// Short provider name for logs and reports.
    fn name(&self) -> &str;
}

/// Which provider variant to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Hash,
    Ollama,
}

impl std::str::FromStr for ProviderKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hash" => Ok(ProviderKind::Hash),
            "ollama" => Ok(ProviderKind::Ollama),
            other => Err(Error::InvalidConfig(format!("unknown provider: {other}"))),
        }
    }
}

/// Explicit embedding configuration, passed into every component that embeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedderConfig {
    pub provider: ProviderKind,
    pub dim: usize,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Hash,
            dim: DEFAULT_DIM,
            model: None,
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Build the configured provider.
///
/// The Ollama variant requires both `model` and `base_url`.
pub fn build_embedder(config: &EmbedderConfig) -> Result<Box<dyn EmbeddingProvider>> {
    if config.dim == 0 {
        return Err(Error::InvalidConfig("dim must be positive".to_string()));
    }
    match config.provider {
        ProviderKind::Hash => Ok(Box::new(HashEmbedder::new(config.dim))),
        ProviderKind::Ollama => {
            let model = config
                .model
                .clone()
                .ok_or_else(|| Error::InvalidConfig("ollama provider requires model".to_string()))?;
            let base_url = config.base_url.clone().ok_or_else(|| {
                Error::InvalidConfig("ollama provider requires base_url".to_string())
            })?;
            Ok(Box::new(OllamaEmbedder::new(
                base_url,
                model,
                config.dim,
                std::time::Duration::from_secs(config.timeout_secs),
            )))
        }
    }
}
