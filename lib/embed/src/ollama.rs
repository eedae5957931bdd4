//! Remote embeddings from a local Ollama server.
//!
//! One `POST {base_url}/api/embeddings` request per text, bounded by the
//! configured timeout. The caller owns connection-level concerns beyond
//! that; this client only maps transport and protocol failures to
//! [`Error::Provider`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use termx_core::{Error, Result};
use tracing::debug;

use crate::EmbeddingProvider;

#[derive(Serialize)]
struct OllamaEmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embedding: Vec<f32>,
}

/// HTTP embedding provider backed by Ollama's embeddings endpoint.
pub struct OllamaEmbedder {
    base_url: String,
    model: String,
    dim: usize,
    timeout: Duration,
    client: reqwest::blocking::Client,
}

impl OllamaEmbedder {
    pub fn new(base_url: String, model: String, dim: usize, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            dim,
            timeout,
            client: reqwest::blocking::Client::new(),
        }
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let request = OllamaEmbedRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .map_err(|e| Error::Provider(format!("ollama request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Provider(format!("ollama returned {status}: {body}")));
        }

        let body: OllamaEmbedResponse = response
            .json()
            .map_err(|e| Error::Provider(format!("invalid embedding response: {e}")))?;

        if body.embedding.is_empty() {
            return Err(Error::Provider("empty embedding response".to_string()));
        }

        debug!(model = %self.model, dim = body.embedding.len(), "ollama embedding received");
        Ok(body.embedding)
    }
}

impl EmbeddingProvider for OllamaEmbedder {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed_one(text)).collect()
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let embedder = OllamaEmbedder::new(
            "http://localhost:11434/".to_string(),
            "nomic-embed-text".to_string(),
            768,
            Duration::from_secs(5),
        );
        assert_eq!(embedder.base_url, "http://localhost:11434");
        assert_eq!(embedder.dim(), 768);
        assert_eq!(embedder.name(), "ollama");
    }

    #[test]
    fn test_unreachable_server_is_provider_error() {
        // Reserved TEST-NET-1 address, nothing listens there.
        let embedder = OllamaEmbedder::new(
            "http://192.0.2.1:1".to_string(),
            "nomic-embed-text".to_string(),
            8,
            Duration::from_millis(100),
        );
        let err = embedder
            .embed_batch(&["mr brain".to_string()])
            .unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
    }
}
