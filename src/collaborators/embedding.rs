//! HTTP client for the embedding collaborator
//!
//! Embeddings are generated on demand and never persisted — callers cache
//! them only within the scope of one advisory request.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use super::{CollabResponse, EmbeddingProvider};

#[derive(Debug, Deserialize)]
struct EmbeddingPayload {
    embedding: Vec<f32>,
}

/// Embedding service client with a bounded timeout.
#[derive(Clone)]
pub struct HttpEmbedder {
    http: reqwest::Client,
    url: String,
}

impl HttpEmbedder {
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            http,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbedder {
    async fn embed(&self, text: &str) -> CollabResponse<Vec<f32>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return CollabResponse::Invalid("text must be a non-empty string".to_string());
        }

        let body = serde_json::json!({ "text": trimmed });

        let resp = match self.http.post(&self.url).json(&body).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "embedding service unreachable");
                return CollabResponse::Unavailable(e.to_string());
            }
        };

        if !resp.status().is_success() {
            warn!(status = %resp.status(), "embedding service returned error status");
            return CollabResponse::Unavailable(format!("status {}", resp.status()));
        }

        match resp.json::<EmbeddingPayload>().await {
            Ok(payload) if !payload.embedding.is_empty() => {
                CollabResponse::Ok(payload.embedding)
            }
            Ok(_) => CollabResponse::Invalid("empty embedding vector".to_string()),
            Err(e) => {
                warn!(error = %e, "embedding service returned malformed payload");
                CollabResponse::Invalid(e.to_string())
            }
        }
    }
}
