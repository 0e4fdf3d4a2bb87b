//! External collaborator clients
//!
//! The classification and embedding services are opaque collaborators
//! reached over HTTP with a bounded timeout. Every call returns the tagged
//! [`CollabResponse`] — `Ok(payload) | Unavailable | Invalid` — so callers
//! exhaustively handle degradation instead of probing nullable fields.
//! Provider traits sit at the seam so tests substitute stubs.

mod classifier;
mod embedding;

pub use classifier::{ClassifierPrediction, HttpClassifier};
pub use embedding::HttpEmbedder;

use async_trait::async_trait;

/// Tagged collaborator outcome.
///
/// `Unavailable` means the service could not be reached (connect error,
/// timeout, 5xx); `Invalid` means it answered with a payload that does not
/// match the contract. Neither is ever coerced into a default value.
#[derive(Debug, Clone)]
pub enum CollabResponse<T> {
    Ok(T),
    Unavailable(String),
    Invalid(String),
}

impl<T> CollabResponse<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}

/// Free text → category/priority labels with confidences.
#[async_trait]
pub trait ClassificationProvider: Send + Sync {
    async fn classify(&self, text: &str) -> CollabResponse<ClassifierPrediction>;
}

/// Free text → fixed-length embedding vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> CollabResponse<Vec<f32>>;
}
