//! HTTP client for the classification collaborator

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use super::{ClassificationProvider, CollabResponse};

/// Prediction payload returned by the classification service.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierPrediction {
    pub category: String,
    pub priority: String,
    #[serde(default)]
    pub category_confidence: f64,
    #[serde(default)]
    pub priority_confidence: f64,
    #[serde(default)]
    pub model_version: String,
}

/// Classification service client with a bounded timeout.
#[derive(Clone)]
pub struct HttpClassifier {
    http: reqwest::Client,
    url: String,
}

impl HttpClassifier {
    /// Build a client for the given endpoint. Timeout applies to the whole
    /// request — a hung collaborator degrades, it never blocks the caller.
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
impl ClassificationProvider for HttpClassifier {
    async fn classify(&self, text: &str) -> CollabResponse<ClassifierPrediction> {
        let body = serde_json::json!({ "text": text });

        let resp = match self.http.post(&self.url).json(&body).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "classification service unreachable");
                return CollabResponse::Unavailable(e.to_string());
            }
        };

        if !resp.status().is_success() {
            warn!(status = %resp.status(), "classification service returned error status");
            return CollabResponse::Unavailable(format!("status {}", resp.status()));
        }

        match resp.json::<ClassifierPrediction>().await {
            Ok(prediction) => CollabResponse::Ok(prediction),
            Err(e) => {
                warn!(error = %e, "classification service returned malformed payload");
                CollabResponse::Invalid(e.to_string())
            }
        }
    }
}
