//! Repeat-pattern similarity advisory
//!
//! Scores a candidate complaint against recently resolved complaints under
//! a mandatory-then-supporting gating rule: semantic similarity is the
//! non-negotiable primary signal; keyword-anchor overlap and ward equality
//! only refine confidence after the floor is cleared. The check is
//! advisory and read-only — it never writes anything back to a record, and
//! when the embedding collaborator is down it fails closed as
//! "inconclusive" rather than asserting "not a repeat".

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::collaborators::{CollabResponse, EmbeddingProvider};
use crate::config::SimilarityConfig;
use crate::store::{ComplaintStore, StoreError};
use crate::types::{AdvisoryLevel, AdvisoryOutcome, Category, MatchedSignals, SimilarityMatch};

/// One advisory check request.
#[derive(Debug, Clone)]
pub struct AdvisoryRequest {
    /// Combined title + description of the incoming complaint.
    pub text: String,
    pub ward: Option<String>,
    /// When supplied, a differing candidate category rejects the candidate
    /// outright — a stated policy choice, not a tunable weight.
    pub category: Option<Category>,
    /// Self-match protection: this id never appears in the results.
    pub exclude_id: Option<Uuid>,
}

/// Category-specific anchor terms — the explainable keyword rule layer.
fn anchor_keywords(category: Category) -> &'static [&'static str] {
    match category {
        Category::Water => &["leak", "leakage", "pipe", "overflow", "water"],
        Category::Sanitation => &["garbage", "waste", "sewage", "drain", "overflow"],
        Category::Roads => &["pothole", "road", "crack", "highway", "damage"],
        Category::Electricity => &["power", "voltage", "transformer", "line", "outage"],
        Category::Uncertain => &[],
    }
}

/// Both texts share at least one anchor term for the candidate's category.
fn has_anchor_overlap(text_a: &str, text_b: &str, category: Category) -> bool {
    anchor_keywords(category)
        .iter()
        .any(|word| text_a.contains(word) && text_b.contains(word))
}

/// Cosine similarity between two vectors; 0 for mismatched or empty input.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Check the incoming complaint against resolved history.
///
/// Candidates: Resolved complaints from the trailing history window, most
/// recent first, capped. Embeddings are generated on demand and cached
/// only for the lifetime of this call.
pub async fn check_repeat_pattern(
    store: &ComplaintStore,
    embedder: &dyn EmbeddingProvider,
    request: &AdvisoryRequest,
    as_of: DateTime<Utc>,
    cfg: &SimilarityConfig,
) -> Result<AdvisoryOutcome, StoreError> {
    let since = as_of - Duration::days(cfg.history_days);
    let candidates = store.resolved_since(since, cfg.max_candidates, request.exclude_id)?;

    if candidates.is_empty() {
        return Ok(AdvisoryOutcome::Assessed { matches: Vec::new() });
    }

    let input_text = request.text.to_lowercase();

    let input_embedding = match embedder.embed(&request.text).await {
        CollabResponse::Ok(v) => v,
        CollabResponse::Unavailable(reason) | CollabResponse::Invalid(reason) => {
            warn!(%reason, "embedding collaborator unusable — advisory check inconclusive");
            return Ok(AdvisoryOutcome::Inconclusive {
                reason: "semantic analysis service is currently unavailable".to_string(),
            });
        }
    };

    // Request-scoped cache keyed by candidate text, so repeated
    // title+description pairs are embedded once per check.
    let mut embedding_cache: HashMap<String, Vec<f32>> = HashMap::new();
    let mut matches = Vec::new();

    for candidate in &candidates {
        // Defensive self-check on top of the store-level exclusion
        if request.exclude_id.is_some_and(|id| id == candidate.id) {
            continue;
        }

        // Category mismatch overrides everything, even strong similarity
        if request
            .category
            .is_some_and(|cat| cat != candidate.category)
        {
            continue;
        }

        let candidate_text = candidate.combined_text().to_lowercase();
        if candidate_text.trim().is_empty() {
            continue;
        }

        let candidate_embedding = match embedding_cache.get(&candidate_text) {
            Some(v) => v.clone(),
            None => match embedder.embed(&candidate_text).await {
                CollabResponse::Ok(v) => {
                    embedding_cache.insert(candidate_text.clone(), v.clone());
                    v
                }
                CollabResponse::Unavailable(reason) | CollabResponse::Invalid(reason) => {
                    warn!(%reason, "embedding collaborator failed mid-check — advisory check inconclusive");
                    return Ok(AdvisoryOutcome::Inconclusive {
                        reason: "semantic analysis service is currently unavailable".to_string(),
                    });
                }
            },
        };

        let similarity = cosine_similarity(&input_embedding, &candidate_embedding);

        // Mandatory semantic floor — supporting signals cannot save a
        // candidate below it
        if similarity < cfg.semantic_floor {
            continue;
        }

        let keyword_match = has_anchor_overlap(&input_text, &candidate_text, candidate.category);
        let ward_match = match (&request.ward, &candidate.ward) {
            (Some(w), cw) if !w.is_empty() => w == cw,
            _ => false,
        };
        let support_signals = usize::from(keyword_match) + usize::from(ward_match);

        // Strong semantics alone suffice; moderate semantics need at
        // least one supporting signal
        let accepted = similarity >= cfg.strong_threshold || support_signals >= 1;
        if !accepted {
            continue;
        }

        let advisory_level = if similarity >= cfg.very_strong_threshold
            || (similarity >= cfg.strong_threshold && support_signals >= 2)
        {
            AdvisoryLevel::Strong
        } else {
            AdvisoryLevel::Possible
        };

        matches.push(SimilarityMatch {
            complaint_id: candidate.id,
            title: candidate.title.clone(),
            ward: candidate.ward.clone(),
            category: candidate.category,
            resolved_at: candidate.created_at,
            similarity_indicator: round3(similarity),
            matched_signals: MatchedSignals {
                semantic: true,
                keyword: keyword_match,
                ward: ward_match,
            },
            advisory_level,
        });
    }

    matches.sort_by(|a, b| {
        b.similarity_indicator
            .partial_cmp(&a.similarity_indicator)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    debug!(
        candidates = candidates.len(),
        matches = matches.len(),
        "advisory check complete"
    );
    Ok(AdvisoryOutcome::Assessed { matches })
}
