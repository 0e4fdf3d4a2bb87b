//! API handlers — consistent envelope, typed responses, ISO-8601 timestamps.
//!
//! All handlers return `Response` via [`ApiResponse::ok`] or
//! [`ApiErrorResponse`]. Detection endpoints recompute on every request;
//! only alerts are persisted.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use super::envelope::{ApiErrorResponse, ApiResponse};
use crate::alerts::{AlertManager, EngineError};
use crate::classify::{self, ClassificationOutcome};
use crate::collaborators::{ClassificationProvider, EmbeddingProvider};
use crate::config;
use crate::detectors;
use crate::governance::GovernanceDecision;
use crate::similarity::{self, AdvisoryRequest};
use crate::store::ComplaintStore;
use crate::types::{
    AdvisoryLevel, Category, ComplaintRecord, ComplaintStatus, EntityKind, SimilarityMatch,
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct EngineState {
    pub complaints: ComplaintStore,
    pub manager: AlertManager,
    pub classifier: Arc<dyn ClassificationProvider>,
    pub embedder: Arc<dyn EmbeddingProvider>,
}

fn engine_error(err: &EngineError) -> Response {
    match err {
        EngineError::Validation(msg) => ApiErrorResponse::bad_request(msg.clone()),
        EngineError::NotFound(id) => ApiErrorResponse::not_found(format!("alert {id} not found")),
        EngineError::InvalidTransition { .. } => ApiErrorResponse::bad_request(err.to_string()),
        EngineError::Conflict(_) => ApiErrorResponse::conflict(err.to_string()),
        EngineError::Store(e) => {
            error!(error = %e, "storage failure");
            ApiErrorResponse::internal("storage failure")
        }
    }
}

// ============================================================================
// Health
// ============================================================================

pub async fn get_health(State(state): State<EngineState>) -> Response {
    ApiResponse::ok(serde_json::json!({
        "status": "ok",
        "complaints": state.complaints.len(),
        "alerts": state.manager.alert_store().len(),
    }))
}

// ============================================================================
// Detection (read-only, recomputed per request)
// ============================================================================

pub async fn get_hotspots(State(state): State<EngineState>) -> Response {
    let cfg = config::get();
    match detectors::identify_hotspots(&state.complaints, Utc::now(), &cfg.hotspot) {
        Ok(hotspots) => ApiResponse::ok(serde_json::json!({
            "count": hotspots.len(),
            "hotspots": hotspots,
        })),
        Err(e) => {
            error!(error = %e, "hotspot detection failed");
            ApiErrorResponse::internal("hotspot detection failed")
        }
    }
}

pub async fn get_spikes(State(state): State<EngineState>) -> Response {
    let cfg = config::get();
    match detectors::detect_spikes(&state.complaints, Utc::now(), &cfg.spike) {
        Ok(spikes) => ApiResponse::ok(serde_json::json!({
            "count": spikes.len(),
            "spikes": spikes,
        })),
        Err(e) => {
            error!(error = %e, "spike detection failed");
            ApiErrorResponse::internal("spike detection failed")
        }
    }
}

pub async fn get_forecast(
    State(state): State<EngineState>,
    Path(entity): Path<String>,
) -> Response {
    let Some(kind) = EntityKind::parse(&entity) else {
        return ApiErrorResponse::bad_request("entity must be 'category' or 'ward'");
    };
    match detectors::forecast_next_period(&state.complaints, kind) {
        Ok(forecasts) => ApiResponse::ok(serde_json::json!({
            "entity_kind": kind,
            "insufficient_history": forecasts.is_empty(),
            "forecasts": forecasts,
        })),
        Err(e) => {
            error!(error = %e, "forecast aggregation failed");
            ApiErrorResponse::internal("forecast aggregation failed")
        }
    }
}

pub async fn get_trends(
    State(state): State<EngineState>,
    Path(entity): Path<String>,
) -> Response {
    let Some(kind) = EntityKind::parse(&entity) else {
        return ApiErrorResponse::bad_request("entity must be 'category' or 'ward'");
    };
    match detectors::trend_direction(&state.complaints, kind) {
        Ok(trends) => ApiResponse::ok(serde_json::json!({
            "entity_kind": kind,
            "trends": trends,
        })),
        Err(e) => {
            error!(error = %e, "trend aggregation failed");
            ApiErrorResponse::internal("trend aggregation failed")
        }
    }
}

// ============================================================================
// Alerts
// ============================================================================

pub async fn list_alerts(State(state): State<EngineState>) -> Response {
    match state.manager.list() {
        Ok(alerts) => ApiResponse::ok(serde_json::json!({
            "count": alerts.len(),
            "alerts": alerts,
        })),
        Err(e) => engine_error(&e),
    }
}

pub async fn generate_alerts(State(state): State<EngineState>) -> Response {
    let cfg = config::get();
    match state.manager.generate(Utc::now(), cfg) {
        Ok(summary) => ApiResponse::ok(summary),
        Err(e) => engine_error(&e),
    }
}

#[derive(Debug, Deserialize)]
pub struct AcknowledgeRequest {
    #[serde(default)]
    pub actor: String,
}

pub async fn acknowledge_alert(
    State(state): State<EngineState>,
    Path(id): Path<Uuid>,
    axum::Json(body): axum::Json<AcknowledgeRequest>,
) -> Response {
    match state.manager.acknowledge(id, &body.actor, Utc::now()) {
        Ok(alert) => ApiResponse::ok(alert),
        Err(e) => engine_error(&e),
    }
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    #[serde(default)]
    pub resolution_note: String,
}

pub async fn resolve_alert(
    State(state): State<EngineState>,
    Path(id): Path<Uuid>,
    axum::Json(body): axum::Json<ResolveRequest>,
) -> Response {
    match state.manager.resolve(id, &body.resolution_note, Utc::now()) {
        Ok(alert) => ApiResponse::ok(alert),
        Err(e) => engine_error(&e),
    }
}

// ============================================================================
// Repeat-pattern advisory
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RepeatCheckRequest {
    pub description: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub ward: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Id of the complaint being checked, excluded from candidates.
    #[serde(default)]
    pub complaint_id: Option<Uuid>,
}

/// Advisory response. `is_repeat_pattern` is `null` when the check was
/// inconclusive — an unavailable embedding service is never reported as
/// "confirmed not a repeat".
#[derive(Debug, Serialize)]
pub struct RepeatCheckResponse {
    pub is_repeat_pattern: Option<bool>,
    pub advisory_level: Option<AdvisoryLevel>,
    pub similar_complaints: Vec<SimilarityMatch>,
    pub interpretation: String,
}

pub async fn repeat_check(
    State(state): State<EngineState>,
    axum::Json(body): axum::Json<RepeatCheckRequest>,
) -> Response {
    if body.description.trim().is_empty() {
        return ApiErrorResponse::bad_request("description is required");
    }

    let category = match &body.category {
        Some(s) => match Category::parse(s) {
            Some(c) => Some(c),
            None => return ApiErrorResponse::bad_request(format!("unknown category '{s}'")),
        },
        None => None,
    };

    let text = match &body.title {
        Some(title) if !title.trim().is_empty() => format!("{} {}", title, body.description),
        _ => body.description.clone(),
    };

    let request = AdvisoryRequest {
        text,
        ward: body.ward.clone(),
        category,
        exclude_id: body.complaint_id,
    };

    let cfg = config::get();
    match similarity::check_repeat_pattern(
        &state.complaints,
        state.embedder.as_ref(),
        &request,
        Utc::now(),
        &cfg.similarity,
    )
    .await
    {
        Ok(outcome) => {
            let advisory_level = outcome.advisory_level();
            match outcome {
                crate::types::AdvisoryOutcome::Assessed { matches } => {
                    let interpretation = match advisory_level {
                        Some(AdvisoryLevel::Strong) => {
                            "This complaint shows a strong repeat pattern against previously resolved complaints."
                        }
                        Some(AdvisoryLevel::Possible) => {
                            "This complaint shows a possible repeat pattern against previously resolved complaints."
                        }
                        None => "No repeat pattern detected among recently resolved complaints.",
                    };
                    ApiResponse::ok(RepeatCheckResponse {
                        is_repeat_pattern: Some(!matches.is_empty()),
                        advisory_level,
                        similar_complaints: matches,
                        interpretation: interpretation.to_string(),
                    })
                }
                crate::types::AdvisoryOutcome::Inconclusive { reason } => {
                    ApiResponse::ok(RepeatCheckResponse {
                        is_repeat_pattern: None,
                        advisory_level: None,
                        similar_complaints: Vec::new(),
                        interpretation: format!("Repeat-pattern analysis is inconclusive: {reason}."),
                    })
                }
            }
        }
        Err(e) => {
            error!(error = %e, "repeat-pattern check failed");
            ApiErrorResponse::internal("repeat-pattern check failed")
        }
    }
}

// ============================================================================
// Complaint ingestion (hybrid classification)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateComplaintRequest {
    #[serde(default)]
    pub title: String,
    pub description: String,
    pub ward: String,
    #[serde(default)]
    pub status: Option<ComplaintStatus>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct CreateComplaintResponse {
    pub complaint: ComplaintRecord,
    pub classification: ClassificationSummary,
}

/// How the stored category/priority labels were arrived at.
#[derive(Debug, Serialize)]
pub struct ClassificationSummary {
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_decision: Option<GovernanceDecision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_decision: Option<GovernanceDecision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

impl From<&ClassificationOutcome> for ClassificationSummary {
    fn from(outcome: &ClassificationOutcome) -> Self {
        Self {
            degraded: outcome.degraded,
            category_decision: outcome.category_decision.clone(),
            priority_decision: outcome.priority_decision.clone(),
            model_version: outcome.model_version.clone(),
        }
    }
}

pub async fn create_complaint(
    State(state): State<EngineState>,
    axum::Json(body): axum::Json<CreateComplaintRequest>,
) -> Response {
    if body.description.trim().is_empty() {
        return ApiErrorResponse::bad_request("description is required");
    }
    if body.ward.trim().is_empty() {
        return ApiErrorResponse::bad_request("ward is required");
    }

    let text = if body.title.trim().is_empty() {
        body.description.clone()
    } else {
        format!("{} {}", body.title, body.description)
    };

    let cfg = config::get();
    let outcome = classify::classify_hybrid(state.classifier.as_ref(), &text, &cfg.governance).await;

    let record = ComplaintRecord {
        id: Uuid::new_v4(),
        title: body.title.trim().to_string(),
        description: body.description.trim().to_string(),
        ward: body.ward.trim().to_string(),
        category: outcome.category,
        priority: outcome.priority,
        status: body.status.unwrap_or(ComplaintStatus::New),
        created_at: body.created_at.unwrap_or_else(Utc::now),
    };

    if let Err(e) = state.complaints.insert(&record) {
        error!(error = %e, "failed to persist complaint");
        return ApiErrorResponse::internal("failed to persist complaint");
    }

    ApiResponse::created(CreateComplaintResponse {
        classification: ClassificationSummary::from(&outcome),
        complaint: record,
    })
}
