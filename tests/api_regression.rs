//! End-to-end API regression tests.
//!
//! Each test builds the full router over a throwaway in-memory database
//! with stub collaborators and drives it through `tower::ServiceExt`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use tower::ServiceExt;
use uuid::Uuid;

use civic_signal::alerts::AlertManager;
use civic_signal::api::{create_app, EngineState};
use civic_signal::collaborators::{
    ClassificationProvider, ClassifierPrediction, CollabResponse, EmbeddingProvider,
};
use civic_signal::store::{open_temporary, AlertStore, ComplaintStore};
use civic_signal::types::{Category, ComplaintRecord, ComplaintStatus, Priority};

struct StubClassifier;

#[async_trait]
impl ClassificationProvider for StubClassifier {
    async fn classify(&self, _text: &str) -> CollabResponse<ClassifierPrediction> {
        CollabResponse::Ok(ClassifierPrediction {
            category: "Water".to_string(),
            priority: "High".to_string(),
            category_confidence: 0.9,
            priority_confidence: 0.9,
            model_version: "stub-v1".to_string(),
        })
    }
}

/// Embeds every text to the same unit vector, so every candidate scores a
/// cosine similarity of exactly 1.0.
struct StubEmbedder {
    available: bool,
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, _text: &str) -> CollabResponse<Vec<f32>> {
        if self.available {
            CollabResponse::Ok(vec![1.0, 0.0])
        } else {
            CollabResponse::Unavailable("connection refused".to_string())
        }
    }
}

struct TestEngine {
    app: Router,
    complaints: ComplaintStore,
}

fn engine_with_embedder(available: bool) -> TestEngine {
    let db = open_temporary().unwrap();
    let complaints = ComplaintStore::open(&db).unwrap();
    let alerts = AlertStore::open(&db).unwrap();
    let state = EngineState {
        complaints: complaints.clone(),
        manager: AlertManager::new(complaints.clone(), alerts),
        classifier: Arc::new(StubClassifier),
        embedder: Arc::new(StubEmbedder { available }),
    };
    TestEngine {
        app: create_app(state),
        complaints,
    }
}

fn engine() -> TestEngine {
    engine_with_embedder(true)
}

fn complaint(
    ward: &str,
    category: Category,
    priority: Priority,
    status: ComplaintStatus,
    days_ago: i64,
) -> ComplaintRecord {
    ComplaintRecord {
        id: Uuid::new_v4(),
        title: "Burst water pipe".to_string(),
        description: "water leaking on the main road".to_string(),
        ward: ward.to_string(),
        category,
        priority,
        status,
        created_at: Utc::now() - Duration::days(days_ago),
    }
}

/// 12 High-priority complaints in one ward: qualifies as a High hotspot.
fn seed_high_hotspot(store: &ComplaintStore) {
    for _ in 0..12 {
        store
            .insert(&complaint(
                "Ward-7",
                Category::Sanitation,
                Priority::High,
                ComplaintStatus::New,
                10,
            ))
            .unwrap();
    }
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_envelope() {
    let engine = engine();
    let (status, body) = send(engine.app, get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["meta"]["version"], "1");
}

#[tokio::test]
async fn test_hotspots_endpoint() {
    let engine = engine();
    seed_high_hotspot(&engine.complaints);

    let (status, body) = send(engine.app, get("/api/v1/hotspots")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);
    let hotspot = &body["data"]["hotspots"][0];
    assert_eq!(hotspot["ward"], "Ward-7");
    assert_eq!(hotspot["category"], "Sanitation");
    assert_eq!(hotspot["complaint_count"], 12);
    assert_eq!(hotspot["hotspot_score"], 36);
    assert_eq!(hotspot["severity"], "High");
}

#[tokio::test]
async fn test_spikes_endpoint_empty_history() {
    let engine = engine();
    let (status, body) = send(engine.app, get("/api/v1/spikes")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 0);
}

#[tokio::test]
async fn test_forecast_rejects_unknown_entity() {
    let engine = engine();
    let (status, body) = send(engine.app, get("/api/v1/analytics/forecast/district")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_forecast_endpoint() {
    let engine = engine();
    // Two observed months: 35 then 40 → predicted 45
    for _ in 0..35 {
        engine
            .complaints
            .insert(&complaint(
                "Ward-1",
                Category::Water,
                Priority::Low,
                ComplaintStatus::New,
                45,
            ))
            .unwrap();
    }
    for _ in 0..40 {
        engine
            .complaints
            .insert(&complaint(
                "Ward-1",
                Category::Water,
                Priority::Low,
                ComplaintStatus::New,
                10,
            ))
            .unwrap();
    }

    let (status, body) = send(engine.app, get("/api/v1/analytics/forecast/category")).await;
    assert_eq!(status, StatusCode::OK);
    let forecasts = body["data"]["forecasts"].as_array().unwrap();
    assert_eq!(forecasts.len(), 1);
    assert_eq!(forecasts[0]["entity"], "Water");
    assert_eq!(forecasts[0]["predicted_next_period"], 45);
    assert_eq!(forecasts[0]["method"], "Linear Trend Projection");
}

#[tokio::test]
async fn test_alert_generation_and_dedup() {
    let engine = engine();
    seed_high_hotspot(&engine.complaints);

    let (status, body) = send(
        engine.app.clone(),
        json_request("POST", "/api/v1/alerts/generate", serde_json::json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["hotspot_alerts_created"], 1);
    assert_eq!(body["data"]["total_alerts_created"], 1);

    // Second run over the same findings is suppressed
    let (_, body) = send(
        engine.app.clone(),
        json_request("POST", "/api/v1/alerts/generate", serde_json::json!({})),
    )
    .await;
    assert_eq!(body["data"]["total_alerts_created"], 0);

    let (status, body) = send(engine.app, get("/api/v1/alerts")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["alerts"][0]["alert_type"], "HOTSPOT");
    assert_eq!(body["data"]["alerts"][0]["status"], "Open");
}

#[tokio::test]
async fn test_alert_lifecycle_over_http() {
    let engine = engine();
    seed_high_hotspot(&engine.complaints);
    send(
        engine.app.clone(),
        json_request("POST", "/api/v1/alerts/generate", serde_json::json!({})),
    )
    .await;
    let (_, body) = send(engine.app.clone(), get("/api/v1/alerts")).await;
    let id = body["data"]["alerts"][0]["id"].as_str().unwrap().to_string();

    // Resolving an Open alert is a state-machine violation
    let (status, body) = send(
        engine.app.clone(),
        json_request(
            "PUT",
            &format!("/api/v1/alerts/{id}/resolve"),
            serde_json::json!({"resolution_note": "done"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Open"));

    // Acknowledge requires an actor
    let (status, _) = send(
        engine.app.clone(),
        json_request(
            "PUT",
            &format!("/api/v1/alerts/{id}/acknowledge"),
            serde_json::json!({"actor": "  "}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        engine.app.clone(),
        json_request(
            "PUT",
            &format!("/api/v1/alerts/{id}/acknowledge"),
            serde_json::json!({"actor": "officer.khan"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "Acknowledged");
    assert_eq!(body["data"]["acknowledged_by"], "officer.khan");

    let (status, body) = send(
        engine.app.clone(),
        json_request(
            "PUT",
            &format!("/api/v1/alerts/{id}/resolve"),
            serde_json::json!({"resolution_note": "Crew dispatched"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "Resolved");
    assert_eq!(body["data"]["resolution_note"], "Crew dispatched");

    // Acknowledging a Resolved alert is a state-machine violation
    let (status, _) = send(
        engine.app,
        json_request(
            "PUT",
            &format!("/api/v1/alerts/{id}/acknowledge"),
            serde_json::json!({"actor": "officer.roy"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_acknowledge_unknown_alert() {
    let engine = engine();
    let (status, body) = send(
        engine.app,
        json_request(
            "PUT",
            &format!("/api/v1/alerts/{}/acknowledge", Uuid::new_v4()),
            serde_json::json!({"actor": "officer.khan"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_repeat_check_requires_description() {
    let engine = engine();
    let (status, _) = send(
        engine.app,
        json_request(
            "POST",
            "/api/v1/repeat-check",
            serde_json::json!({"description": "   "}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_repeat_check_matches_resolved_history() {
    let engine = engine();
    engine
        .complaints
        .insert(&complaint(
            "Ward-3",
            Category::Water,
            Priority::Medium,
            ComplaintStatus::Resolved,
            30,
        ))
        .unwrap();
    // An unresolved record is never a candidate
    engine
        .complaints
        .insert(&complaint(
            "Ward-3",
            Category::Water,
            Priority::Medium,
            ComplaintStatus::New,
            20,
        ))
        .unwrap();

    let (status, body) = send(
        engine.app,
        json_request(
            "POST",
            "/api/v1/repeat-check",
            serde_json::json!({
                "description": "water leaking again near the main road",
                "ward": "Ward-3",
                "category": "Water",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_repeat_pattern"], true);
    assert_eq!(body["data"]["advisory_level"], "Strong");
    let matches = body["data"]["similar_complaints"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["ward"], "Ward-3");
    assert_eq!(matches[0]["similarity_indicator"], 1.0);
    assert_eq!(matches[0]["matched_signals"]["semantic"], true);
}

#[tokio::test]
async fn test_repeat_check_fails_closed_when_embedder_down() {
    let engine = engine_with_embedder(false);
    engine
        .complaints
        .insert(&complaint(
            "Ward-3",
            Category::Water,
            Priority::Medium,
            ComplaintStatus::Resolved,
            30,
        ))
        .unwrap();

    let (status, body) = send(
        engine.app,
        json_request(
            "POST",
            "/api/v1/repeat-check",
            serde_json::json!({"description": "water leaking again near the main road"}),
        ),
    )
    .await;
    // Inconclusive, not "no matches" — the caller must not treat this as
    // a confirmed non-repeat
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["is_repeat_pattern"].is_null());
    assert!(body["data"]["interpretation"]
        .as_str()
        .unwrap()
        .contains("inconclusive"));
}

#[tokio::test]
async fn test_create_complaint_hybrid_classification() {
    let engine = engine();
    let (status, body) = send(
        engine.app,
        json_request(
            "POST",
            "/api/v1/complaints",
            serde_json::json!({
                "title": "No water",
                "description": "no water supply since morning",
                "ward": "Ward-2",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["complaint"]["category"], "Water");
    assert_eq!(body["data"]["complaint"]["priority"], "High");
    assert_eq!(body["data"]["complaint"]["status"], "New");
    assert_eq!(body["data"]["classification"]["degraded"], false);
    assert_eq!(
        body["data"]["classification"]["category_decision"]["decision_status"],
        "AI_CONFIRMED"
    );
    assert_eq!(engine.complaints.len(), 1);
}

#[tokio::test]
async fn test_create_complaint_requires_ward() {
    let engine = engine();
    let (status, _) = send(
        engine.app,
        json_request(
            "POST",
            "/api/v1/complaints",
            serde_json::json!({"description": "water leak", "ward": ""}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_root_health_for_load_balancers() {
    let engine = engine();
    let (status, _) = send(engine.app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}
