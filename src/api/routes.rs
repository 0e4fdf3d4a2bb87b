//! API route definitions
//!
//! Endpoints for the civic signal engine:
//! - /api/v1/hotspots - Ward × category concentration detection
//! - /api/v1/spikes - Frequency spikes against the rolling baseline
//! - /api/v1/analytics/forecast/:entity - Next-period projection
//! - /api/v1/analytics/trends/:entity - Month-over-month direction
//! - /api/v1/alerts - Alert listing, generation and lifecycle
//! - /api/v1/repeat-check - Repeat-pattern advisory
//! - /api/v1/complaints - Hybrid-classified complaint ingestion

use axum::routing::{get, post, put};
use axum::Router;

use super::handlers::{self, EngineState};

/// Create all API routes for the engine.
pub fn api_routes(state: EngineState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        // Detection (read-only, recomputed per request)
        .route("/hotspots", get(handlers::get_hotspots))
        .route("/spikes", get(handlers::get_spikes))
        .route("/analytics/forecast/:entity", get(handlers::get_forecast))
        .route("/analytics/trends/:entity", get(handlers::get_trends))
        // Alert lifecycle
        .route("/alerts", get(handlers::list_alerts))
        .route("/alerts/generate", post(handlers::generate_alerts))
        .route("/alerts/:id/acknowledge", put(handlers::acknowledge_alert))
        .route("/alerts/:id/resolve", put(handlers::resolve_alert))
        // Repeat-pattern advisory
        .route("/repeat-check", post(handlers::repeat_check))
        // Complaint ingestion
        .route("/complaints", post(handlers::create_complaint))
        .with_state(state)
}

/// Plain health endpoint at root level for load balancers.
pub fn root_routes(state: EngineState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state)
}
