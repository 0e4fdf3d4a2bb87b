//! Civic Signal: complaint-stream detection and governance engine
//!
//! Turns a raw municipal complaint stream into governed, actionable signals:
//!
//! - **Detectors**: spatial hotspots, frequency spikes, and naive trend
//!   projection, recomputed on demand from the complaint store
//! - **Alert lifecycle**: High/Severe findings become persistent alerts
//!   with a strictly forward Open → Acknowledged → Resolved state machine
//! - **Confidence governance**: AI classification is trusted only above
//!   explicit confidence thresholds, with rule-based refinement always
//!   applied and a rules-only degraded mode when the AI is down
//! - **Repeat-pattern advisory**: semantic similarity against resolved
//!   history with explainable supporting signals, failing closed when the
//!   embedding collaborator is unavailable

pub mod alerts;
pub mod api;
pub mod classify;
pub mod collaborators;
pub mod config;
pub mod detectors;
pub mod governance;
pub mod similarity;
pub mod store;
pub mod types;

// Re-export engine configuration
pub use config::EngineConfig;

// Re-export commonly used types
pub use types::{
    Alert, AlertSeverity, AlertStatus, AlertType, Category, ComplaintRecord, ComplaintStatus,
    GenerationSummary, HotspotResult, Priority, SpikeResult,
};

// Re-export the lifecycle manager and storage
pub use alerts::{AlertManager, EngineError};
pub use store::{AlertStore, ComplaintStore, StoreError};
