//! Core domain types for the civic signal engine.
//!
//! All category / priority / severity / status values are tagged enums with
//! exhaustive matching — adding a complaint category or alert severity is a
//! compile-time concern, never a silent default branch.

mod alert;
mod complaint;
mod detection;
mod similarity;

pub use alert::{Alert, AlertSeverity, AlertStatus, AlertType, GenerationSummary};
pub use complaint::{Category, ComplaintRecord, ComplaintStatus, Priority};
pub use detection::{
    EntityKind, ForecastResult, HotspotResult, HotspotSeverity, SpikeResult, SpikeSeverity,
    TrendDirection, TrendResult,
};
pub use similarity::{AdvisoryLevel, AdvisoryOutcome, MatchedSignals, SimilarityMatch};
