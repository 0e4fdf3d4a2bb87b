//! Governance alert records
//!
//! Alerts are the only persisted output of the detection pipeline: formal,
//! auditable records that walk a strictly forward Open → Acknowledged →
//! Resolved state machine and are never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Category, HotspotSeverity, SpikeSeverity};

/// Which detector produced the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertType {
    Hotspot,
    Spike,
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hotspot => write!(f, "HOTSPOT"),
            Self::Spike => write!(f, "SPIKE"),
        }
    }
}

/// Alert severity carries the originating detector's classification:
/// Medium/High from hotspots, Moderate/Severe from spikes. Only High and
/// Severe signals warrant formal alerts; the lower tiers exist so stored
/// records remain faithful to the detector output that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertSeverity {
    Medium,
    High,
    Moderate,
    Severe,
}

impl From<HotspotSeverity> for AlertSeverity {
    fn from(s: HotspotSeverity) -> Self {
        match s {
            HotspotSeverity::Medium => Self::Medium,
            HotspotSeverity::High => Self::High,
        }
    }
}

impl From<SpikeSeverity> for AlertSeverity {
    fn from(s: SpikeSeverity) -> Self {
        match s {
            SpikeSeverity::Moderate => Self::Moderate,
            SpikeSeverity::Severe => Self::Severe,
        }
    }
}

/// Lifecycle state. Transitions are strictly forward and never skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertStatus {
    Open,
    Acknowledged,
    Resolved,
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Open => "Open",
            Self::Acknowledged => "Acknowledged",
            Self::Resolved => "Resolved",
        };
        write!(f, "{s}")
    }
}

/// A persisted governance alert.
///
/// Invariants maintained by the lifecycle manager:
/// - `resolution_note`/`resolved_at` are set iff status is Resolved
/// - `acknowledged_by`/`acknowledged_at` are set iff status is
///   Acknowledged or Resolved
/// - at most one alert per (ward, category, alert_type) inside the
///   suppression window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub alert_type: AlertType,
    pub ward: String,
    pub category: Category,
    pub severity: AlertSeverity,
    /// Originating hotspot score or spike ratio, kept for audit.
    pub reference_score: f64,
    /// Plain-language description suitable for municipal review.
    pub description: String,
    pub status: AlertStatus,
    pub acknowledged_by: Option<String>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub resolution_note: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Per-type creation counts returned by a generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub hotspot_alerts_created: usize,
    pub spike_alerts_created: usize,
    pub total_alerts_created: usize,
}
