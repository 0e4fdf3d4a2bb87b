//! Ephemeral detector results
//!
//! Hotspot, spike, forecast and trend results are recomputed on every
//! detector run and never persisted.

use serde::{Deserialize, Serialize};

use super::Category;

/// Hotspot severity: High once the weighted score crosses the high
/// threshold, Medium for everything else that qualified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HotspotSeverity {
    Medium,
    High,
}

/// A qualifying ward × category hotspot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotspotResult {
    pub ward: String,
    pub category: Category,
    pub complaint_count: u64,
    /// Σ(priority_weight × count) over the trailing window.
    pub hotspot_score: u64,
    pub severity: HotspotSeverity,
}

/// Spike severity: Severe at ratio ≥ 3.0, Moderate for qualifying ratios
/// below that. The qualification filter already guarantees ratio ≥ 2.0, so
/// Moderate covers [2.0, 3.0) by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpikeSeverity {
    Moderate,
    Severe,
}

/// A qualifying ward × category spike against the rolling baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpikeResult {
    pub ward: String,
    pub category: Category,
    /// Rounded to one decimal for reporting.
    pub baseline_weekly_avg: f64,
    pub current_week_count: u64,
    /// current_week_count / baseline_weekly_avg, rounded to one decimal.
    /// Defined as 0 when the baseline is empty, which never qualifies.
    pub spike_ratio: f64,
    pub severity: SpikeSeverity,
}

/// Which entity axis an analytics query aggregates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Category,
    Ward,
}

impl EntityKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "category" => Some(Self::Category),
            "ward" => Some(Self::Ward),
            _ => None,
        }
    }
}

/// Naive linear projection of the next monthly total for one entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    pub entity: String,
    pub last_period_count: u64,
    /// max(0, last + (last − prev)) — floored, never negative.
    pub predicted_next_period: u64,
    /// Fixed method identifier for auditability.
    pub method: String,
}

/// Month-over-month direction of one entity's complaint volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendResult {
    pub entity: String,
    pub previous_month_count: u64,
    pub current_month_count: u64,
    pub trend: TrendDirection,
}
