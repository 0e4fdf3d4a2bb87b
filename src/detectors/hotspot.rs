//! Hotspot detection — sustained high-severity complaint concentrations
//!
//! Scans the trailing window, groups complaints by ward × category, and
//! scores each group as Σ(priority_weight × count). A group qualifies only
//! when both the raw volume floor and the weighted score threshold are met,
//! keeping the signal deterministic and auditable.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::config::HotspotConfig;
use crate::store::{ComplaintStore, StoreError};
use crate::types::{Category, HotspotResult, HotspotSeverity};

/// Identify ward × category hotspots in the trailing window ending `as_of`.
///
/// Output is sorted by hotspot score descending.
pub fn identify_hotspots(
    store: &ComplaintStore,
    as_of: DateTime<Utc>,
    cfg: &HotspotConfig,
) -> Result<Vec<HotspotResult>, StoreError> {
    let window_start = as_of - Duration::days(cfg.window_days);
    let records = store.in_window(window_start, as_of)?;

    // (ward, category) -> (complaint count, weighted score)
    let mut groups: BTreeMap<(String, Category), (u64, u64)> = BTreeMap::new();
    for rec in &records {
        let entry = groups
            .entry((rec.ward.clone(), rec.category))
            .or_insert((0, 0));
        entry.0 += 1;
        entry.1 += rec.priority.weight();
    }

    let mut hotspots: Vec<HotspotResult> = groups
        .into_iter()
        .filter(|(_, (count, score))| *count >= cfg.min_complaints && *score >= cfg.score_threshold)
        .map(|((ward, category), (count, score))| {
            let severity = if score >= cfg.high_severity_min {
                HotspotSeverity::High
            } else {
                HotspotSeverity::Medium
            };
            HotspotResult {
                ward,
                category,
                complaint_count: count,
                hotspot_score: score,
                severity,
            }
        })
        .collect();

    hotspots.sort_by(|a, b| b.hotspot_score.cmp(&a.hotspot_score));
    Ok(hotspots)
}
