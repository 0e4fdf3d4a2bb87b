//! Spike detection — short-term surges against a rolling baseline
//!
//! Two disjoint windows ending at `as_of`: the current week and the 30 days
//! immediately preceding it. The baseline total is normalised to a weekly
//! average; a spike needs both the evidence floor (avg ≥ 5) and the ratio
//! threshold (≥ 2.0). An empty baseline defines the ratio as 0, so a group
//! with no history can never qualify — no division-by-zero "infinite"
//! spikes.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::config::SpikeConfig;
use crate::store::{ComplaintStore, StoreError};
use crate::types::{Category, SpikeResult, SpikeSeverity};

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Truncate to local midnight (UTC) so the window boundary is a calendar
/// day edge rather than a moving intra-day cut.
fn start_of_day(t: DateTime<Utc>) -> DateTime<Utc> {
    t.date_naive()
        .and_hms_opt(0, 0, 0)
        .map_or(t, |naive| naive.and_utc())
}

/// Detect ward × category spikes as of `as_of`.
///
/// Output is sorted by spike ratio descending.
pub fn detect_spikes(
    store: &ComplaintStore,
    as_of: DateTime<Utc>,
    cfg: &SpikeConfig,
) -> Result<Vec<SpikeResult>, StoreError> {
    let current_start = start_of_day(as_of - Duration::days(cfg.current_window_days));
    let baseline_end = current_start;
    let baseline_start = baseline_end - Duration::days(cfg.baseline_window_days);

    let records = store.in_window(baseline_start, as_of)?;

    // (ward, category) -> (current week count, baseline total count)
    let mut groups: BTreeMap<(String, Category), (u64, u64)> = BTreeMap::new();
    for rec in &records {
        let entry = groups
            .entry((rec.ward.clone(), rec.category))
            .or_insert((0, 0));
        if rec.created_at >= current_start {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let mut spikes: Vec<SpikeResult> = groups
        .into_iter()
        .filter_map(|((ward, category), (current, baseline_total))| {
            let baseline_weekly_avg =
                baseline_total as f64 * 7.0 / cfg.baseline_window_days as f64;
            let spike_ratio = if baseline_weekly_avg > 0.0 {
                current as f64 / baseline_weekly_avg
            } else {
                0.0
            };

            if baseline_weekly_avg < cfg.min_baseline_weekly_avg
                || spike_ratio < cfg.ratio_threshold
            {
                return None;
            }

            let severity = if spike_ratio >= cfg.severe_ratio_min {
                SpikeSeverity::Severe
            } else {
                SpikeSeverity::Moderate
            };

            Some(SpikeResult {
                ward,
                category,
                baseline_weekly_avg: round1(baseline_weekly_avg),
                current_week_count: current,
                spike_ratio: round1(spike_ratio),
                severity,
            })
        })
        .collect();

    spikes.sort_by(|a, b| {
        b.spike_ratio
            .partial_cmp(&a.spike_ratio)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(spikes)
}
