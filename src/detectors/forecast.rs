//! Monthly trend projection and direction
//!
//! Aggregates complaint counts per entity (category or ward) by calendar
//! month, then projects the next period with a naive linear extrapolation:
//! `max(0, last + (last − prev))`, floored because a negative complaint
//! forecast is not meaningful. Entities with fewer than two observed months
//! are excluded — insufficient history is reported to the caller, never
//! defaulted to zero.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::store::{ComplaintStore, StoreError};
use crate::types::{EntityKind, ForecastResult, TrendDirection, TrendResult};

/// Fixed method identifier kept on every forecast for auditability.
pub const FORECAST_METHOD: &str = "Linear Trend Projection";

/// entity -> month -> count, with months in chronological order. Months
/// with no complaints are simply absent.
fn monthly_counts(
    store: &ComplaintStore,
    kind: EntityKind,
) -> Result<BTreeMap<String, BTreeMap<(i32, u32), u64>>, StoreError> {
    let mut by_entity: BTreeMap<String, BTreeMap<(i32, u32), u64>> = BTreeMap::new();
    for rec in store.all()? {
        let entity = match kind {
            EntityKind::Category => rec.category.to_string(),
            EntityKind::Ward => rec.ward.clone(),
        };
        let month = (rec.created_at.year(), rec.created_at.month());
        *by_entity.entry(entity).or_default().entry(month).or_insert(0) += 1;
    }
    Ok(by_entity)
}

/// The two most recent monthly totals, if the entity has at least two.
fn last_two(months: &BTreeMap<(i32, u32), u64>) -> Option<(u64, u64)> {
    let mut iter = months.values().rev();
    let last = *iter.next()?;
    let prev = *iter.next()?;
    Some((prev, last))
}

/// Project next-month complaint volume per entity.
///
/// Returns one result per entity with ≥ 2 observed months; an empty vec
/// means no entity has sufficient history.
pub fn forecast_next_period(
    store: &ComplaintStore,
    kind: EntityKind,
) -> Result<Vec<ForecastResult>, StoreError> {
    let forecasts = monthly_counts(store, kind)?
        .into_iter()
        .filter_map(|(entity, months)| {
            let (prev, last) = last_two(&months)?;
            // last + (last - prev), floored at zero
            let predicted = (2 * last).saturating_sub(prev);
            Some(ForecastResult {
                entity,
                last_period_count: last,
                predicted_next_period: predicted,
                method: FORECAST_METHOD.to_string(),
            })
        })
        .collect();
    Ok(forecasts)
}

/// Month-over-month direction per entity with ≥ 2 observed months.
pub fn trend_direction(
    store: &ComplaintStore,
    kind: EntityKind,
) -> Result<Vec<TrendResult>, StoreError> {
    let trends = monthly_counts(store, kind)?
        .into_iter()
        .filter_map(|(entity, months)| {
            let (prev, last) = last_two(&months)?;
            let trend = match last.cmp(&prev) {
                std::cmp::Ordering::Greater => TrendDirection::Increasing,
                std::cmp::Ordering::Less => TrendDirection::Decreasing,
                std::cmp::Ordering::Equal => TrendDirection::Stable,
            };
            Some(TrendResult {
                entity,
                previous_month_count: prev,
                current_month_count: last,
                trend,
            })
        })
        .collect();
    Ok(trends)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::open_temporary;
    use crate::types::{Category, ComplaintRecord, ComplaintStatus, Priority};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn seed_month(store: &ComplaintStore, category: Category, year: i32, month: u32, n: usize) {
        for day in 0..n {
            store
                .insert(&ComplaintRecord {
                    id: Uuid::new_v4(),
                    title: "t".to_string(),
                    description: "d".to_string(),
                    ward: "Ward-1".to_string(),
                    category,
                    priority: Priority::Low,
                    status: ComplaintStatus::New,
                    created_at: Utc
                        .with_ymd_and_hms(year, month, 1 + (day as u32 % 28), 10, 0, 0)
                        .unwrap(),
                })
                .unwrap();
        }
    }

    fn store() -> ComplaintStore {
        let db = open_temporary().unwrap();
        ComplaintStore::open(&db).unwrap()
    }

    #[test]
    fn test_linear_projection_upward() {
        let store = store();
        seed_month(&store, Category::Water, 2026, 3, 10);
        seed_month(&store, Category::Water, 2026, 4, 15);

        let forecasts = forecast_next_period(&store, EntityKind::Category).unwrap();
        assert_eq!(forecasts.len(), 1);
        assert_eq!(forecasts[0].entity, "Water");
        assert_eq!(forecasts[0].last_period_count, 15);
        // 15 + (15 - 10) = 20
        assert_eq!(forecasts[0].predicted_next_period, 20);
        assert_eq!(forecasts[0].method, FORECAST_METHOD);
    }

    #[test]
    fn test_projection_floored_at_zero() {
        let store = store();
        seed_month(&store, Category::Roads, 2026, 3, 10);
        seed_month(&store, Category::Roads, 2026, 4, 4);

        let forecasts = forecast_next_period(&store, EntityKind::Category).unwrap();
        assert_eq!(forecasts.len(), 1);
        // 4 + (4 - 10) = -2 → floored to 0
        assert_eq!(forecasts[0].predicted_next_period, 0);
    }

    #[test]
    fn test_single_month_is_insufficient_history() {
        let store = store();
        seed_month(&store, Category::Water, 2026, 4, 12);

        let forecasts = forecast_next_period(&store, EntityKind::Category).unwrap();
        assert!(forecasts.is_empty());
    }

    #[test]
    fn test_uses_two_most_recent_months() {
        let store = store();
        seed_month(&store, Category::Water, 2026, 1, 50);
        seed_month(&store, Category::Water, 2026, 3, 10);
        seed_month(&store, Category::Water, 2026, 4, 12);

        let forecasts = forecast_next_period(&store, EntityKind::Category).unwrap();
        // Only March/April matter: 12 + (12 - 10) = 14
        assert_eq!(forecasts[0].predicted_next_period, 14);
    }

    #[test]
    fn test_trend_direction_classification() {
        let store = store();
        seed_month(&store, Category::Water, 2026, 3, 10);
        seed_month(&store, Category::Water, 2026, 4, 15);
        seed_month(&store, Category::Roads, 2026, 3, 9);
        seed_month(&store, Category::Roads, 2026, 4, 4);
        seed_month(&store, Category::Electricity, 2026, 3, 7);
        seed_month(&store, Category::Electricity, 2026, 4, 7);

        let trends = trend_direction(&store, EntityKind::Category).unwrap();
        assert_eq!(trends.len(), 3);

        let by_entity = |name: &str| {
            trends
                .iter()
                .find(|t| t.entity == name)
                .map(|t| t.trend)
                .unwrap()
        };
        assert_eq!(by_entity("Water"), TrendDirection::Increasing);
        assert_eq!(by_entity("Roads"), TrendDirection::Decreasing);
        assert_eq!(by_entity("Electricity"), TrendDirection::Stable);
    }

    #[test]
    fn test_ward_axis_grouping() {
        let store = store();
        // Same category, one ward — grouped under the ward key
        seed_month(&store, Category::Water, 2026, 3, 3);
        seed_month(&store, Category::Water, 2026, 4, 6);

        let forecasts = forecast_next_period(&store, EntityKind::Ward).unwrap();
        assert_eq!(forecasts.len(), 1);
        assert_eq!(forecasts[0].entity, "Ward-1");
        assert_eq!(forecasts[0].predicted_next_period, 9);
    }
}
