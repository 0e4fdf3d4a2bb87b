//! Alert storage with a store-level suppression guard
//!
//! Two trees:
//! - `alerts` — id-keyed JSON alert records (never deleted)
//! - `alert_suppression` — (ward, category, type) → last-created timestamp,
//!   advanced with `compare_and_swap`
//!
//! The suppression index is the uniqueness guard the lifecycle design
//! requires: concurrent `generate()` runs race on the CAS, and only the
//! winner inserts an alert for the window. A plain query-then-insert would
//! let both writers through.
//!
//! Status transitions are also CAS updates — the expected serialized bytes
//! must still be in place, so two actors cannot both "successfully"
//! transition the same alert.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sled::{IVec, Tree};
use uuid::Uuid;

use super::StoreError;
use crate::types::Alert;

const ALERTS_TREE: &str = "alerts";
const SUPPRESSION_TREE: &str = "alert_suppression";

/// Separator for suppression keys. Ward names are operator data; the unit
/// separator cannot collide with them.
const KEY_SEP: char = '\u{1f}';

/// Outcome of a guarded alert creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    Suppressed,
}

/// Outcome of a conditional status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    Updated,
    /// The stored record changed between fetch and swap (lost the race).
    Conflict,
}

/// Persistent alert store.
#[derive(Clone)]
pub struct AlertStore {
    alerts: Tree,
    suppression: Tree,
}

impl AlertStore {
    /// Open the alert trees within the shared engine database.
    pub fn open(db: &Arc<sled::Db>) -> Result<Self, StoreError> {
        let alerts = db.open_tree(ALERTS_TREE)?;
        let suppression = db.open_tree(SUPPRESSION_TREE)?;
        Ok(Self { alerts, suppression })
    }

    fn suppression_key(alert: &Alert) -> String {
        format!(
            "{}{KEY_SEP}{}{KEY_SEP}{}",
            alert.ward, alert.category, alert.alert_type
        )
    }

    /// Insert `alert` unless another alert with the same (ward, category,
    /// type) was created inside the suppression window.
    ///
    /// The last-created timestamp is advanced with compare-and-swap, so of
    /// two racing writers exactly one observes the stale value and wins;
    /// the loser re-reads and sees the fresh timestamp inside the window.
    pub fn create_unless_suppressed(
        &self,
        alert: &Alert,
        window: Duration,
    ) -> Result<CreateOutcome, StoreError> {
        let key = Self::suppression_key(alert);
        let new_ts = u64::try_from(alert.created_at.timestamp()).unwrap_or(0);

        loop {
            let current = self.suppression.get(&key)?;

            if let Some(bytes) = &current {
                if let Some(last_ts) = decode_ts(bytes) {
                    let last = DateTime::<Utc>::from_timestamp(i64::try_from(last_ts).unwrap_or(0), 0)
                        .unwrap_or_default();
                    if alert.created_at.signed_duration_since(last) < window {
                        return Ok(CreateOutcome::Suppressed);
                    }
                }
            }

            let swap = self.suppression.compare_and_swap(
                key.as_bytes(),
                current,
                Some(new_ts.to_be_bytes().to_vec()),
            )?;

            if swap.is_ok() {
                let value = serde_json::to_vec(alert)?;
                self.alerts.insert(alert.id.as_bytes(), value)?;
                return Ok(CreateOutcome::Created);
            }
            // CAS lost — another writer advanced the index; re-check.
        }
    }

    /// Fetch an alert with its raw stored bytes (for a later CAS update).
    pub fn fetch_raw(&self, id: Uuid) -> Result<Option<(Alert, IVec)>, StoreError> {
        let Some(raw) = self.alerts.get(id.as_bytes())? else {
            return Ok(None);
        };
        let alert: Alert = serde_json::from_slice(&raw)?;
        Ok(Some((alert, raw)))
    }

    /// Replace an alert record iff the stored bytes are still `expected`.
    pub fn swap(
        &self,
        id: Uuid,
        expected: &IVec,
        updated: &Alert,
    ) -> Result<SwapOutcome, StoreError> {
        let new_bytes = serde_json::to_vec(updated)?;
        let result = self.alerts.compare_and_swap(
            id.as_bytes(),
            Some(expected.clone()),
            Some(new_bytes),
        )?;
        Ok(if result.is_ok() {
            SwapOutcome::Updated
        } else {
            SwapOutcome::Conflict
        })
    }

    /// All alerts, newest first.
    pub fn list_newest_first(&self) -> Result<Vec<Alert>, StoreError> {
        let mut alerts = Vec::new();
        for item in self.alerts.iter() {
            let (_key, value) = item?;
            match serde_json::from_slice::<Alert>(&value) {
                Ok(alert) => alerts.push(alert),
                Err(e) => tracing::warn!(error = %e, "skipping unparsable alert record"),
            }
        }
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(alerts)
    }

    /// Total stored alerts.
    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

fn decode_ts(bytes: &IVec) -> Option<u64> {
    let arr: [u8; 8] = bytes.as_ref().try_into().ok()?;
    Some(u64::from_be_bytes(arr))
}
