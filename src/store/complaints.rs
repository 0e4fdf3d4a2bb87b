//! Complaint record storage
//!
//! Records are keyed by `created_at` seconds (big-endian u64) followed by
//! the record id bytes, so windowed detectors can range-scan a time span
//! without touching the rest of the tree. The engine treats this store as
//! read-only input apart from the hybrid ingestion path.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sled::Tree;
use uuid::Uuid;

use super::StoreError;
use crate::types::{ComplaintRecord, ComplaintStatus};

const COMPLAINTS_TREE: &str = "complaints";

/// Time-indexed complaint store.
#[derive(Clone)]
pub struct ComplaintStore {
    tree: Tree,
}

fn ts_key(created_at: DateTime<Utc>, id: Uuid) -> [u8; 24] {
    let mut key = [0u8; 24];
    // Timestamps before the epoch clamp to 0; complaint data is never that old.
    let secs = u64::try_from(created_at.timestamp()).unwrap_or(0);
    key[..8].copy_from_slice(&secs.to_be_bytes());
    key[8..].copy_from_slice(id.as_bytes());
    key
}

impl ComplaintStore {
    /// Open the complaints tree within the shared engine database.
    pub fn open(db: &Arc<sled::Db>) -> Result<Self, StoreError> {
        let tree = db.open_tree(COMPLAINTS_TREE)?;
        Ok(Self { tree })
    }

    /// Insert an analyzable record (category/priority already resolved).
    pub fn insert(&self, record: &ComplaintRecord) -> Result<(), StoreError> {
        let key = ts_key(record.created_at, record.id);
        let value = serde_json::to_vec(record)?;
        self.tree.insert(key, value)?;
        Ok(())
    }

    /// All records with `start <= created_at < end`, oldest first.
    pub fn in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ComplaintRecord>, StoreError> {
        let start_key = ts_key(start, Uuid::nil());
        let end_key = ts_key(end, Uuid::nil());

        let mut records = Vec::new();
        for item in self.tree.range(start_key..end_key) {
            let (_key, value) = item?;
            match serde_json::from_slice::<ComplaintRecord>(&value) {
                Ok(rec) => records.push(rec),
                // Unparsable entries are skipped, not fatal — the detectors
                // operate on whatever analyzable history exists.
                Err(e) => tracing::warn!(error = %e, "skipping unparsable complaint record"),
            }
        }
        Ok(records)
    }

    /// Every record in the store, oldest first. Used by the monthly
    /// aggregation paths (forecast / trend direction).
    pub fn all(&self) -> Result<Vec<ComplaintRecord>, StoreError> {
        let mut records = Vec::new();
        for item in self.tree.iter() {
            let (_key, value) = item?;
            if let Ok(rec) = serde_json::from_slice::<ComplaintRecord>(&value) {
                records.push(rec);
            }
        }
        Ok(records)
    }

    /// The most recent Resolved records created at or after `since`, newest
    /// first, capped at `limit`, excluding `exclude_id` (self-match guard).
    pub fn resolved_since(
        &self,
        since: DateTime<Utc>,
        limit: usize,
        exclude_id: Option<Uuid>,
    ) -> Result<Vec<ComplaintRecord>, StoreError> {
        let since_key = ts_key(since, Uuid::nil());

        let mut records = Vec::with_capacity(limit);
        for item in self.tree.range(since_key.to_vec()..).rev() {
            if records.len() >= limit {
                break;
            }
            let (_key, value) = item?;
            let Ok(rec) = serde_json::from_slice::<ComplaintRecord>(&value) else {
                continue;
            };
            if rec.status != ComplaintStatus::Resolved {
                continue;
            }
            if exclude_id.is_some_and(|id| id == rec.id) {
                continue;
            }
            records.push(rec);
        }
        Ok(records)
    }

    /// Total stored records.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}
