//! Sled-backed persistence
//!
//! One sled database holds named trees for complaints, alerts and the
//! alert suppression index. Values are JSON; keys that need chronological
//! iteration are big-endian timestamps so sled's ordered iteration gives
//! time order for free.

mod alerts;
mod complaints;

pub use alerts::{AlertStore, CreateOutcome, SwapOutcome};
pub use complaints::ComplaintStore;

use std::path::Path;
use std::sync::Arc;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Open (or create) the engine database at the given path.
pub fn open_db<P: AsRef<Path>>(path: P) -> Result<Arc<sled::Db>, StoreError> {
    let db = sled::open(path)?;
    Ok(Arc::new(db))
}

/// Open a throwaway in-memory database (tests).
pub fn open_temporary() -> Result<Arc<sled::Db>, StoreError> {
    let db = sled::Config::new().temporary(true).open()?;
    Ok(Arc::new(db))
}
