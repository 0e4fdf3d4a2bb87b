//! Repeat-pattern advisory results
//!
//! Matches exist only in the response of one advisory check — nothing here
//! is persisted and no `is_repeated` flag is ever written back to a record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Category;

/// Advisory confidence tier for an accepted match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AdvisoryLevel {
    Possible,
    Strong,
}

/// Which signals contributed to a match. Semantic is always true for an
/// accepted match — it is the mandatory gate; keyword and ward are the
/// supporting signals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatchedSignals {
    pub semantic: bool,
    pub keyword: bool,
    pub ward: bool,
}

/// One historical resolved complaint accepted by the gating rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityMatch {
    pub complaint_id: Uuid,
    pub title: String,
    pub ward: String,
    pub category: Category,
    pub resolved_at: DateTime<Utc>,
    /// Cosine similarity in [0, 1], rounded to three decimals.
    pub similarity_indicator: f64,
    pub matched_signals: MatchedSignals,
    pub advisory_level: AdvisoryLevel,
}

/// Outcome of one advisory check.
///
/// `Inconclusive` is the fail-closed path when the embedding collaborator
/// is unavailable — it is never collapsed into "confirmed not a repeat".
#[derive(Debug, Clone)]
pub enum AdvisoryOutcome {
    Assessed {
        matches: Vec<SimilarityMatch>,
    },
    Inconclusive {
        reason: String,
    },
}

impl AdvisoryOutcome {
    /// Highest advisory level among accepted matches, if any.
    pub fn advisory_level(&self) -> Option<AdvisoryLevel> {
        match self {
            Self::Assessed { matches } => matches.iter().map(|m| m.advisory_level).max(),
            Self::Inconclusive { .. } => None,
        }
    }
}
