//! Complaint record types
//!
//! The complaint store is the single input of every detector. A record is
//! only considered analyzable once category and priority carry one of the
//! enumerated values — the hybrid classification path guarantees this, so
//! detectors never see a null label.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Complaint category.
///
/// `Uncertain` is the sentinel the classification collaborator returns when
/// it cannot commit to a label; confidence governance routes it to human
/// review and the rule tables get a chance to refine it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Sanitation,
    Roads,
    Electricity,
    Water,
    Uncertain,
}

impl Category {
    /// Parse a category from its wire name. Returns `None` for unknown input
    /// so callers report a field-level validation error instead of guessing.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Sanitation" => Some(Self::Sanitation),
            "Roads" => Some(Self::Roads),
            "Electricity" => Some(Self::Electricity),
            "Water" => Some(Self::Water),
            "Uncertain" => Some(Self::Uncertain),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Sanitation => "Sanitation",
            Self::Roads => "Roads",
            Self::Electricity => "Electricity",
            Self::Water => "Water",
            Self::Uncertain => "Uncertain",
        };
        write!(f, "{s}")
    }
}

/// Complaint priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Severity weight used by the hotspot score formula.
    pub const fn weight(self) -> u64 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Low" => Some(Self::Low),
            "Medium" => Some(Self::Medium),
            "High" => Some(Self::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        };
        write!(f, "{s}")
    }
}

/// Complaint workflow status. Only `Resolved` complaints are probative for
/// repeat-pattern detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplaintStatus {
    New,
    InProgress,
    Resolved,
}

/// A single categorized complaint as stored in the complaint store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplaintRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Administrative unit — the spatial grouping key for every detector.
    pub ward: String,
    pub category: Category,
    pub priority: Priority,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
}

impl ComplaintRecord {
    /// Combined title + description text used for embedding comparisons.
    pub fn combined_text(&self) -> String {
        if self.title.is_empty() {
            self.description.clone()
        } else {
            format!("{} {}", self.title, self.description)
        }
    }
}
