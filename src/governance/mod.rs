//! Confidence governance
//!
//! Policy mapping a (label, confidence) pair to a trust decision. AI
//! predictions must be confidence-aware and auditable: a low-confidence or
//! uncertain label is never silently trusted, it is routed to human review
//! and the caller decides whether to fall back to rule-based
//! classification. Pure — no state, no persistence.

use serde::{Deserialize, Serialize};

use crate::config::GovernanceConfig;

/// Sentinel label the classification collaborator returns when it cannot
/// commit to a prediction.
pub const UNCERTAIN_LABEL: &str = "Uncertain";

/// Governance decision status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionStatus {
    #[serde(rename = "AI_CONFIRMED")]
    AiConfirmed,
    #[serde(rename = "AI_SUGGESTED")]
    AiSuggested,
    #[serde(rename = "REQUIRES_REVIEW")]
    RequiresReview,
}

/// Outcome of evaluating one prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceDecision {
    pub decision_status: DecisionStatus,
    pub requires_human_review: bool,
    pub reason: String,
}

impl GovernanceDecision {
    fn review(reason: &str) -> Self {
        Self {
            decision_status: DecisionStatus::RequiresReview,
            requires_human_review: true,
            reason: reason.to_string(),
        }
    }
}

/// Evaluate a prediction against the governance thresholds.
///
/// - confidence ≥ confirmed_min → AiConfirmed, trusted without review
/// - suggested_min ≤ confidence < confirmed_min → AiSuggested, used but
///   flagged advisory
/// - below suggested_min, label "Uncertain", or malformed inputs (empty
///   label, confidence outside [0, 1] or NaN) → RequiresReview
pub fn evaluate(label: &str, confidence: f64, cfg: &GovernanceConfig) -> GovernanceDecision {
    if label.trim().is_empty() {
        return GovernanceDecision::review("invalid prediction label");
    }

    if confidence.is_nan() || !(0.0..=1.0).contains(&confidence) {
        return GovernanceDecision::review("invalid confidence score");
    }

    if label == UNCERTAIN_LABEL {
        return GovernanceDecision::review("model returned uncertain prediction");
    }

    if confidence >= cfg.confirmed_min {
        return GovernanceDecision {
            decision_status: DecisionStatus::AiConfirmed,
            requires_human_review: false,
            reason: "high confidence prediction".to_string(),
        };
    }

    if confidence >= cfg.suggested_min {
        return GovernanceDecision {
            decision_status: DecisionStatus::AiSuggested,
            requires_human_review: false,
            reason: "medium confidence prediction - advisory only".to_string(),
        };
    }

    GovernanceDecision::review("low confidence prediction requires human verification")
}
