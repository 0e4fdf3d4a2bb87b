//! Hybrid complaint classification
//!
//! The AI collaborator proposes category and priority labels; confidence
//! governance decides whether each label is trusted; deterministic rule
//! tables always run last and may refine either label. The result is a
//! record whose category and priority are guaranteed valid enum members —
//! including when the collaborator is unreachable, where classification
//! degrades to rules alone.

use tracing::{debug, warn};

use crate::collaborators::{ClassificationProvider, CollabResponse};
use crate::config::GovernanceConfig;
use crate::governance::{self, GovernanceDecision};
use crate::types::{Category, Priority};

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// Rule-based category refinement. The first keyword table hit wins;
/// otherwise the AI category stands.
pub fn refine_category(description: &str, ai_category: Category) -> Category {
    let text = description.to_lowercase();

    if contains_any(
        &text,
        &[
            "pothole",
            "road",
            "gravel",
            "speed breaker",
            "divider",
            "flyover",
            "bridge",
            "culvert",
            "footpath",
            "road damage",
        ],
    ) {
        return Category::Roads;
    }

    if contains_any(
        &text,
        &[
            "electric",
            "wire",
            "pole",
            "transformer",
            "street light",
            "voltage",
            "power cut",
            "current",
            "spark",
        ],
    ) {
        return Category::Electricity;
    }

    if contains_any(
        &text,
        &[
            "garbage",
            "waste",
            "wastage",
            "sewage",
            "drain",
            "manhole",
            "nala",
            "dead animal",
            "bad smell",
        ],
    ) {
        return Category::Sanitation;
    }

    if contains_any(
        &text,
        &[
            "water",
            "pipeline",
            "leakage",
            "tap",
            "tank",
            "supply",
            "drinking water",
        ],
    ) {
        return Category::Water;
    }

    ai_category
}

/// Rule-based priority refinement layered on the AI priority.
///
/// Life-risk terms force High; health/infrastructure/utility terms floor
/// the priority at Medium; unresolved-for-long phrasing escalates; clearly
/// minor issues force Low. Otherwise the AI priority stands.
pub fn refine_priority(description: &str, ai_priority: Priority) -> Priority {
    let text = description.to_lowercase();

    // Life risk
    if contains_any(
        &text,
        &[
            "accident",
            "fatal",
            "death",
            "electrocution",
            "electric shock",
            "fire",
            "blast",
            "explosion",
            "collapsed",
            "fallen pole",
            "exposed wire",
            "live wire",
            "gas leak",
            "severe injury",
            "transformer blast",
        ],
    ) {
        return Priority::High;
    }

    // Health & safety risk
    if contains_any(
        &text,
        &[
            "sewage",
            "open drain",
            "garbage overflow",
            "dead animal",
            "mosquito",
            "rats",
            "dirty water",
            "contaminated",
        ],
    ) {
        return if ai_priority == Priority::Low {
            Priority::Medium
        } else {
            ai_priority
        };
    }

    // Road & infrastructure
    if contains_any(
        &text,
        &[
            "pothole",
            "road damage",
            "footpath broken",
            "signal not working",
            "road flooded",
        ],
    ) {
        return if ai_priority == Priority::Low {
            Priority::Medium
        } else {
            ai_priority
        };
    }

    // Utilities
    if contains_any(
        &text,
        &["power cut", "street light not working", "voltage fluctuation"],
    ) {
        return if ai_priority == Priority::Low {
            Priority::Medium
        } else {
            ai_priority
        };
    }

    // Time escalation
    if contains_any(
        &text,
        &[
            "for days",
            "for weeks",
            "still not fixed",
            "multiple complaints",
            "no action taken",
        ],
    ) {
        return if ai_priority == Priority::Low {
            Priority::Medium
        } else {
            Priority::High
        };
    }

    // Clearly minor
    if contains_any(
        &text,
        &[
            "dim light",
            "faded",
            "minor",
            "cosmetic",
            "slow",
            "low pressure",
            "blinking",
            "dust",
            "mud",
            "tree branches",
        ],
    ) {
        return Priority::Low;
    }

    ai_priority
}

/// Result of the hybrid classification path. Category and priority are
/// always valid enum members.
#[derive(Debug, Clone)]
pub struct ClassificationOutcome {
    pub category: Category,
    pub priority: Priority,
    /// Governance decision for the AI category, absent when the
    /// collaborator was unavailable.
    pub category_decision: Option<GovernanceDecision>,
    pub priority_decision: Option<GovernanceDecision>,
    /// True when the collaborator could not contribute and rules alone
    /// classified the complaint.
    pub degraded: bool,
    pub model_version: Option<String>,
}

/// Classify complaint text through the AI collaborator with rule
/// refinement, degrading to rules alone when the collaborator is down.
pub async fn classify_hybrid(
    provider: &dyn ClassificationProvider,
    text: &str,
    cfg: &GovernanceConfig,
) -> ClassificationOutcome {
    match provider.classify(text).await {
        CollabResponse::Ok(pred) => {
            let category_decision =
                governance::evaluate(&pred.category, pred.category_confidence, cfg);
            let priority_decision =
                governance::evaluate(&pred.priority, pred.priority_confidence, cfg);

            // A label that requires review is not trusted; the rule tables
            // classify from a neutral starting point instead.
            let ai_category = if category_decision.requires_human_review {
                Category::Uncertain
            } else {
                Category::parse(&pred.category).unwrap_or(Category::Uncertain)
            };
            let ai_priority = if priority_decision.requires_human_review {
                Priority::Medium
            } else {
                Priority::parse(&pred.priority).unwrap_or(Priority::Medium)
            };

            let category = refine_category(text, ai_category);
            let priority = refine_priority(text, ai_priority);
            debug!(%category, %priority, model = %pred.model_version, "hybrid classification complete");

            ClassificationOutcome {
                category,
                priority,
                category_decision: Some(category_decision),
                priority_decision: Some(priority_decision),
                degraded: false,
                model_version: Some(pred.model_version),
            }
        }
        CollabResponse::Unavailable(reason) | CollabResponse::Invalid(reason) => {
            warn!(%reason, "classification collaborator unusable — falling back to rule-based classification");
            ClassificationOutcome {
                category: refine_category(text, Category::Uncertain),
                priority: refine_priority(text, Priority::Medium),
                category_decision: None,
                priority_decision: None,
                degraded: true,
                model_version: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::ClassifierPrediction;
    use async_trait::async_trait;

    struct StubClassifier {
        response: CollabResponse<ClassifierPrediction>,
    }

    #[async_trait]
    impl ClassificationProvider for StubClassifier {
        async fn classify(&self, _text: &str) -> CollabResponse<ClassifierPrediction> {
            self.response.clone()
        }
    }

    #[test]
    fn test_category_rules_override_ai() {
        assert_eq!(
            refine_category("huge pothole near the market", Category::Water),
            Category::Roads
        );
        assert_eq!(
            refine_category("transformer sparking at night", Category::Uncertain),
            Category::Electricity
        );
        assert_eq!(
            refine_category("garbage not collected", Category::Uncertain),
            Category::Sanitation
        );
    }

    #[test]
    fn test_category_falls_back_to_ai() {
        assert_eq!(
            refine_category("general nuisance in the area", Category::Water),
            Category::Water
        );
    }

    #[test]
    fn test_priority_life_risk_forces_high() {
        assert_eq!(
            refine_priority("live wire hanging over the street", Priority::Low),
            Priority::High
        );
    }

    #[test]
    fn test_priority_health_risk_floors_at_medium() {
        assert_eq!(
            refine_priority("sewage overflowing", Priority::Low),
            Priority::Medium
        );
        assert_eq!(
            refine_priority("sewage overflowing", Priority::High),
            Priority::High
        );
    }

    #[test]
    fn test_priority_time_escalation() {
        assert_eq!(
            refine_priority("still not fixed after reporting", Priority::Medium),
            Priority::High
        );
        assert_eq!(
            refine_priority("still not fixed after reporting", Priority::Low),
            Priority::Medium
        );
    }

    #[test]
    fn test_priority_minor_forces_low() {
        assert_eq!(
            refine_priority("street light a bit dim light", Priority::High),
            Priority::Low
        );
    }

    #[tokio::test]
    async fn test_hybrid_trusts_confident_labels() {
        let stub = StubClassifier {
            response: CollabResponse::Ok(ClassifierPrediction {
                category: "Electricity".to_string(),
                priority: "High".to_string(),
                category_confidence: 0.9,
                priority_confidence: 0.9,
                model_version: "v1".to_string(),
            }),
        };
        let out = classify_hybrid(&stub, "no lights in our lane", &GovernanceConfig::default()).await;
        assert_eq!(out.category, Category::Electricity);
        assert_eq!(out.priority, Priority::High);
        assert!(!out.degraded);
    }

    #[tokio::test]
    async fn test_hybrid_low_confidence_falls_back_to_rules() {
        let stub = StubClassifier {
            response: CollabResponse::Ok(ClassifierPrediction {
                category: "Roads".to_string(),
                priority: "High".to_string(),
                category_confidence: 0.2,
                priority_confidence: 0.2,
                model_version: "v1".to_string(),
            }),
        };
        // Low-confidence AI labels are discarded; "water" keyword rules in
        let out = classify_hybrid(&stub, "no water supply since morning", &GovernanceConfig::default()).await;
        assert_eq!(out.category, Category::Water);
        assert_eq!(out.priority, Priority::Medium);
        assert!(out
            .category_decision
            .as_ref()
            .is_some_and(|d| d.requires_human_review));
    }

    #[tokio::test]
    async fn test_hybrid_degrades_when_collaborator_down() {
        let stub = StubClassifier {
            response: CollabResponse::Unavailable("connection refused".to_string()),
        };
        let out = classify_hybrid(&stub, "open drain full of sewage", &GovernanceConfig::default()).await;
        assert_eq!(out.category, Category::Sanitation);
        assert_eq!(out.priority, Priority::Medium);
        assert!(out.degraded);
        // Rules always produce a valid enum — never a null label
    }

    #[tokio::test]
    async fn test_hybrid_unmatched_text_stays_uncertain() {
        let stub = StubClassifier {
            response: CollabResponse::Unavailable("timeout".to_string()),
        };
        let out = classify_hybrid(&stub, "strange humming noise at night", &GovernanceConfig::default()).await;
        assert_eq!(out.category, Category::Uncertain);
        assert_eq!(out.priority, Priority::Medium);
    }
}
