//! Alert lifecycle management
//!
//! Promotes the most serious detector findings — High hotspots and Severe
//! spikes — into persistent, auditable alert records and walks them through
//! the strictly forward Open → Acknowledged → Resolved state machine.
//! Lower-tier findings stay on the analytical read path and never become
//! alerts.
//!
//! Duplicate protection and transition atomicity both live at the store
//! layer (`create_unless_suppressed` and `swap`); this module enforces the
//! lifecycle rules and input validation on top.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::detectors;
use crate::store::{AlertStore, ComplaintStore, CreateOutcome, StoreError, SwapOutcome};
use crate::types::{
    Alert, AlertStatus, AlertType, GenerationSummary, HotspotSeverity, SpikeSeverity,
};

/// Errors surfaced by alert lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("{0}")]
    Validation(String),

    #[error("alert is {current}, cannot {attempted}")]
    InvalidTransition {
        current: AlertStatus,
        attempted: &'static str,
    },

    #[error("alert {0} not found")]
    NotFound(Uuid),

    #[error("alert {0} was modified concurrently, retry the operation")]
    Conflict(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Detector-to-alert promotion and lifecycle transitions.
#[derive(Clone)]
pub struct AlertManager {
    complaints: ComplaintStore,
    alerts: AlertStore,
}

impl AlertManager {
    pub fn new(complaints: ComplaintStore, alerts: AlertStore) -> Self {
        Self { complaints, alerts }
    }

    pub fn alert_store(&self) -> &AlertStore {
        &self.alerts
    }

    /// Run both detectors and create alerts for High hotspots and Severe
    /// spikes, skipping any (ward, category, type) that already alerted
    /// inside the suppression window.
    ///
    /// Idempotent: a second run over the same findings creates nothing.
    pub fn generate(
        &self,
        as_of: DateTime<Utc>,
        cfg: &EngineConfig,
    ) -> Result<GenerationSummary, EngineError> {
        let window = Duration::days(cfg.alerts.suppression_window_days);
        let mut summary = GenerationSummary::default();

        let hotspots = detectors::identify_hotspots(&self.complaints, as_of, &cfg.hotspot)?;
        for hotspot in hotspots
            .iter()
            .filter(|h| h.severity == HotspotSeverity::High)
        {
            let alert = Alert {
                id: Uuid::new_v4(),
                alert_type: AlertType::Hotspot,
                ward: hotspot.ward.clone(),
                category: hotspot.category,
                severity: hotspot.severity.into(),
                reference_score: hotspot.hotspot_score as f64,
                description: format!(
                    "High {} complaint concentration detected in {} over the last {} days.",
                    hotspot.category.to_string().to_lowercase(),
                    hotspot.ward,
                    cfg.hotspot.window_days,
                ),
                status: AlertStatus::Open,
                acknowledged_by: None,
                acknowledged_at: None,
                resolution_note: None,
                resolved_at: None,
                created_at: as_of,
            };
            if self.create_guarded(&alert, window)? == CreateOutcome::Created {
                summary.hotspot_alerts_created += 1;
            }
        }

        let spikes = detectors::detect_spikes(&self.complaints, as_of, &cfg.spike)?;
        for spike in spikes
            .iter()
            .filter(|s| s.severity == SpikeSeverity::Severe)
        {
            let alert = Alert {
                id: Uuid::new_v4(),
                alert_type: AlertType::Spike,
                ward: spike.ward.clone(),
                category: spike.category,
                severity: spike.severity.into(),
                reference_score: spike.spike_ratio,
                description: format!(
                    "Severe spike in {}-related complaints detected in {} compared to historical baseline.",
                    spike.category.to_string().to_lowercase(),
                    spike.ward,
                ),
                status: AlertStatus::Open,
                acknowledged_by: None,
                acknowledged_at: None,
                resolution_note: None,
                resolved_at: None,
                created_at: as_of,
            };
            if self.create_guarded(&alert, window)? == CreateOutcome::Created {
                summary.spike_alerts_created += 1;
            }
        }

        summary.total_alerts_created =
            summary.hotspot_alerts_created + summary.spike_alerts_created;
        info!(
            hotspot_alerts = summary.hotspot_alerts_created,
            spike_alerts = summary.spike_alerts_created,
            "alert generation run complete"
        );
        Ok(summary)
    }

    /// Guarded create. A store failure during the duplicate check skips
    /// this finding rather than risking a duplicate alert — the next
    /// generation run picks it up.
    fn create_guarded(
        &self,
        alert: &Alert,
        window: Duration,
    ) -> Result<CreateOutcome, EngineError> {
        match self.alerts.create_unless_suppressed(alert, window) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!(
                    ward = %alert.ward,
                    category = %alert.category,
                    error = %e,
                    "skipping alert creation after store error"
                );
                Ok(CreateOutcome::Suppressed)
            }
        }
    }

    /// Transition Open → Acknowledged, recording who acknowledged and when.
    pub fn acknowledge(
        &self,
        id: Uuid,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<Alert, EngineError> {
        let actor = actor.trim();
        if actor.is_empty() {
            return Err(EngineError::Validation(
                "acknowledging actor is required".to_string(),
            ));
        }

        let (alert, raw) = self.alerts.fetch_raw(id)?.ok_or(EngineError::NotFound(id))?;
        if alert.status != AlertStatus::Open {
            return Err(EngineError::InvalidTransition {
                current: alert.status,
                attempted: "acknowledge",
            });
        }

        let mut updated = alert;
        updated.status = AlertStatus::Acknowledged;
        updated.acknowledged_by = Some(actor.to_string());
        updated.acknowledged_at = Some(now);

        match self.alerts.swap(id, &raw, &updated)? {
            SwapOutcome::Updated => {
                info!(alert_id = %id, actor, "alert acknowledged");
                Ok(updated)
            }
            SwapOutcome::Conflict => Err(EngineError::Conflict(id)),
        }
    }

    /// Transition Acknowledged → Resolved with a mandatory resolution note.
    pub fn resolve(
        &self,
        id: Uuid,
        resolution_note: &str,
        now: DateTime<Utc>,
    ) -> Result<Alert, EngineError> {
        let note = resolution_note.trim();
        if note.is_empty() {
            return Err(EngineError::Validation(
                "a non-empty resolution note is required".to_string(),
            ));
        }

        let (alert, raw) = self.alerts.fetch_raw(id)?.ok_or(EngineError::NotFound(id))?;
        if alert.status != AlertStatus::Acknowledged {
            return Err(EngineError::InvalidTransition {
                current: alert.status,
                attempted: "resolve",
            });
        }

        let mut updated = alert;
        updated.status = AlertStatus::Resolved;
        updated.resolution_note = Some(note.to_string());
        updated.resolved_at = Some(now);

        match self.alerts.swap(id, &raw, &updated)? {
            SwapOutcome::Updated => {
                info!(alert_id = %id, "alert resolved");
                Ok(updated)
            }
            SwapOutcome::Conflict => Err(EngineError::Conflict(id)),
        }
    }

    /// All alerts, newest first.
    pub fn list(&self) -> Result<Vec<Alert>, EngineError> {
        Ok(self.alerts.list_newest_first()?)
    }
}
