//! Engine Configuration - detection and governance policy as tunable TOML
//!
//! Every threshold in the detection and advisory pipeline is a field here.
//! Each struct implements `Default` with the documented policy values, so
//! behavior is unchanged when no config file is present.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Root configuration for an engine deployment.
///
/// Load with `EngineConfig::load()` which searches:
/// 1. `$CIVIC_SIGNAL_CONFIG` env var
/// 2. `./engine.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Hotspot detection thresholds
    #[serde(default)]
    pub hotspot: HotspotConfig,

    /// Spike detection thresholds
    #[serde(default)]
    pub spike: SpikeConfig,

    /// Alert generation policy
    #[serde(default)]
    pub alerts: AlertConfig,

    /// Confidence governance thresholds
    #[serde(default)]
    pub governance: GovernanceConfig,

    /// Repeat-pattern similarity thresholds
    #[serde(default)]
    pub similarity: SimilarityConfig,

    /// External collaborator endpoints
    #[serde(default)]
    pub collaborators: CollaboratorConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hotspot: HotspotConfig::default(),
            spike: SpikeConfig::default(),
            alerts: AlertConfig::default(),
            governance: GovernanceConfig::default(),
            similarity: SimilarityConfig::default(),
            collaborators: CollaboratorConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// Hotspot detector thresholds (trailing-window weighted scoring).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HotspotConfig {
    /// Trailing window scanned for complaints, in days.
    pub window_days: i64,
    /// Minimum total complaints for a group to qualify.
    pub min_complaints: u64,
    /// Minimum weighted score for a group to qualify.
    pub score_threshold: u64,
    /// Weighted score at which severity becomes High.
    pub high_severity_min: u64,
}

impl Default for HotspotConfig {
    fn default() -> Self {
        Self {
            window_days: 30,
            min_complaints: 10,
            score_threshold: 25,
            high_severity_min: 35,
        }
    }
}

/// Spike detector thresholds (dual-window comparison).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpikeConfig {
    /// Current window length in days.
    pub current_window_days: i64,
    /// Baseline window length in days (immediately preceding the current).
    pub baseline_window_days: i64,
    /// Minimum baseline weekly average — the evidence floor that stops
    /// near-zero history from producing false spikes.
    pub min_baseline_weekly_avg: f64,
    /// Minimum current/baseline ratio for a spike to qualify.
    pub ratio_threshold: f64,
    /// Ratio at which severity becomes Severe.
    pub severe_ratio_min: f64,
}

impl Default for SpikeConfig {
    fn default() -> Self {
        Self {
            current_window_days: 7,
            baseline_window_days: 30,
            min_baseline_weekly_avg: 5.0,
            ratio_threshold: 2.0,
            severe_ratio_min: 3.0,
        }
    }
}

/// Alert generation policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Days during which a duplicate (ward, category, type) alert is
    /// suppressed.
    pub suppression_window_days: i64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            suppression_window_days: 30,
        }
    }
}

/// Confidence governance thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceConfig {
    /// Confidence at or above which an AI label is trusted outright.
    pub confirmed_min: f64,
    /// Confidence at or above which an AI label is used but flagged
    /// advisory. Below this, human review is required.
    pub suggested_min: f64,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            confirmed_min: 0.75,
            suggested_min: 0.55,
        }
    }
}

/// Repeat-pattern similarity thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Mandatory semantic floor — candidates below are rejected outright.
    pub semantic_floor: f64,
    /// Similarity at which a match is accepted with no supporting signal.
    pub strong_threshold: f64,
    /// Similarity at which a match is "Strong" on semantics alone.
    pub very_strong_threshold: f64,
    /// Historical window for candidate complaints, in days.
    pub history_days: i64,
    /// Most recent candidates compared per check.
    pub max_candidates: usize,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            semantic_floor: 0.60,
            strong_threshold: 0.75,
            very_strong_threshold: 0.80,
            history_days: 180,
            max_candidates: 20,
        }
    }
}

/// External collaborator endpoints and timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollaboratorConfig {
    /// Classification service URL (POST, free text → labels + confidences).
    pub classifier_url: String,
    /// Embedding service URL (POST, free text → float vector).
    pub embedding_url: String,
    /// Bounded timeout for every collaborator call, in seconds.
    pub timeout_secs: u64,
}

impl Default for CollaboratorConfig {
    fn default() -> Self {
        Self {
            classifier_url: "http://127.0.0.1:8000/predict".to_string(),
            embedding_url: "http://127.0.0.1:8000/embed".to_string(),
            timeout_secs: 10,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address for the API server.
    pub bind: String,
    /// Directory for sled databases.
    pub data_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            data_dir: "./data".to_string(),
        }
    }
}

/// Configuration load errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl EngineConfig {
    /// Load configuration using the standard search order:
    /// 1. `$CIVIC_SIGNAL_CONFIG` environment variable
    /// 2. `./engine.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("CIVIC_SIGNAL_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded engine config from CIVIC_SIGNAL_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from CIVIC_SIGNAL_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "CIVIC_SIGNAL_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from("engine.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded engine config from ./engine.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./engine.toml, using defaults");
                }
            }
        }

        info!("No engine.toml found — using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_policy() {
        let c = EngineConfig::default();
        assert_eq!(c.hotspot.window_days, 30);
        assert_eq!(c.hotspot.min_complaints, 10);
        assert_eq!(c.hotspot.score_threshold, 25);
        assert_eq!(c.hotspot.high_severity_min, 35);
        assert!((c.spike.min_baseline_weekly_avg - 5.0).abs() < f64::EPSILON);
        assert!((c.spike.ratio_threshold - 2.0).abs() < f64::EPSILON);
        assert_eq!(c.alerts.suppression_window_days, 30);
        assert!((c.governance.confirmed_min - 0.75).abs() < f64::EPSILON);
        assert!((c.governance.suggested_min - 0.55).abs() < f64::EPSILON);
        assert!((c.similarity.semantic_floor - 0.60).abs() < f64::EPSILON);
        assert_eq!(c.similarity.max_candidates, 20);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml_str = r#"
            [hotspot]
            window_days = 14

            [similarity]
            semantic_floor = 0.65
        "#;
        let config: EngineConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.hotspot.window_days, 14);
        // Untouched fields keep their defaults
        assert_eq!(config.hotspot.min_complaints, 10);
        assert!((config.similarity.semantic_floor - 0.65).abs() < f64::EPSILON);
        assert_eq!(config.spike.current_window_days, 7);
    }

    #[test]
    fn test_load_from_missing_file_errors() {
        let err = EngineConfig::load_from_file(Path::new("/nonexistent/engine.toml"));
        assert!(err.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "[alerts]\nsuppression_window_days = 14\n").unwrap();

        let config = EngineConfig::load_from_file(&path).unwrap();
        assert_eq!(config.alerts.suppression_window_days, 14);
        assert_eq!(config.hotspot.window_days, 30);
    }
}
