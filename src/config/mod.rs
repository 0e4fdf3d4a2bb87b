//! Engine Configuration Module
//!
//! All detection thresholds, suppression windows, similarity cut-offs and
//! collaborator endpoints are operator-tunable TOML values with built-in
//! defaults matching the documented policy.
//!
//! ## Loading Order
//!
//! 1. `CIVIC_SIGNAL_CONFIG` environment variable (path to TOML file)
//! 2. `engine.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere:
//!
//! ```ignore
//! // In main():
//! config::init(EngineConfig::load());
//!
//! // Anywhere in the codebase:
//! let floor = config::get().similarity.semantic_floor;
//! ```

mod engine_config;

pub use engine_config::*;

use std::sync::OnceLock;

/// Global engine configuration, initialized once at startup.
static ENGINE_CONFIG: OnceLock<EngineConfig> = OnceLock::new();

/// Initialize the global engine configuration.
///
/// Must be called exactly once before any calls to `get()`. A second call
/// is ignored with a warning.
pub fn init(config: EngineConfig) {
    if ENGINE_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once — ignoring");
    }
}

/// Get a reference to the global engine configuration, falling back to the
/// built-in defaults when `init()` was never called (tests, library use).
pub fn get() -> &'static EngineConfig {
    ENGINE_CONFIG.get_or_init(EngineConfig::default)
}

/// Check whether the config has been initialized.
pub fn is_initialized() -> bool {
    ENGINE_CONFIG.get().is_some()
}
