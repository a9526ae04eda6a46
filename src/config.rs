//! Planner configuration.

use serde::{Deserialize, Serialize};

/// Configuration shared by planning and synchronisation passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Whether undeclared port names may be accepted when they match one of
    /// the task model's dynamic port patterns.
    pub allow_dynamic_ports: bool,
    /// Whether synchronisation computes the diff without pushing it to the
    /// deployment layer.
    pub dry_run_sync: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            allow_dynamic_ports: true,
            dry_run_sync: false,
        }
    }
}

impl PlannerConfig {
    /// Creates a strict configuration that only accepts declared ports.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            allow_dynamic_ports: false,
            dry_run_sync: false,
        }
    }

    /// Creates a configuration that never pushes changes to deployment.
    ///
    /// Useful for previewing the connection changes a plan would cause.
    #[must_use]
    pub const fn dry_run() -> Self {
        Self {
            allow_dynamic_ports: true,
            dry_run_sync: true,
        }
    }

    /// Parses a configuration from JSON; missing keys take default values.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] when the document is not valid JSON or
    /// a field has the wrong type.
    pub fn from_json(document: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(document)
    }
}
