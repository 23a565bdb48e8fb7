//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Default driver parameter ceiling used for modular batch sizing.
///
/// 2100 is the per-command bound-parameter limit of the most restrictive
/// mainstream engine (SQL Server); drivers with a higher ceiling can raise
/// it through [`EngineConfig::with_parameter_ceiling`].
pub const DEFAULT_PARAMETER_CEILING: usize = 2100;

/// Engine-wide policy knobs.
///
/// A config is a plain value passed to the components that need it; the
/// engine holds no ambient global configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Whether field names are matched case-insensitively against row
    /// metadata and schemas.
    pub case_insensitive_fields: bool,

    /// Maximum bound parameters per statement, used to derive the modular
    /// batch size when no explicit batch size is given.
    pub parameter_ceiling: usize,
}

impl EngineConfig {
    /// Create a configuration with the default policies.
    pub fn new() -> Self {
        Self {
            case_insensitive_fields: true,
            parameter_ceiling: DEFAULT_PARAMETER_CEILING,
        }
    }

    /// Set case-sensitive field matching.
    pub fn with_case_sensitive_fields(mut self) -> Self {
        self.case_insensitive_fields = false;
        self
    }

    /// Set the driver parameter ceiling.
    pub fn with_parameter_ceiling(mut self, ceiling: usize) -> Self {
        self.parameter_ceiling = ceiling;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
