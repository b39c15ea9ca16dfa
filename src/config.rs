//! Engine configuration.
//!
//! Every field has a default, so an empty TOML document is a valid configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration for the assignment engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Reject programs where a tag appears under more than one rule.
    #[serde(default = "default_reject_tag_collisions")]
    pub reject_tag_collisions: bool,

    /// Capacity solver settings
    #[serde(default)]
    pub solver: SolverConfig,
}

/// Which integer programming backend solves the capacity phases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// Pure-Rust branch and bound through `good_lp`.
    #[default]
    #[serde(alias = "microlp")]
    MicroLp,
    /// OR-Tools CP-SAT (requires the `cp-sat` feature).
    CpSat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    #[serde(default)]
    pub backend: Backend,

    /// Wall-clock bound per solve, in seconds. A solve that runs past it yields nothing.
    #[serde(default)]
    pub time_limit_secs: Option<f64>,

    /// CP-SAT search workers
    #[serde(default = "default_num_workers")]
    pub num_workers: u32,

    /// CP-SAT random seed
    #[serde(default = "default_random_seed")]
    pub random_seed: i32,
}

fn default_reject_tag_collisions() -> bool {
    true
}

fn default_num_workers() -> u32 {
    1
}

fn default_random_seed() -> i32 {
    42
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reject_tag_collisions: default_reject_tag_collisions(),
            solver: SolverConfig::default(),
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            time_limit_secs: None,
            num_workers: default_num_workers(),
            random_seed: default_random_seed(),
        }
    }
}

impl SolverConfig {
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs.map(Duration::from_secs_f64)
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file and validate it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string and validate it.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(secs) = self.solver.time_limit_secs {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: "solver.time_limit_secs",
                    message: format!("must be a positive number of seconds, got {secs}"),
                });
            }
        }

        if self.solver.num_workers == 0 {
            return Err(ConfigError::InvalidValue {
                field: "solver.num_workers",
                message: "must be at least 1".to_string(),
            });
        }

        if self.solver.backend == Backend::CpSat && !cfg!(feature = "cp-sat") {
            return Err(ConfigError::BackendUnavailable("cp-sat".to_string()));
        }

        Ok(())
    }

    /// A commented example configuration.
    pub fn example() -> &'static str {
        r#"# Reject programs that use the same tag under more than one rule
reject_tag_collisions = true

[solver]
# "microlp" (built in) or "cp-sat" (needs the cp-sat feature)
backend = "microlp"
# Give up on a capacity phase after this many seconds (omit for no limit)
time_limit_secs = 30.0
# CP-SAT only
num_workers = 1
random_seed = 42
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EngineConfig::from_toml("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert!(config.reject_tag_collisions);
        assert_eq!(config.solver.backend, Backend::MicroLp);
        assert!(config.solver.time_limit().is_none());
    }

    #[test]
    fn test_example_config_parses() {
        let config = EngineConfig::from_toml(EngineConfig::example()).unwrap();
        assert_eq!(config.solver.time_limit(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_rejects_bad_time_limit() {
        let err = EngineConfig::from_toml("[solver]\ntime_limit_secs = -1.0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "solver.time_limit_secs",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_zero_workers() {
        let err = EngineConfig::from_toml("[solver]\nnum_workers = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[cfg(not(feature = "cp-sat"))]
    #[test]
    fn test_cp_sat_needs_feature() {
        let err = EngineConfig::from_toml("[solver]\nbackend = \"cp-sat\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::BackendUnavailable(_)));
    }
}
