//! Engine configuration.
//!
//! The host game configures the scripting engine at startup with a
//! [`ScriptConfig`]. Every safety ceiling and timing constant lives here, so
//! nothing in the driver or the scheduler hardcodes them.
//!
//! ```
//! use rust_mudscript::core::ScriptConfig;
//!
//! let config = ScriptConfig::default()
//!     .with_loop_limits(10, 50)
//!     .with_seed(7);
//! assert_eq!(config.loop_defer_after, 10);
//! assert_eq!(config.pulses_for_seconds(2), 20);
//!
//! let parsed = ScriptConfig::from_toml_str("max_script_depth = 4").unwrap();
//! assert_eq!(parsed.max_script_depth, 4);
//! assert_eq!(parsed.loop_abort_after, 100);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Scripting engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Maximum nesting of script runs (a script whose command fires another
    /// script, and so on).
    pub max_script_depth: u32,

    /// `while` iterations in one invocation before the run yields for a pulse.
    pub loop_defer_after: u32,

    /// `while` iterations in one run before the script is halted.
    pub loop_abort_after: u32,

    /// Game pulses per real second.
    pub pulses_per_second: u32,

    /// Real seconds per mud hour.
    pub seconds_per_mud_hour: u32,

    /// Pulses between random-trigger scans.
    pub random_check_interval: u32,

    /// Pulses to wait before retrying a mobile script paused by casting.
    pub cast_retry_pulses: u32,

    /// Seed for the engine RNG.
    pub rng_seed: u64,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            max_script_depth: 10,
            loop_defer_after: 30,
            loop_abort_after: 100,
            pulses_per_second: 10,
            seconds_per_mud_hour: 75,
            random_check_interval: 130,
            cast_retry_pulses: 10,
            rng_seed: 0,
        }
    }
}

impl ScriptConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Set the recursion ceiling.
    #[must_use]
    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_script_depth = depth;
        self
    }

    /// Set the loop defer and abort thresholds.
    #[must_use]
    pub fn with_loop_limits(mut self, defer_after: u32, abort_after: u32) -> Self {
        self.loop_defer_after = defer_after;
        self.loop_abort_after = abort_after;
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    /// Set the random-trigger scan interval in pulses.
    #[must_use]
    pub fn with_random_interval(mut self, pulses: u32) -> Self {
        self.random_check_interval = pulses;
        self
    }

    /// Pulses in `seconds` real seconds.
    #[must_use]
    pub fn pulses_for_seconds(&self, seconds: u64) -> u64 {
        seconds.saturating_mul(u64::from(self.pulses_per_second))
    }

    /// Pulses in one mud hour.
    #[must_use]
    pub fn pulses_per_mud_hour(&self) -> u64 {
        self.pulses_for_seconds(u64::from(self.seconds_per_mud_hour))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScriptConfig::default();
        assert_eq!(config.max_script_depth, 10);
        assert_eq!(config.loop_defer_after, 30);
        assert_eq!(config.loop_abort_after, 100);
        assert_eq!(config.pulses_per_mud_hour(), 750);
    }

    #[test]
    fn test_builder() {
        let config = ScriptConfig::default()
            .with_max_depth(3)
            .with_loop_limits(5, 12)
            .with_random_interval(1)
            .with_seed(99);

        assert_eq!(config.max_script_depth, 3);
        assert_eq!(config.loop_defer_after, 5);
        assert_eq!(config.loop_abort_after, 12);
        assert_eq!(config.random_check_interval, 1);
        assert_eq!(config.rng_seed, 99);
    }

    #[test]
    fn test_toml_partial() {
        let config = ScriptConfig::from_toml_str(
            "loop_defer_after = 8\npulses_per_second = 4\n",
        )
        .unwrap();
        assert_eq!(config.loop_defer_after, 8);
        assert_eq!(config.pulses_for_seconds(3), 12);
        assert_eq!(config.max_script_depth, 10);
    }

    #[test]
    fn test_toml_bad_type() {
        let err = ScriptConfig::from_toml_str("max_script_depth = \"deep\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ScriptConfig::load("/nonexistent/scripts.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/scripts.toml"));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = ScriptConfig::default().with_seed(5);
        let json = serde_json::to_string(&config).unwrap();
        let back: ScriptConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
