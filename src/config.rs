//! Match configuration.
//!
//! Everything a match organiser may tune without changing the rules lives
//! here. Configurations are plain JSON; missing fields take their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::world::constants::{INSTRUCTION_LIMIT, SETUP_ROUNDS};

/// Well conversion and upgrade thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WellRules {
    /// Opposing base resource deposited before a well turns into an elixir well.
    pub elixir_threshold: i32,
    /// Deposits of the well's own kind before it reaches the upgraded tier.
    pub upgrade_threshold: i32,
    /// Whether conversion to elixir clears the well's inventory.
    pub zero_inventory_on_conversion: bool,
    /// Units collected per action before upgrade.
    pub base_rate: i32,
    /// Units collected per action after upgrade.
    pub upgraded_rate: i32,
}

impl Default for WellRules {
    fn default() -> Self {
        Self {
            elixir_threshold: 600,
            upgrade_threshold: 1200,
            zero_inventory_on_conversion: false,
            base_rate: 2,
            upgraded_rate: 4,
        }
    }
}

/// Per-match configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Overrides the map's seed.
    pub seed: Option<u64>,
    /// Overrides the map's round limit.
    pub max_rounds: Option<u32>,
    /// Length of the setup phase.
    pub setup_rounds: u32,
    /// Keep indicator strings, dots and lines in the match log.
    pub record_indicators: bool,
    /// Per-robot per-turn instruction budget for in-process strategies.
    pub instruction_budget: u32,
    /// Run the invariant checker after every round.
    pub check_invariants: bool,
    /// Well thresholds.
    pub wells: WellRules,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_rounds: None,
            setup_rounds: SETUP_ROUNDS,
            record_indicators: false,
            instruction_budget: INSTRUCTION_LIMIT,
            check_invariants: false,
            wells: WellRules::default(),
        }
    }
}

impl MatchConfig {
    /// Parse a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON or fails validation.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check that the values are consistent with each other.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_rounds == Some(0) {
            return Err(ConfigError::Invalid("max_rounds must be positive".into()));
        }
        if let Some(limit) = self.max_rounds {
            if self.setup_rounds >= limit {
                return Err(ConfigError::Invalid(format!(
                    "setup_rounds {} must be below max_rounds {limit}",
                    self.setup_rounds
                )));
            }
        }
        if self.instruction_budget == 0 {
            return Err(ConfigError::Invalid("instruction_budget must be positive".into()));
        }
        let wells = &self.wells;
        if wells.base_rate <= 0 || wells.upgraded_rate < wells.base_rate {
            return Err(ConfigError::Invalid(
                "well rates must be positive and non-decreasing".into(),
            ));
        }
        if wells.elixir_threshold <= 0 || wells.upgrade_threshold <= 0 {
            return Err(ConfigError::Invalid("well thresholds must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(MatchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = MatchConfig::from_json_str(r#"{"seed": 9, "wells": {"base_rate": 3, "upgraded_rate": 5}}"#).unwrap();
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.setup_rounds, SETUP_ROUNDS);
        assert_eq!(config.wells.base_rate, 3);
        assert_eq!(config.wells.elixir_threshold, WellRules::default().elixir_threshold);
    }

    #[test]
    fn test_overrides_leave_base_config_intact() {
        let base = MatchConfig::default();
        let seeded = MatchConfig {
            seed: Some(3),
            ..base
        };
        assert_eq!(base.seed, None);
        assert_eq!(seeded.setup_rounds, base.setup_rounds);
    }

    #[test]
    fn test_setup_must_fit_round_limit() {
        let err = MatchConfig::from_json_str(r#"{"max_rounds": 100}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        let err = MatchConfig::from_json_str("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"record_indicators": true}"#).unwrap();
        let config = MatchConfig::load(&path).unwrap();
        assert!(config.record_indicators);
    }
}
