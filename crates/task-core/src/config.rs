//! Configuration System
//!
//! Loads scheduler tuning from a TOML file. Every section is optional and falls
//! back to its defaults, so a config file only needs the values it changes.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Default tuning file path
pub const DEFAULT_CONFIG_PATH: &str = "scheduler.toml";

/// Complete scheduler configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub preemption: PreemptionConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub effort: EffortConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

impl SchedulerConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serializes the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Task selection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Upper bound on selections in one tick when tasks finish immediately
    pub max_selections_per_tick: u32,
    /// Start queued pending requests ahead of normal scoring when idle
    pub consume_pending_when_idle: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_selections_per_tick: 3,
            consume_pending_when_idle: true,
        }
    }
}

/// Preemption settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreemptionConfig {
    /// A running task whose description contains any of these is never replaced
    pub uninterruptible: Vec<String>,
}

impl Default for PreemptionConfig {
    fn default() -> Self {
        Self {
            uninterruptible: ["Sleeping", "EVA", "Airlock", "Digging"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl PreemptionConfig {
    /// Returns true if `label` names an uninterruptible activity. Matching
    /// ignores case, so "Entering airlock" counts as "Airlock".
    pub fn is_uninterruptible(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.uninterruptible
            .iter()
            .any(|marker| label.contains(&marker.to_lowercase()))
    }
}

/// Score modifier settings shared by all task policies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Multiplier applied when the worker's job is not one the policy prefers
    pub non_preferred_job_penalty: f64,
    /// Multiplier applied when the policy matches a favorite activity
    pub favorite_bonus: f64,
    /// Multiplier for outdoor work during a lesser radiation event
    pub lesser_radiation_modifier: f64,
    /// Occupancy ratio below which a building counts as uncrowded
    pub crowding_comfort_ratio: f64,
    /// EVA is refused above this fatigue
    pub eva_max_fatigue: f64,
    /// EVA is refused above this stress
    pub eva_max_stress: f64,
    /// EVA is refused above this hunger (worker should be eating instead)
    pub eva_max_hunger: f64,
    /// EVA is refused below this performance rating
    pub eva_min_performance: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            non_preferred_job_penalty: 0.25,
            favorite_bonus: 1.5,
            lesser_radiation_modifier: 0.1,
            crowding_comfort_ratio: 0.7,
            eva_max_fatigue: 1000.0,
            eva_max_stress: 60.0,
            eva_max_hunger: 500.0,
            eva_min_performance: 0.5,
        }
    }
}

/// Effort cost model for effort-driven tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffortConfig {
    /// Extra cost factor while the worker is outside
    pub unsheltered_multiplier: f64,
    /// Fatigue added per millisol of effort
    pub fatigue_per_millisol: f64,
    /// Energy (kJ) spent per millisol of effort
    pub energy_per_millisol: f64,
}

impl Default for EffortConfig {
    fn default() -> Self {
        Self {
            unsheltered_multiplier: 1.5,
            fatigue_per_millisol: 0.3,
            energy_per_millisol: 1.2,
        }
    }
}

/// Activity history settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Entries kept per worker (about three sols of activity)
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { capacity: 150 }
    }
}

/// Cache diagnostics settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Write every cache rebuild to `path`
    pub enabled: bool,
    pub path: String,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: "output/task_cache.jsonl".to_string(),
        }
    }
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Task Scheduler Configuration

[selection]
max_selections_per_tick = 3
consume_pending_when_idle = true

[preemption]
uninterruptible = ["Sleeping", "EVA", "Airlock", "Digging"]

[scoring]
non_preferred_job_penalty = 0.25
favorite_bonus = 1.5
lesser_radiation_modifier = 0.1
crowding_comfort_ratio = 0.7
eva_max_fatigue = 1000.0
eva_max_stress = 60.0
eva_max_hunger = 500.0
eva_min_performance = 0.5

[effort]
unsheltered_multiplier = 1.5
fatigue_per_millisol = 0.3
energy_per_millisol = 1.2

[history]
capacity = 150

[diagnostics]
enabled = false
path = "output/task_cache.jsonl"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_toml_matches_defaults() {
        let parsed = SchedulerConfig::from_str(&default_config_toml()).unwrap();
        assert_eq!(parsed, SchedulerConfig::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = SchedulerConfig::from_str(
            r#"
[scoring]
non_preferred_job_penalty = 0.5

[history]
capacity = 10
"#,
        )
        .unwrap();

        assert_eq!(config.scoring.non_preferred_job_penalty, 0.5);
        assert_eq!(config.scoring.favorite_bonus, 1.5);
        assert_eq!(config.history.capacity, 10);
        assert_eq!(config.selection, SelectionConfig::default());
    }

    #[test]
    fn test_empty_config() {
        let config = SchedulerConfig::from_str("").unwrap();
        assert_eq!(config, SchedulerConfig::default());
    }

    #[test]
    fn test_invalid_config() {
        let result = SchedulerConfig::from_str("[history]\ncapacity = \"lots\"");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let mut config = SchedulerConfig::default();
        config.diagnostics.enabled = true;
        let text = config.to_toml().unwrap();
        assert_eq!(SchedulerConfig::from_str(&text).unwrap(), config);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[effort]\nunsheltered_multiplier = 2.0").unwrap();
        let config = SchedulerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.effort.unsheltered_multiplier, 2.0);
    }

    #[test]
    fn test_uninterruptible_matching() {
        let preemption = PreemptionConfig::default();
        assert!(preemption.is_uninterruptible("Sleeping"));
        assert!(preemption.is_uninterruptible("Exploring outside (EVA)"));
        assert!(preemption.is_uninterruptible("Entering airlock"));
        assert!(!preemption.is_uninterruptible("Reading"));
        assert!(!preemption.is_uninterruptible("Walking to lab"));
    }
}
