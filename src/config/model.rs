// src/config/model.rs

use serde::Deserialize;

use crate::ops::DEFAULT_TASK_DURATION;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [simulation]
/// loops = 100
/// seed = 42
/// precision = 2
///
/// [slack]
/// precision = 0
///
/// [edit]
/// default_task_duration = 14
/// history_limit = 0
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub slack: SlackConfig,

    #[serde(default)]
    pub edit: EditConfig,
}

/// `[simulation]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Number of sampling rounds per run.
    #[serde(default = "default_loops")]
    pub loops: usize,

    /// Fixed RNG seed for reproducible runs. Unset means seeded from entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Decimal places sampled durations are rounded to.
    #[serde(default = "default_simulation_precision")]
    pub precision: u32,
}

fn default_loops() -> usize {
    100
}

fn default_simulation_precision() -> u32 {
    2
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            loops: default_loops(),
            seed: None,
            precision: default_simulation_precision(),
        }
    }
}

/// `[slack]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlackConfig {
    /// Decimal places slack values are rounded to.
    #[serde(default)]
    pub precision: u32,
}

/// `[edit]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct EditConfig {
    /// Duration, in days, of newly inserted tasks.
    #[serde(default = "default_task_duration")]
    pub default_task_duration: f64,

    /// Number of undo steps kept; 0 keeps everything.
    #[serde(default)]
    pub history_limit: usize,
}

fn default_task_duration() -> f64 {
    DEFAULT_TASK_DURATION
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            default_task_duration: default_task_duration(),
            history_limit: 0,
        }
    }
}

/// Validated configuration. Obtain one through `TryFrom<RawConfigFile>` or
/// the loader; `Default` yields the built-in values.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub simulation: SimulationConfig,
    pub slack: SlackConfig,
    pub edit: EditConfig,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        simulation: SimulationConfig,
        slack: SlackConfig,
        edit: EditConfig,
    ) -> Self {
        Self {
            simulation,
            slack,
            edit,
        }
    }
}
