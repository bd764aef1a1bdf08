// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{PlanError, Result};

/// Largest number of decimal places accepted for any precision setting.
pub const MAX_PRECISION: u32 = 10;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = PlanError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.simulation, raw.slack, raw.edit))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_simulation(cfg)?;
    validate_slack(cfg)?;
    validate_edit(cfg)?;
    Ok(())
}

fn validate_simulation(cfg: &RawConfigFile) -> Result<()> {
    if cfg.simulation.loops == 0 {
        return Err(PlanError::ConfigError(
            "[simulation].loops must be >= 1 (got 0)".to_string(),
        ));
    }
    check_precision("[simulation].precision", cfg.simulation.precision)
}

fn validate_slack(cfg: &RawConfigFile) -> Result<()> {
    check_precision("[slack].precision", cfg.slack.precision)
}

fn validate_edit(cfg: &RawConfigFile) -> Result<()> {
    let duration = cfg.edit.default_task_duration;
    if !duration.is_finite() || duration < 0.0 {
        return Err(PlanError::ConfigError(format!(
            "[edit].default_task_duration must be a finite number >= 0 (got {duration})"
        )));
    }
    Ok(())
}

fn check_precision(key: &str, precision: u32) -> Result<()> {
    if precision > MAX_PRECISION {
        return Err(PlanError::ConfigError(format!(
            "{key} must be <= {MAX_PRECISION} (got {precision})"
        )));
    }
    Ok(())
}
