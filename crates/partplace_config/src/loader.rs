//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{PlannerConfig, SolverTuning};
use std::path::Path;

/// File name searched for in a working directory.
pub const CONFIG_FILE_NAME: &str = "partplace.toml";

/// Loads `<dir>/partplace.toml`, falling back to defaults when it does not exist.
pub fn load_config(dir: &Path) -> Result<PlannerConfig, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if !config_path.is_file() {
        return Ok(PlannerConfig::default());
    }
    load_config_file(&config_path)
}

/// Loads and validates a configuration from an explicit path.
///
/// Unlike [`load_config`], a missing file is an error.
pub fn load_config_file(path: &Path) -> Result<PlannerConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<PlannerConfig, ConfigError> {
    let config: PlannerConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Rejects tuning values that would stall or break the search.
///
/// Loading validates automatically; call this again after overriding fields.
pub fn validate_config(config: &PlannerConfig) -> Result<(), ConfigError> {
    validate_tuning(&config.solver)?;
    if config.centers.iterations == 0 {
        return Err(ConfigError::ValidationError(
            "centers.iterations must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_tuning(t: &SolverTuning) -> Result<(), ConfigError> {
    if t.max_concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "solver.max_concurrency must be at least 1".to_string(),
        ));
    }
    if t.min_region_thickness == 0 {
        return Err(ConfigError::ValidationError(
            "solver.min_region_thickness must be at least 1".to_string(),
        ));
    }
    let decay = t.disruption_decay_ratio;
    if !decay.is_finite() || decay <= 0.0 || decay > 1.0 {
        return Err(ConfigError::ValidationError(format!(
            "solver.disruption_decay_ratio must be in (0, 1], got {decay}"
        )));
    }
    if !(0.0..=1.0).contains(&t.pr_dominance) {
        return Err(ConfigError::ValidationError(format!(
            "solver.pr_dominance must be in [0, 1], got {}",
            t.pr_dominance
        )));
    }
    for (name, ratio) in [
        ("bram_ratio_threshold", t.bram_ratio_threshold),
        ("dsp_ratio_threshold", t.dsp_ratio_threshold),
    ] {
        if !ratio.is_finite() || ratio < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "solver.{name} must be a non-negative number, got {ratio}"
            )));
        }
    }
    Ok(())
}
