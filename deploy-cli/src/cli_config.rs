//! Deployment configuration loader

use crate::error::{CliError, CliResult};
use lib_deploy::DeployConfig;
use std::fs;
use std::path::PathBuf;

/// Default config filename under ~/.xcx/
pub const DEFAULT_CONFIG_FILENAME: &str = "deploy.toml";

pub fn default_config_path() -> PathBuf {
    if let Some(home) = dirs::home_dir() {
        home.join(".xcx").join(DEFAULT_CONFIG_FILENAME)
    } else {
        PathBuf::from("./xcx-deploy.toml")
    }
}

/// Load the config from `path`, or from the default location.
///
/// A missing default file means built-in defaults; a missing explicit file
/// is an error. The result is validated before it is returned.
pub fn load_config(path: Option<&str>) -> CliResult<DeployConfig> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(default_config_path);

    if !config_path.exists() {
        if path.is_some() {
            return Err(CliError::ConfigError(format!(
                "Configuration file not found: {}",
                config_path.display()
            )));
        }
        tracing::debug!("No config at {}, using built-in defaults", config_path.display());
        return Ok(DeployConfig::default());
    }

    let raw = fs::read_to_string(&config_path)
        .map_err(|e| CliError::ConfigError(format!("Failed to read config: {}", e)))?;
    let config = parse_config(&raw)?;
    tracing::debug!("Loaded config from {}", config_path.display());
    Ok(config)
}

pub fn parse_config(raw: &str) -> CliResult<DeployConfig> {
    let config: DeployConfig =
        toml::from_str(raw).map_err(|e| CliError::ConfigError(format!("Invalid deploy config: {}", e)))?;
    config.validate()?;
    Ok(config)
}
