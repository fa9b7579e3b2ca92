//! Structured error types for the deployment CLI

use lib_deploy::DeployError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Deploy(#[from] DeployError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Credential file not found: {path}")]
    CredentialNotFound { path: String },

    #[error("Unsupported output format: {0} (expected text or json)")]
    UnsupportedFormat(String),

    /// Writing to the operator's terminal failed
    #[error("Terminal I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl CliError {
    /// Step index the operator should re-run, when the failure came from one
    pub fn failed_step(&self) -> Option<usize> {
        match self {
            CliError::Deploy(DeployError::StepFailed { index, .. }) => Some(*index),
            _ => None,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
