//! Deployment Errors

use std::path::PathBuf;
use thiserror::Error;

/// Error raised while planning or executing the deployment
#[derive(Error, Debug)]
pub enum DeployError {
    /// A step ran before the state it depends on exists
    #[error("Precondition not met: {0}")]
    Precondition(String),

    /// The ledger client reported a failed submission (network, exit code, timeout)
    #[error("{action} failed: {output}")]
    ExternalCall { action: String, output: String },

    #[error("Contract artifact not found: {} (build the contract first)", path.display())]
    MissingArtifact { path: PathBuf },

    /// The on-chain action may have happened but could not be recorded locally
    #[error("Failed to persist deployment state to {}: {reason}", path.display())]
    Persistence { path: PathBuf, reason: String },

    #[error("State file {} is unreadable: {reason}", path.display())]
    StateCorrupt { path: PathBuf, reason: String },

    #[error("State file records network '{recorded}', refusing to continue on '{requested}'")]
    NetworkMismatch { recorded: String, requested: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid percentage {value}: must be between 0 and 100")]
    InvalidPercentage { value: String },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid step {0}: expected 1-6")]
    InvalidStep(usize),

    #[error("Step {index} ({name}) failed: {source}")]
    StepFailed {
        index: usize,
        name: &'static str,
        #[source]
        source: Box<DeployError>,
    },
}

impl DeployError {
    /// True when the error means local state may lag behind the ledger
    pub fn is_persistence(&self) -> bool {
        match self {
            DeployError::Persistence { .. } => true,
            DeployError::StepFailed { source, .. } => source.is_persistence(),
            _ => false,
        }
    }
}

/// Result type for deployment operations
pub type DeployResult<T> = Result<T, DeployError>;
