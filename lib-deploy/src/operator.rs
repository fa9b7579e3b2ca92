//! Human-in-the-loop port
//!
//! Identifiers assigned by the network (issued asset, contract addresses)
//! are not parsed from transaction results. The pipeline asks an
//! [`Operator`] to resolve them, and asks it whether to continue between
//! steps. Tests inject canned answers; the CLI reads stdin.

use crate::errors::DeployResult;
use crate::pipeline::Step;
use crate::state::ContractRole;

/// A value the network assigned that the pipeline cannot discover itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingEvent {
    AssetIssued { ticker: String, explorer: String },
    ContractDeployed { role: ContractRole, explorer: String },
}

impl PendingEvent {
    pub fn prompt(&self) -> String {
        match self {
            PendingEvent::AssetIssued { ticker, .. } => {
                format!("Enter the token identifier (looks like {}-abc123)", ticker)
            }
            PendingEvent::ContractDeployed { role, .. } => {
                format!("Enter the {} contract address", role)
            }
        }
    }

    pub fn explorer(&self) -> &str {
        match self {
            PendingEvent::AssetIssued { explorer, .. } => explorer,
            PendingEvent::ContractDeployed { explorer, .. } => explorer,
        }
    }
}

pub trait Operator {
    /// `Ok(None)` means the operator gave no value and the step should stop
    fn resolve(&self, event: &PendingEvent) -> DeployResult<Option<String>>;

    /// Yes/no question; `false` halts without side effects
    fn confirm(&self, question: &str) -> DeployResult<bool>;

    /// A step is about to run
    fn step_started(&self, _step: Step) {}

    /// Progress line for whoever is watching. Display only, so it cannot fail.
    fn notify(&self, _message: &str) {}
}

impl<T: Operator + ?Sized> Operator for &T {
    fn resolve(&self, event: &PendingEvent) -> DeployResult<Option<String>> {
        (**self).resolve(event)
    }

    fn confirm(&self, question: &str) -> DeployResult<bool> {
        (**self).confirm(question)
    }

    fn step_started(&self, step: Step) {
        (**self).step_started(step)
    }

    fn notify(&self, message: &str) {
        (**self).notify(message)
    }
}
