//! X-CIRCLE-X ecosystem deployment core
//!
//! Issues the fungible asset, deploys the staking and vesting contracts and
//! distributes the π-derived total supply across the allocation categories.
//! Every network interaction goes through [`LedgerClient`] and every human
//! decision through [`Operator`], so the whole pipeline runs against fakes.
//!
//! - [`allocation`]: fixed-point supply arithmetic
//! - [`payload`]: `function@hex@hex` call encoding
//! - [`state`]: persisted progress with atomic saves
//! - [`pipeline`]: the six-step resumable state machine

pub mod allocation;
pub mod config;
pub mod errors;
pub mod ledger;
pub mod operator;
pub mod payload;
pub mod pipeline;
pub mod state;
pub mod transactions;
pub mod vesting;

pub use allocation::{format_amount, Allocation, AllocationPlan, Category, Percentage};
pub use config::DeployConfig;
pub use errors::{DeployError, DeployResult};
pub use ledger::{LedgerClient, Network, SubmitOutcome, Transaction};
pub use operator::{Operator, PendingEvent};
pub use payload::{Arg, Payload};
pub use pipeline::{next_pending_step, DeploymentPipeline, RunOutcome, Step, StepOutcome};
pub use state::{ContractRole, DeploymentState, StateStore};
pub use vesting::{schedule_entries, VestingCategory, VestingScheduleEntry};
