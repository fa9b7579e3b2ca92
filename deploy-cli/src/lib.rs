//! X-CIRCLE-X Deployment CLI
//!
//! Drives the `lib-deploy` pipeline from the terminal.
//!
//! ## Architecture
//!
//! **Functional Core, Imperative Shell** (FCIS):
//!
//! - **Functional Core** (`logic/`): argv construction and report rendering
//! - **Imperative Shell** (`commands/`): state files, child processes, prompts
//! - **Adapters**: `mxpy` implements the ledger client, `prompt` the operator
//! - **Output Abstraction** (`output`): testable printing interface

pub mod argument_parsing;
pub mod cli_config;
pub mod commands;
pub mod error;
pub mod logic;
pub mod mxpy;
pub mod output;
pub mod prompt;

pub use argument_parsing::{run_cli, DeployCli, DeployCommand};
pub use error::{CliError, CliResult};
pub use output::Output;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
