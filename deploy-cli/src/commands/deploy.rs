//! Deploy command
//!
//! Architecture: Functional Core, Imperative Shell (FCIS)
//!
//! - **Pure Logic**: Outcome messages
//! - **Imperative Shell**: State file, mxpy processes, stdin prompts
//! - **Testability**: Pipeline and Output injection

use lib_deploy::pipeline::{RunOutcome, Step, StepOutcome};
use lib_deploy::{DeployError, DeploymentPipeline, LedgerClient, Operator, StateStore};

use crate::argument_parsing::{DeployArgs, DeployCli};
use crate::cli_config::load_config;
use crate::error::{CliError, CliResult};
use crate::logic::format::status_lines;
use crate::mxpy::MxpyClient;
use crate::output::{ConsoleOutput, Output};
use crate::prompt::ConsoleOperator;

// ============================================================================
// PURE LOGIC
// ============================================================================

pub fn step_outcome_message(step: Step, outcome: StepOutcome) -> String {
    match outcome {
        StepOutcome::Completed => format!("{} completed", step),
        StepOutcome::AlreadyDone => format!("{} already done, nothing submitted", step),
        StepOutcome::Aborted => format!(
            "{} stopped without a value. Re-run with --step {} once you have it",
            step,
            step.index()
        ),
    }
}

pub fn run_outcome_message(outcome: RunOutcome) -> String {
    match outcome {
        RunOutcome::Finished => "Deployment complete".to_string(),
        RunOutcome::Declined => "Deployment cancelled, nothing was submitted".to_string(),
        RunOutcome::Paused { after } => match after.next() {
            Some(next) => format!("Paused after {}. Resume with --step {}", after, next.index()),
            None => format!("Paused after {}", after),
        },
        RunOutcome::Aborted { at } => format!(
            "{} stopped without a value. Re-run with --step {} once you have it",
            at,
            at.index()
        ),
    }
}

// ============================================================================
// IMPERATIVE SHELL
// ============================================================================

pub fn handle_deploy_command(args: DeployArgs, cli: &DeployCli) -> CliResult<()> {
    let output = ConsoleOutput;
    let config = load_config(cli.config.as_deref())?;

    if !args.credential.exists() {
        return Err(CliError::CredentialNotFound {
            path: args.credential.display().to_string(),
        });
    }

    let endpoints = args.network.config();
    output.header(&format!("X-CIRCLE-X DEPLOYMENT ({})", args.network))?;
    output.field("Proxy", endpoints.proxy)?;
    output.field("Chain", endpoints.chain_id)?;
    output.field("Credential", &args.credential.display().to_string())?;
    output.field("State file", &args.state.display().to_string())?;

    let store = StateStore::new(&args.state);
    let state = store.load(args.network, &args.credential)?;
    let ledger = MxpyClient::new(args.network, &args.credential);
    let operator = ConsoleOperator::stdin(&output, args.yes);
    let pipeline = DeploymentPipeline::new(config, state, store, ledger, operator)?;

    let step = args
        .step
        .map(|n| Step::from_index(n as usize))
        .transpose()?;
    handle_deploy_command_with_output(pipeline, step, &output)
}

/// Run one step or the whole sequence and report the result
pub fn handle_deploy_command_with_output<L: LedgerClient, O: Operator>(
    mut pipeline: DeploymentPipeline<L, O>,
    step: Option<Step>,
    output: &dyn Output,
) -> CliResult<()> {
    let plan = pipeline.plan();
    output.print(&format!(
        "Total supply: {} {}",
        plan.display(plan.total_supply_raw()),
        pipeline.config().token.ticker
    ))?;

    let result = match step {
        Some(step) => pipeline.run_step(step).map(|outcome| match outcome {
            StepOutcome::Aborted => output.warning(&step_outcome_message(step, outcome)),
            _ => output.success(&step_outcome_message(step, outcome)),
        }),
        None => pipeline.run_all().map(|outcome| match outcome {
            RunOutcome::Finished => output.success(&run_outcome_message(outcome)),
            RunOutcome::Aborted { .. } => output.warning(&run_outcome_message(outcome)),
            _ => output.info(&run_outcome_message(outcome)),
        }),
    };

    match result {
        Ok(printed) => printed?,
        Err(err) => {
            report_failure(&err, output)?;
            return Err(err.into());
        }
    }

    output.header("DEPLOYMENT STATE")?;
    for line in status_lines(pipeline.state(), pipeline.next_pending_step()) {
        output.print(&line)?;
    }
    Ok(())
}

fn report_failure(err: &DeployError, output: &dyn Output) -> CliResult<()> {
    output.error(&err.to_string())?;
    if err.is_persistence() {
        output.error(
            "The ledger may already hold this step's result but the state file was not updated. \
             Record the value in the state file by hand before re-running.",
        )?;
    }
    if let DeployError::StepFailed { index, .. } = err {
        output.info(&format!(
            "Step {} failed. Fix the issue and re-run with --step {}",
            index, index
        ))?;
    }
    Ok(())
}
