//! Plan command
//!
//! Prints the exact mxpy invocations the deployment would run, for the
//! steps the state file allows so far. Nothing is submitted.

use std::str::FromStr;

use lib_deploy::transactions::{
    deploy_transaction, funding_amount, funding_transaction, issue_transaction,
};
use lib_deploy::{ContractRole, DeployConfig, DeploymentState, StateStore, Transaction};
use serde_json::json;

use crate::argument_parsing::{DeployCli, PlanArgs};
use crate::cli_config::load_config;
use crate::error::CliResult;
use crate::logic::format::OutputFormat;
use crate::logic::mxpy::{render_command, transaction_args, MXPY_BINARY};
use crate::output::{ConsoleOutput, Output};

/// Titled transactions available given what `state` has recorded
pub fn planned_transactions(
    config: &DeployConfig,
    state: &DeploymentState,
) -> CliResult<Vec<(String, Transaction)>> {
    let plan = config.plan()?;
    let mut planned = Vec::new();

    let issue_title = match state.token_identifier() {
        Some(token) => format!("Issue token (already issued as {})", token),
        None => "Issue token".to_string(),
    };
    planned.push((issue_title, issue_transaction(config, &plan)?));

    if let Some(token) = state.token_identifier() {
        for role in [ContractRole::Staking, ContractRole::Vesting] {
            match state.contract(role) {
                None => planned.push((
                    format!("Deploy {} contract", role),
                    deploy_transaction(config, role, token),
                )),
                Some(contract) if state.receipts().funded(role).is_none() => {
                    let amount = funding_amount(&plan, role)?;
                    planned.push((
                        format!("Distribute {} raw to {} contract", amount, role),
                        funding_transaction(config, contract, token, &amount)?,
                    ));
                }
                Some(_) => {}
            }
        }
    }
    Ok(planned)
}

pub fn handle_plan_command(args: PlanArgs, cli: &DeployCli) -> CliResult<()> {
    let output = ConsoleOutput;
    let format = OutputFormat::from_str(&cli.format)?;
    let config = load_config(cli.config.as_deref())?;
    let state = StateStore::new(&args.state).load(args.network, &args.credential)?;
    handle_plan_command_with_output(&config, &state, format, &output)
}

pub fn handle_plan_command_with_output(
    config: &DeployConfig,
    state: &DeploymentState,
    format: OutputFormat,
    output: &dyn Output,
) -> CliResult<()> {
    let planned = planned_transactions(config, state)?;

    if format == OutputFormat::Json {
        let commands: Vec<serde_json::Value> = planned
            .iter()
            .map(|(title, tx)| {
                let mut argv = vec![MXPY_BINARY.to_string()];
                argv.extend(transaction_args(tx, &state.credential, state.network));
                json!({ "action": title, "argv": argv })
            })
            .collect();
        return output.print_json(&json!({ "network": state.network, "commands": commands }));
    }

    output.header(&format!("DEPLOYMENT COMMANDS ({})", state.network))?;
    for (title, tx) in &planned {
        output.print(&format!("\n# {}", title))?;
        output.print(&render_command(&transaction_args(
            tx,
            &state.credential,
            state.network,
        )))?;
    }
    if state.contract(ContractRole::Vesting).is_some() {
        output.info("Vesting schedules need decoded beneficiary addresses; run `deploy --step 6`")?;
    }
    Ok(())
}
