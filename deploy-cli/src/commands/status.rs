//! Status command: what the state file says, and which step comes next

use std::path::PathBuf;
use std::str::FromStr;

use lib_deploy::pipeline::next_pending_step;
use lib_deploy::{schedule_entries, DeployConfig, DeploymentState, StateStore};

use crate::argument_parsing::{DeployCli, StatusArgs};
use crate::cli_config::load_config;
use crate::error::CliResult;
use crate::logic::format::{status_json, status_lines, OutputFormat};
use crate::output::{ConsoleOutput, Output};

pub fn handle_status_command(args: StatusArgs, cli: &DeployCli) -> CliResult<()> {
    let output = ConsoleOutput;
    let format = OutputFormat::from_str(&cli.format)?;
    let config = load_config(cli.config.as_deref())?;
    // the credential is not persisted and not needed to read progress
    let state = StateStore::new(&args.state).load(args.network, PathBuf::new())?;
    handle_status_command_with_output(&config, &state, format, &output)
}

pub fn handle_status_command_with_output(
    config: &DeployConfig,
    state: &DeploymentState,
    format: OutputFormat,
    output: &dyn Output,
) -> CliResult<()> {
    let plan = config.plan()?;
    let schedules = schedule_entries(&config.vesting, &plan)?;
    let next = next_pending_step(state, &schedules);

    match format {
        OutputFormat::Json => output.print_json(&status_json(state, next)),
        OutputFormat::Text => {
            output.header("DEPLOYMENT STATUS")?;
            for line in status_lines(state, next) {
                output.print(&line)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::testing::MockOutput;
    use lib_deploy::config::BeneficiaryShare;
    use lib_deploy::{ContractRole, Network, Percentage};

    #[test]
    fn test_pending_schedules_keep_step_six_open() {
        let mut config = DeployConfig::default();
        config.vesting.team = vec![BeneficiaryShare {
            address: "erd1alice".to_string(),
            percentage: Percentage::whole(100).unwrap(),
            name: "Alice".to_string(),
        }];
        let mut state = DeploymentState::new(Network::Devnet, "");
        state.record_token("TOK-1".to_string());
        state.record_contract(ContractRole::Staking, "erd1s".to_string());
        state.record_contract(ContractRole::Vesting, "erd1v".to_string());
        state.record_funding(ContractRole::Staking, "1".to_string());
        state.record_funding(ContractRole::Vesting, "2".to_string());

        let output = MockOutput::new();
        handle_status_command_with_output(&config, &state, OutputFormat::Text, &output).unwrap();
        output.assert_contains_message("Next step: Step 6 (Create Vesting Schedules)");
    }

    #[test]
    fn test_fresh_state_json() {
        let output = MockOutput::new();
        let state = DeploymentState::new(Network::Mainnet, "");
        handle_status_command_with_output(&DeployConfig::default(), &state, OutputFormat::Json, &output)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output.get_messages()[0]).unwrap();
        assert_eq!(value["network"], "mainnet");
        assert_eq!(value["next_step"], 1);
    }
}
