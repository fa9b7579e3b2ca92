//! Report command: the distribution table, without touching the ledger

use std::str::FromStr;

use lib_deploy::DeployConfig;

use crate::argument_parsing::DeployCli;
use crate::cli_config::load_config;
use crate::error::CliResult;
use crate::logic::format::{report_json, report_lines, OutputFormat};
use crate::output::{ConsoleOutput, Output};

pub fn handle_report_command(cli: &DeployCli) -> CliResult<()> {
    let output = ConsoleOutput;
    let format = OutputFormat::from_str(&cli.format)?;
    let config = load_config(cli.config.as_deref())?;
    handle_report_command_with_output(&config, format, &output)
}

pub fn handle_report_command_with_output(
    config: &DeployConfig,
    format: OutputFormat,
    output: &dyn Output,
) -> CliResult<()> {
    let plan = config.plan()?;
    match format {
        OutputFormat::Json => output.print_json(&report_json(config, &plan)),
        OutputFormat::Text => {
            output.header(&format!("{} TOKEN DISTRIBUTION", config.token.name))?;
            for line in report_lines(config, &plan) {
                output.print(&line)?;
            }
            Ok(())
        }
    }
}
