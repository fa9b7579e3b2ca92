//! Command-line arguments and dispatch

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use lib_deploy::Network;

use crate::commands;

/// X-CIRCLE-X ecosystem deployment
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(name = "xcx-deploy")]
pub struct DeployCli {
    /// Enable verbose output
    #[arg(short, long, global = true, env = "XCX_VERBOSE")]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, global = true, default_value = "text", env = "XCX_FORMAT")]
    pub format: String,

    /// Deployment configuration file (TOML)
    #[arg(short, long, global = true, env = "XCX_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: DeployCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum DeployCommand {
    /// Run the deployment, all steps or a single one
    Deploy(DeployArgs),

    /// Show the token distribution computed from the configuration
    Report,

    /// Print the mxpy commands the deployment would submit
    Plan(PlanArgs),

    /// Show what the state file has recorded so far
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct DeployArgs {
    /// Target network (devnet, testnet, mainnet)
    #[arg(short, long, default_value = "devnet", value_parser = parse_network)]
    pub network: Network,

    /// Wallet PEM file used to sign every transaction
    #[arg(long, alias = "pem")]
    pub credential: PathBuf,

    /// Deployment state file
    #[arg(long, default_value = "deployment_state.json")]
    pub state: PathBuf,

    /// Run only this step (1-6)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=6))]
    pub step: Option<u64>,

    /// Answer yes to every continuation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[arg(short, long, default_value = "devnet", value_parser = parse_network)]
    pub network: Network,

    /// Wallet PEM file to reference in the printed commands
    #[arg(long, alias = "pem", default_value = "wallet.pem")]
    pub credential: PathBuf,

    #[arg(long, default_value = "deployment_state.json")]
    pub state: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(short, long, default_value = "devnet", value_parser = parse_network)]
    pub network: Network,

    #[arg(long, default_value = "deployment_state.json")]
    pub state: PathBuf,
}

fn parse_network(value: &str) -> Result<Network, String> {
    Network::from_str(value).map_err(|e| e.to_string())
}

pub fn run_cli() -> Result<()> {
    let cli = DeployCli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }

    match &cli.command {
        DeployCommand::Deploy(args) => commands::deploy::handle_deploy_command(args.clone(), &cli)?,
        DeployCommand::Report => commands::report::handle_report_command(&cli)?,
        DeployCommand::Plan(args) => commands::plan::handle_plan_command(args.clone(), &cli)?,
        DeployCommand::Status(args) => commands::status::handle_status_command(args.clone(), &cli)?,
    }
    Ok(())
}
