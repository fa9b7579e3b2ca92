//! Entry point for the xcx-deploy binary

use deploy_cli::run_cli;

fn main() -> anyhow::Result<()> {
    run_cli()
}
