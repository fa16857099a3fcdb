use anyhow::Result;
use clap::Parser;

use baton::cli::{commands, Cli};
use baton::config::BatonConfig;
use baton::telemetry::init_telemetry;

fn main() -> Result<()> {
    let cli = Cli::parse();

    BatonConfig::load_env_file()?;
    let mut config = BatonConfig::load_with(cli.config.as_deref())?;
    if cli.json_logs {
        config.observability.json_logs = true;
    }

    init_telemetry(&config.observability)?;

    tokio::runtime::Runtime::new()?.block_on(commands::execute(cli.command, &config))
}
