use anyhow::Result;
use clap::Parser;
use fiscal_cli::{Cli, RunConfig, Settings, commands, logging};
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let config = RunConfig::resolve(&cli, settings)?;

    logging::init(&config)?;
    debug!(?config, "configuration resolved");

    let registry = commands::load_registry(&config)?;
    let output = commands::run(&cli.command, &config, &registry)?;
    println!("{}", output.trim_end());
    Ok(())
}
