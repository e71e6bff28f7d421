use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use se_cli::commands::{events, possessions, priors, sample, summary};
use se_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut stdout = io::stdout().lock();
    match command {
        Commands::Summary(args) => summary::run(&mut stdout, args, &config)?,
        Commands::Events(args) => events::run(&mut stdout, args, &config)?,
        Commands::Possessions(args) => possessions::run(&mut stdout, args, &config)?,
        Commands::Priors(args) => priors::run(&mut stdout, args, &config)?,
        Commands::Sample(args) => sample::run(&mut stdout, args, &config)?,
    }

    Ok(())
}
