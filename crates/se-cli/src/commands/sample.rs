//! Sample command for drawing event types from a state's prior.

use std::io::Write;

use anyhow::{Result, bail};
use clap::Args;

use super::priors::{self, StateKey};
use super::source::{self, SourceArgs};
use crate::Config;

#[derive(Debug, Args)]
pub struct SampleArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// State partition.
    #[arg(long, value_enum, default_value_t = StateKey::Team)]
    pub by: StateKey,

    /// State to sample from, as printed by `se priors`.
    #[arg(long)]
    pub state: String,

    /// Number of draws.
    #[arg(long, default_value_t = 10)]
    pub count: usize,

    /// Dirichlet smoothing; overrides the configured alpha.
    #[arg(long)]
    pub alpha: Option<f64>,
}

pub fn run<W: Write>(writer: &mut W, args: &SampleArgs, config: &Config) -> Result<()> {
    let m = source::load(&args.source, config)?;
    let priors = priors::build(&m, args.by, args.alpha.unwrap_or(config.alpha))?;
    let Some(prior) = priors.get(&args.state) else {
        let mut known: Vec<&str> = priors.keys().map(String::as_str).collect();
        known.sort_unstable();
        bail!(
            "no events observed for state '{}' (known: {})",
            args.state,
            known.join(", ")
        );
    };

    let mut rng = source::rng(args.source.seed(config));
    for _ in 0..args.count {
        writeln!(writer, "{}", prior.sample(&mut rng))?;
    }
    Ok(())
}
