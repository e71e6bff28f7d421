//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::events::EventsArgs;
use crate::commands::possessions::PossessionsArgs;
use crate::commands::priors::PriorsArgs;
use crate::commands::sample::SampleArgs;
use crate::commands::summary::SummaryArgs;

/// Soccer match event explorer.
///
/// Loads a match from StatsBomb open data, a JSON-lines event feed, or a
/// synthetic demo, then queries its events and event-type priors.
#[derive(Debug, Parser)]
#[command(name = "se", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show teams, counts, shots and goals.
    Summary(SummaryArgs),

    /// List events in time order.
    Events(EventsArgs),

    /// List possessions with their events.
    Possessions(PossessionsArgs),

    /// Print event-type priors per game state as JSON.
    Priors(PriorsArgs),

    /// Draw event types from one state's prior.
    Sample(SampleArgs),
}
