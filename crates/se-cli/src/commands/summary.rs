//! Summary command for headline match numbers.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use se_core::TeamSummary;

use super::source::{self, SourceArgs};
use crate::Config;

#[derive(Debug, Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &SummaryArgs, config: &Config) -> Result<()> {
    let m = source::load(&args.source, config)?;
    let summary = m.summary();

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&summary)?)?;
        return Ok(());
    }

    writeln!(writer, "{} vs {}", summary.home_team, summary.away_team)?;
    writeln!(writer, "Events: {}", summary.events)?;
    writeln!(writer, "Possessions: {}", summary.possessions)?;
    for team in [&summary.home, &summary.away] {
        writeln!(writer)?;
        write_team(writer, team)?;
    }
    Ok(())
}

fn write_team<W: Write>(writer: &mut W, team: &TeamSummary) -> Result<()> {
    writeln!(writer, "{}", team.team)?;
    writeln!(writer, "  Possessions: {}", team.possessions)?;
    writeln!(writer, "  Events: {}", team.events)?;
    writeln!(writer, "  Shots: {}", team.shots)?;
    writeln!(writer, "  Goals: {}", team.goals)?;
    Ok(())
}
