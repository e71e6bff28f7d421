//! Possessions command for walking the possession chain.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use se_core::{Match, PossessionNode};

use super::events::format_clock;
use super::source::{self, SourceArgs};
use crate::Config;

#[derive(Debug, Args)]
pub struct PossessionsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Only possessions of this team.
    #[arg(long)]
    pub team: Option<String>,
}

pub fn run<W: Write>(writer: &mut W, args: &PossessionsArgs, config: &Config) -> Result<()> {
    let m = source::load(&args.source, config)?;
    let nodes: Vec<&PossessionNode> = match args.team.as_deref() {
        Some(team) => m.possessions_for_team(team).collect(),
        None => m.iter_possessions().collect(),
    };

    if nodes.is_empty() {
        writeln!(writer, "No possessions.")?;
        return Ok(());
    }
    for node in nodes {
        writeln!(writer, "{}", format_possession(&m, node)?)?;
    }
    Ok(())
}

fn format_possession(m: &Match, node: &PossessionNode) -> Result<String> {
    let header = format!("Possession {} ({})", node.id(), node.team_in_possession());
    let events: Vec<_> = m.possession_events(node.id())?.collect();
    let (Some(first), Some(last)) = (events.first(), events.last()) else {
        return Ok(format!("{header}: no events"));
    };
    let labels: Vec<&str> = events.iter().map(|e| e.event_type().as_str()).collect();
    Ok(format!(
        "{header} {}-{}: {}",
        format_clock(first.match_time()),
        format_clock(last.match_time()),
        labels.join(" ")
    ))
}
