//! Events command for listing and filtering match events.

use std::io::Write;

use anyhow::{Result, bail};
use clap::Args;

use se_core::{Event, EventType, PossessionId};

use super::source::{self, SourceArgs};
use crate::Config;

#[derive(Debug, Args)]
pub struct EventsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Only events of this type (e.g. SHOT). Repeat for several.
    #[arg(long = "type", value_name = "TYPE")]
    pub types: Vec<EventType>,

    /// Only events of this possession.
    #[arg(long)]
    pub possession: Option<u32>,

    /// Earliest match time in seconds, inclusive.
    #[arg(long)]
    pub start: Option<f64>,

    /// Latest match time in seconds, inclusive.
    #[arg(long)]
    pub end: Option<f64>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &EventsArgs, config: &Config) -> Result<()> {
    if let (Some(start), Some(end)) = (args.start, args.end) {
        if start > end {
            bail!("--start ({start}) is after --end ({end})");
        }
    }

    let m = source::load(&args.source, config)?;
    let possession = args.possession.map(PossessionId::new);
    if let Some(id) = possession {
        m.possession(id)?;
    }

    let candidates: Vec<&Event> = if args.start.is_some() || args.end.is_some() {
        m.events_in_time_range(args.start.unwrap_or(0.0), args.end.unwrap_or(f64::INFINITY))
            .collect()
    } else {
        m.iter_events().collect()
    };
    let events: Vec<&Event> = candidates
        .into_iter()
        .filter(|e| args.types.is_empty() || args.types.contains(&e.event_type()))
        .filter(|e| possession.is_none_or(|id| e.possession() == id))
        .collect();
    tracing::debug!(matched = events.len(), total = m.len(), "filtered events");

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&events)?)?;
        return Ok(());
    }

    if events.is_empty() {
        writeln!(writer, "No events.")?;
        return Ok(());
    }
    for event in events {
        writeln!(writer, "{}", format_event(event))?;
    }
    Ok(())
}

/// One-line rendering: clock, type, possession, team, player, goal marker.
pub fn format_event(event: &Event) -> String {
    let mut line = format!(
        "{}  {:<12} {:>3}  {}",
        format_clock(event.match_time()),
        event.event_type().as_str(),
        event.possession().get(),
        event.team(),
    );
    if let Some(player) = event.player() {
        line.push_str(&format!(" ({player})"));
    }
    if event.is_goal() {
        line.push_str(" GOAL");
    }
    line
}

/// Formats seconds as `MM:SS.s`.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "match times are validated finite and non-negative"
)]
pub fn format_clock(seconds: f64) -> String {
    // Round first so 59.96 carries into the next minute.
    let tenths = (seconds * 10.0).round() as u64;
    let (minutes, rest) = (tenths / 600, tenths % 600);
    format!("{minutes:02}:{:02}.{}", rest / 10, rest % 10)
}
