//! CLI subcommand implementations.

pub mod events;
pub mod possessions;
pub mod priors;
pub mod sample;
pub mod source;
pub mod summary;
