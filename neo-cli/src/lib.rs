//! Command-line interface for exploring near-Earth objects and their close
//! approaches to Earth.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod dataset;
mod error;
mod inspect;
mod query;

pub use error::CliError;

use inspect::{InspectArgs, run_inspect};
use query::{QueryArgs, run_query};

pub(crate) const ARG_NEOFILE: &str = "neofile";
pub(crate) const ARG_CADFILE: &str = "cadfile";
pub(crate) const ARG_PDES: &str = "pdes";
pub(crate) const ARG_NAME: &str = "name";
pub(crate) const ARG_VERBOSE: &str = "verbose";
pub(crate) const ARG_DATE: &str = "date";
pub(crate) const ARG_START_DATE: &str = "start-date";
pub(crate) const ARG_END_DATE: &str = "end-date";
pub(crate) const ARG_MIN_DISTANCE: &str = "min-distance";
pub(crate) const ARG_MAX_DISTANCE: &str = "max-distance";
pub(crate) const ARG_MIN_VELOCITY: &str = "min-velocity";
pub(crate) const ARG_MAX_VELOCITY: &str = "max-velocity";
pub(crate) const ARG_MIN_DIAMETER: &str = "min-diameter";
pub(crate) const ARG_MAX_DIAMETER: &str = "max-diameter";
pub(crate) const ARG_HAZARDOUS: &str = "hazardous";
pub(crate) const ARG_LIMIT: &str = "limit";
pub(crate) const ARG_OUTFILE: &str = "outfile";
pub(crate) const ENV_INSPECT_PDES: &str = "NEO_CMDS_INSPECT_PDES";

/// Run the `neo` CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Inspect(args) => run_inspect(args),
        Command::Query(args) => run_query(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "neo",
    about = "Explore near-Earth objects and their close approaches to Earth",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Look up a near-Earth object by designation or name.
    Inspect(InspectArgs),
    /// Query close approaches with filters.
    Query(QueryArgs),
}

#[cfg(test)]
mod tests;
