//! `inspect` command: look up one near-Earth object.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use neo_core::{NearEarthObject, NeoDatabase};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::dataset::DatasetPaths;
use crate::{
    ARG_CADFILE, ARG_NAME, ARG_NEOFILE, ARG_PDES, ARG_VERBOSE, CliError, ENV_INSPECT_PDES,
};

/// Printed when a lookup finds nothing.
pub(crate) const NO_MATCH_MESSAGE: &str = "No matching NEOs exist in the database.";

/// CLI arguments for the `inspect` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Look up a near-Earth object by primary designation or by IAU \
                 name and print its details. With --verbose, also list its \
                 close approaches to Earth.",
    about = "Inspect a single near-Earth object"
)]
#[ortho_config(prefix = "NEO")]
pub(crate) struct InspectArgs {
    /// Path to the NEO catalogue CSV.
    #[arg(long = ARG_NEOFILE, value_name = "path")]
    #[serde(default)]
    pub(crate) neofile: Option<Utf8PathBuf>,
    /// Path to the close-approach JSON.
    #[arg(long = ARG_CADFILE, value_name = "path")]
    #[serde(default)]
    pub(crate) cadfile: Option<Utf8PathBuf>,
    /// Primary designation to look up (e.g. "433").
    #[arg(long = ARG_PDES, value_name = "designation", conflicts_with = ARG_NAME)]
    #[serde(default)]
    pub(crate) pdes: Option<String>,
    /// IAU name to look up (e.g. "Eros").
    #[arg(long = ARG_NAME, value_name = "name")]
    #[serde(default)]
    pub(crate) name: Option<String>,
    /// Also print the object's close approaches.
    #[arg(long = ARG_VERBOSE, short = 'v')]
    #[serde(default)]
    pub(crate) verbose: bool,
}

impl InspectArgs {
    pub(crate) fn into_config(self) -> Result<InspectConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        InspectConfig::try_from(merged)
    }
}

/// How the object is identified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Lookup {
    Designation(String),
    Name(String),
}

impl Lookup {
    fn find<'a>(&self, db: &'a NeoDatabase) -> Option<&'a NearEarthObject> {
        match self {
            Self::Designation(designation) => db.get_neo_by_designation(designation),
            Self::Name(name) => db.get_neo_by_name(name),
        }
    }
}

/// Resolved `inspect` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InspectConfig {
    pub(crate) dataset: DatasetPaths,
    pub(crate) lookup: Lookup,
    pub(crate) verbose: bool,
}

impl TryFrom<InspectArgs> for InspectConfig {
    type Error = CliError;

    fn try_from(args: InspectArgs) -> Result<Self, Self::Error> {
        let lookup = match (args.pdes, args.name) {
            (Some(_), Some(_)) => {
                return Err(CliError::ConflictingArguments {
                    first: ARG_PDES,
                    second: ARG_NAME,
                });
            }
            (Some(designation), None) => Lookup::Designation(designation),
            (None, Some(name)) => Lookup::Name(name),
            (None, None) => {
                return Err(CliError::MissingArgument {
                    field: ARG_PDES,
                    env: ENV_INSPECT_PDES,
                });
            }
        };
        Ok(Self {
            dataset: DatasetPaths::resolve(args.neofile, args.cadfile),
            lookup,
            verbose: args.verbose,
        })
    }
}

pub(crate) fn run_inspect(args: InspectArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_inspect_with(args, &mut stdout)
}

pub(crate) fn run_inspect_with(args: InspectArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let db = config.dataset.load()?;
    write_inspection(writer, &db, &config.lookup, config.verbose)
}

/// Print the object found by `lookup`, or a notice when there is none.
pub(crate) fn write_inspection(
    writer: &mut dyn Write,
    db: &NeoDatabase,
    lookup: &Lookup,
    verbose: bool,
) -> Result<(), CliError> {
    let Some(neo) = lookup.find(db) else {
        return writeln!(writer, "{NO_MATCH_MESSAGE}").map_err(CliError::WriteOutput);
    };
    writeln!(writer, "{neo}").map_err(CliError::WriteOutput)?;
    if verbose {
        for approach in db.approaches_of(neo) {
            writeln!(writer, "- {}", db.linked(approach)).map_err(CliError::WriteOutput)?;
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<InspectConfig, CliError> {
    let merged = InspectArgs::merge_from_layers(layers).map_err(CliError::from)?;
    InspectConfig::try_from(merged)
}
