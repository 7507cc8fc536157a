//! `query` command: filter close approaches and print or save them.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use neo_core::{FilterSet, NeoDatabase, RawQueryFilters, limit};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::dataset::DatasetPaths;
use crate::{
    ARG_CADFILE, ARG_DATE, ARG_END_DATE, ARG_HAZARDOUS, ARG_LIMIT, ARG_MAX_DIAMETER,
    ARG_MAX_DISTANCE, ARG_MAX_VELOCITY, ARG_MIN_DIAMETER, ARG_MIN_DISTANCE, ARG_MIN_VELOCITY,
    ARG_NEOFILE, ARG_OUTFILE, ARG_START_DATE, CliError,
};

/// Number of results printed when no `--limit` is given.
pub(crate) const DEFAULT_PRINT_LIMIT: usize = 10;

/// CLI arguments for the `query` subcommand.
///
/// Filter values are kept as text here and validated as a whole before the
/// dataset is scanned.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Query close approaches that match every supplied filter. \
                 Dates use YYYY-MM-DD, distances are in au, velocities in \
                 km/s and diameters in km. Results are printed, or saved as \
                 CSV or JSON when --outfile is given.",
    about = "Query close approaches"
)]
#[ortho_config(prefix = "NEO")]
pub(crate) struct QueryArgs {
    /// Path to the NEO catalogue CSV.
    #[arg(long = ARG_NEOFILE, value_name = "path")]
    #[serde(default)]
    pub(crate) neofile: Option<Utf8PathBuf>,
    /// Path to the close-approach JSON.
    #[arg(long = ARG_CADFILE, value_name = "path")]
    #[serde(default)]
    pub(crate) cadfile: Option<Utf8PathBuf>,
    /// Only approaches on this date.
    #[arg(long = ARG_DATE, short = 'd', value_name = "YYYY-MM-DD")]
    #[serde(default)]
    pub(crate) date: Option<String>,
    /// Only approaches on or after this date.
    #[arg(long = ARG_START_DATE, short = 's', value_name = "YYYY-MM-DD")]
    #[serde(default)]
    pub(crate) start_date: Option<String>,
    /// Only approaches on or before this date.
    #[arg(long = ARG_END_DATE, short = 'e', value_name = "YYYY-MM-DD")]
    #[serde(default)]
    pub(crate) end_date: Option<String>,
    /// Minimum approach distance in au.
    #[arg(long = ARG_MIN_DISTANCE, value_name = "au")]
    #[serde(default)]
    pub(crate) min_distance: Option<String>,
    /// Maximum approach distance in au.
    #[arg(long = ARG_MAX_DISTANCE, value_name = "au")]
    #[serde(default)]
    pub(crate) max_distance: Option<String>,
    /// Minimum relative velocity in km/s.
    #[arg(long = ARG_MIN_VELOCITY, value_name = "km/s")]
    #[serde(default)]
    pub(crate) min_velocity: Option<String>,
    /// Maximum relative velocity in km/s.
    #[arg(long = ARG_MAX_VELOCITY, value_name = "km/s")]
    #[serde(default)]
    pub(crate) max_velocity: Option<String>,
    /// Minimum object diameter in km.
    #[arg(long = ARG_MIN_DIAMETER, value_name = "km")]
    #[serde(default)]
    pub(crate) min_diameter: Option<String>,
    /// Maximum object diameter in km.
    #[arg(long = ARG_MAX_DIAMETER, value_name = "km")]
    #[serde(default)]
    pub(crate) max_diameter: Option<String>,
    /// Only potentially hazardous (true) or non-hazardous (false) objects.
    #[arg(long = ARG_HAZARDOUS, value_name = "true|false")]
    #[serde(default)]
    pub(crate) hazardous: Option<String>,
    /// Maximum number of results.
    #[arg(long = ARG_LIMIT, short = 'l', value_name = "count")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    /// Save results to a .csv or .json file instead of printing them.
    #[arg(long = ARG_OUTFILE, short = 'o', value_name = "path")]
    #[serde(default)]
    pub(crate) outfile: Option<Utf8PathBuf>,
}

impl QueryArgs {
    pub(crate) fn into_config(self) -> Result<QueryConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        QueryConfig::try_from(merged)
    }

    fn raw_filters(&self) -> RawQueryFilters {
        RawQueryFilters {
            date: self.date.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            distance_min: self.min_distance.clone(),
            distance_max: self.max_distance.clone(),
            velocity_min: self.min_velocity.clone(),
            velocity_max: self.max_velocity.clone(),
            diameter_min: self.min_diameter.clone(),
            diameter_max: self.max_diameter.clone(),
            hazardous: self.hazardous.clone(),
        }
    }
}

/// Resolved `query` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct QueryConfig {
    pub(crate) dataset: DatasetPaths,
    pub(crate) filters: FilterSet,
    pub(crate) limit: Option<usize>,
    pub(crate) outfile: Option<Utf8PathBuf>,
}

impl TryFrom<QueryArgs> for QueryConfig {
    type Error = CliError;

    fn try_from(args: QueryArgs) -> Result<Self, Self::Error> {
        let filters = FilterSet::from_raw(&args.raw_filters())?;
        Ok(Self {
            dataset: DatasetPaths::resolve(args.neofile, args.cadfile),
            filters,
            limit: args.limit,
            outfile: args.outfile,
        })
    }
}

pub(crate) fn run_query(args: QueryArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_query_with(args, &mut stdout)
}

pub(crate) fn run_query_with(args: QueryArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let db = config.dataset.load()?;
    execute_query(&config, &db, writer)
}

/// Run a resolved query against `db`.
///
/// With an outfile every match up to `limit` is saved; otherwise at most
/// `limit` (default [`DEFAULT_PRINT_LIMIT`]) matches are printed.
pub(crate) fn execute_query(
    config: &QueryConfig,
    db: &NeoDatabase,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let matches = db.query(&config.filters);
    match &config.outfile {
        Some(path) => {
            let saved = neo_data::write_results(path, limit(matches, config.limit)).map_err(
                |source| CliError::SaveResults {
                    path: path.clone(),
                    source,
                },
            )?;
            info!("saved {saved} close approaches to {path}");
            Ok(())
        }
        None => {
            let cap = config.limit.unwrap_or(DEFAULT_PRINT_LIMIT);
            for linked in limit(matches, Some(cap)) {
                writeln!(writer, "{linked}").map_err(CliError::WriteOutput)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<QueryConfig, CliError> {
    let merged = QueryArgs::merge_from_layers(layers).map_err(CliError::from)?;
    QueryConfig::try_from(merged)
}
