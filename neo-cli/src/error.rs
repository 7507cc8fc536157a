//! Error types emitted by the `neo` CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use neo_core::FilterError;
use neo_data::{ExtractError, WriteError};
use thiserror::Error;

/// Errors emitted by the `neo` CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Long flag name of the option.
        field: &'static str,
        /// Environment variable that also supplies it.
        env: &'static str,
    },
    /// Two mutually exclusive options were both supplied.
    #[error("--{first} and --{second} cannot be used together")]
    ConflictingArguments {
        /// First flag supplied.
        first: &'static str,
        /// Second flag supplied.
        second: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Flag naming the input.
        field: &'static str,
        /// Resolved path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Flag naming the input.
        field: &'static str,
        /// Resolved path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Flag naming the input.
        field: &'static str,
        /// Resolved path.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// A query filter value was malformed.
    #[error("invalid query filter: {0}")]
    Filter(#[from] FilterError),
    /// Loading or linking the datasets failed.
    #[error("failed to load the NEO dataset: {0}")]
    Load(#[from] ExtractError),
    /// Saving query results failed.
    #[error("failed to save results to {path:?}: {source}")]
    SaveResults {
        /// Destination path.
        path: Utf8PathBuf,
        /// Writer failure.
        #[source]
        source: WriteError,
    },
    /// Writing to standard output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
