//! Dataset path resolution shared by every subcommand.

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use neo_core::NeoDatabase;

use crate::{ARG_CADFILE, ARG_NEOFILE, CliError};

/// Default location of the NEO catalogue.
pub(crate) const DEFAULT_NEOFILE: &str = "data/neos.csv";
/// Default location of the close-approach data.
pub(crate) const DEFAULT_CADFILE: &str = "data/cad.json";

/// Resolved locations of the two input datasets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DatasetPaths {
    pub(crate) neofile: Utf8PathBuf,
    pub(crate) cadfile: Utf8PathBuf,
}

impl DatasetPaths {
    /// Fill unset paths with the defaults.
    pub(crate) fn resolve(neofile: Option<Utf8PathBuf>, cadfile: Option<Utf8PathBuf>) -> Self {
        Self {
            neofile: neofile.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_NEOFILE)),
            cadfile: cadfile.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_CADFILE)),
        }
    }

    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.neofile, ARG_NEOFILE)?;
        Self::require_existing(&self.cadfile, ARG_CADFILE)?;
        Ok(())
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match neo_data::fs::is_regular_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Validate both paths, then load and link the datasets.
    pub(crate) fn load(&self) -> Result<NeoDatabase, CliError> {
        self.validate_sources()?;
        let db = neo_data::load_database(&self.neofile, &self.cadfile)?;
        debug!(
            "dataset ready: {} NEOs, {} close approaches",
            db.neo_count(),
            db.approach_count()
        );
        Ok(db)
    }
}
