//! Export query results as CSV or JSON.
//!
//! Both formats carry the same information. The approach's own designation is
//! always written, so unlinked approaches remain identifiable; the object's
//! name, diameter and hazard flag are blank (`null` in JSON) when unknown.

use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use neo_core::LinkedApproach;
use neo_core::time::format_datetime;
use serde::Serialize;
use thiserror::Error;

use crate::fs::create_output;

/// Column order of CSV exports.
pub const CSV_COLUMNS: [&str; 7] = [
    "datetime_utc",
    "distance_au",
    "velocity_km_s",
    "designation",
    "name",
    "diameter_km",
    "potentially_hazardous",
];

/// Errors raised while exporting results.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The output file could not be created.
    #[error("failed to create {path}: {source}")]
    Create {
        /// Destination path.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The destination's extension names no supported format.
    #[error("cannot infer an output format for {path}; use a .csv or .json extension")]
    UnsupportedFormat {
        /// Destination path.
        path: Utf8PathBuf,
    },
    /// CSV serialisation failed.
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    /// JSON serialisation failed.
    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Flushing the destination failed.
    #[error("failed to flush output: {0}")]
    Io(#[from] io::Error),
}

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// A pretty-printed JSON array.
    Json,
}

impl OutputFormat {
    /// Infer the format from a file extension, ignoring case.
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Option<Self> {
        let extension = path.extension()?;
        if extension.eq_ignore_ascii_case("csv") {
            Some(Self::Csv)
        } else if extension.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else {
            None
        }
    }
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    datetime_utc: String,
    distance_au: f64,
    velocity_km_s: f64,
    designation: &'a str,
    name: Option<&'a str>,
    diameter_km: Option<f64>,
    potentially_hazardous: Option<bool>,
}

#[derive(Debug, Serialize)]
struct JsonRow<'a> {
    datetime_utc: String,
    distance_au: f64,
    velocity_km_s: f64,
    neo: JsonNeo<'a>,
}

#[derive(Debug, Serialize)]
struct JsonNeo<'a> {
    designation: &'a str,
    name: Option<&'a str>,
    diameter_km: Option<f64>,
    potentially_hazardous: Option<bool>,
}

impl<'a> JsonNeo<'a> {
    fn from_linked(linked: &LinkedApproach<'a>) -> Self {
        let owner = linked.neo();
        Self {
            designation: linked.approach().designation(),
            name: owner.and_then(|object| object.name.as_deref()),
            diameter_km: owner
                .filter(|object| object.has_known_diameter())
                .map(|object| object.diameter),
            potentially_hazardous: owner.map(|object| object.hazardous),
        }
    }
}

impl<'a> From<LinkedApproach<'a>> for CsvRow<'a> {
    fn from(linked: LinkedApproach<'a>) -> Self {
        let approach = linked.approach();
        let object = JsonNeo::from_linked(&linked);
        Self {
            datetime_utc: format_datetime(&approach.time),
            distance_au: approach.distance,
            velocity_km_s: approach.velocity,
            designation: object.designation,
            name: object.name,
            diameter_km: object.diameter_km,
            potentially_hazardous: object.potentially_hazardous,
        }
    }
}

impl<'a> From<LinkedApproach<'a>> for JsonRow<'a> {
    fn from(linked: LinkedApproach<'a>) -> Self {
        let approach = linked.approach();
        Self {
            datetime_utc: format_datetime(&approach.time),
            distance_au: approach.distance,
            velocity_km_s: approach.velocity,
            neo: JsonNeo::from_linked(&linked),
        }
    }
}

/// Write results as CSV, returning the number of rows written.
///
/// The header row is written even when there are no results.
///
/// # Errors
///
/// Returns [`WriteError::Csv`] or [`WriteError::Io`] when writing fails.
pub fn write_to_csv<'a, W, I>(writer: W, results: I) -> Result<usize, WriteError>
where
    W: Write,
    I: IntoIterator<Item = LinkedApproach<'a>>,
{
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(CSV_COLUMNS)?;
    let mut rows = 0;
    for linked in results {
        csv_writer.serialize(CsvRow::from(linked))?;
        rows += 1;
    }
    csv_writer.flush()?;
    Ok(rows)
}

/// Write results as a JSON array, returning the number of entries written.
///
/// # Errors
///
/// Returns [`WriteError::Json`] or [`WriteError::Io`] when writing fails.
pub fn write_to_json<'a, W, I>(mut writer: W, results: I) -> Result<usize, WriteError>
where
    W: Write,
    I: IntoIterator<Item = LinkedApproach<'a>>,
{
    let rows: Vec<JsonRow<'a>> = results.into_iter().map(JsonRow::from).collect();
    serde_json::to_writer_pretty(&mut writer, &rows)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(rows.len())
}

/// Save results to `path`, choosing the format from its extension.
///
/// Parent directories are created as needed.
///
/// # Errors
///
/// Returns [`WriteError::UnsupportedFormat`] for an extension other than
/// `.csv` or `.json`, [`WriteError::Create`] when the file cannot be created,
/// and any serialisation failure.
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
/// use neo_core::FilterSet;
/// use neo_data::{load_database, write_results};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let db = load_database(Utf8Path::new("data/neos.csv"), Utf8Path::new("data/cad.json"))?;
/// let filters = FilterSet::default();
/// write_results(Utf8Path::new("out/all.json"), db.query(&filters))?;
/// # Ok(())
/// # }
/// ```
pub fn write_results<'a, I>(path: &Utf8Path, results: I) -> Result<usize, WriteError>
where
    I: IntoIterator<Item = LinkedApproach<'a>>,
{
    let format = OutputFormat::from_path(path).ok_or_else(|| WriteError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    let file = create_output(path).map_err(|source| WriteError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let writer = io::BufWriter::new(file);
    let rows = match format {
        OutputFormat::Csv => write_to_csv(writer, results)?,
        OutputFormat::Json => write_to_json(writer, results)?,
    };
    info!("wrote {rows} results to {path}");
    Ok(rows)
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    clippy::indexing_slicing,
    reason = "tests should fail fast and inspect fixed-size output"
)]
mod tests {
    use super::*;
    use neo_core::NeoDatabase;
    use neo_core::test_support::sample_database;
    use rstest::{fixture, rstest};
    use serde_json::{Value, json};

    #[fixture]
    fn db() -> NeoDatabase {
        sample_database()
    }

    #[rstest]
    #[case("out.csv", Some(OutputFormat::Csv))]
    #[case("OUT.JSON", Some(OutputFormat::Json))]
    #[case("dir/results.txt", None)]
    #[case("no_extension", None)]
    fn infers_format_from_extension(#[case] path: &str, #[case] expected: Option<OutputFormat>) {
        assert_eq!(OutputFormat::from_path(Utf8Path::new(path)), expected);
    }

    #[rstest]
    fn csv_export_has_header_and_blank_unknowns(db: NeoDatabase) {
        let mut buffer = Vec::new();
        let rows = write_to_csv(&mut buffer, db.approaches()).expect("write CSV");
        assert_eq!(rows, db.approach_count());

        let text = String::from_utf8(buffer).expect("utf-8 CSV");
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], CSV_COLUMNS.join(","));
        assert_eq!(lines[1], "1900-01-01 00:11,0.4,3.8,433,Eros,16.84,false");
        assert_eq!(lines[3], "2020-01-01 23:59,0.1,12.0,2020 AB,,,false");
        assert_eq!(lines[4], "2020-01-03 00:00,0.07,3.1,999,,,");
    }

    #[rstest]
    fn csv_export_of_no_results_is_header_only() {
        let mut buffer = Vec::new();
        let rows = write_to_csv(&mut buffer, std::iter::empty::<LinkedApproach<'_>>())
            .expect("write CSV");
        assert_eq!(rows, 0);
        assert_eq!(
            String::from_utf8(buffer).expect("utf-8 CSV").trim_end(),
            CSV_COLUMNS.join(",")
        );
    }

    #[rstest]
    fn json_export_nests_object_fields(db: NeoDatabase) {
        let mut buffer = Vec::new();
        write_to_json(&mut buffer, db.approaches()).expect("write JSON");
        let value: Value = serde_json::from_slice(&buffer).expect("valid JSON");
        let entries = value.as_array().expect("array");
        assert_eq!(entries.len(), db.approach_count());
        assert_eq!(
            entries[0],
            json!({
                "datetime_utc": "1900-01-01 00:11",
                "distance_au": 0.4,
                "velocity_km_s": 3.8,
                "neo": {
                    "designation": "433",
                    "name": "Eros",
                    "diameter_km": 16.84,
                    "potentially_hazardous": false
                }
            })
        );
        assert_eq!(
            entries[3]["neo"],
            json!({
                "designation": "999",
                "name": null,
                "diameter_km": null,
                "potentially_hazardous": null
            })
        );
    }

    #[rstest]
    fn write_results_rejects_unknown_extension(db: NeoDatabase) {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let path = Utf8PathBuf::from_path_buf(tmp.path().join("results.xml")).expect("utf-8 path");
        let err = write_results(&path, db.approaches()).expect_err("unsupported format");
        assert!(matches!(err, WriteError::UnsupportedFormat { .. }));
        assert!(!path.exists());
    }
}
