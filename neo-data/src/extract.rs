//! Readers for the NASA `neos.csv` and `cad.json` datasets.
//!
//! Both readers locate their columns by name and ignore anything they do not
//! recognise. Rows become [`NeoRecord`]s and [`ApproachRecord`]s, so all value
//! normalisation stays in `neo-core`.

use std::io::{self, Read};

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use neo_core::{
    ApproachRecord, CloseApproach, DatabaseError, ModelError, NearEarthObject, NeoDatabase,
    NeoRecord,
};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::fs::open_input;

/// Column holding the primary designation in `neos.csv`.
pub const NEO_DESIGNATION_COLUMN: &str = "pdes";
/// Fields every `cad.json` document must declare.
pub const CAD_REQUIRED_FIELDS: [&str; 4] = ["des", "cd", "dist", "v_rel"];

/// Errors raised while loading the datasets.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The input file could not be opened.
    #[error("failed to open {path}: {source}")]
    Open {
        /// Path that failed to open.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The CSV input was malformed.
    #[error("failed to read CSV from {origin}: {source}")]
    Csv {
        /// File path or reader label.
        origin: String,
        /// Parser failure.
        #[source]
        source: csv::Error,
    },
    /// The JSON input was malformed.
    #[error("failed to parse JSON from {origin}: {source}")]
    Json {
        /// File path or reader label.
        origin: String,
        /// Parser failure.
        #[source]
        source: serde_json::Error,
    },
    /// A required column or field was not declared by the input.
    #[error("{origin} does not declare the required column `{column}`")]
    MissingColumn {
        /// File path or reader label.
        origin: String,
        /// Name of the absent column.
        column: &'static str,
    },
    /// A row could not be turned into an entity.
    #[error("record {index} in {origin} is invalid: {source}")]
    Record {
        /// File path or reader label.
        origin: String,
        /// Zero-based index of the data row.
        index: usize,
        /// Entity construction failure.
        #[source]
        source: ModelError,
    },
    /// Linking the loaded entities failed.
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Deserialize)]
struct NeoRow {
    #[serde(rename = "pdes")]
    designation: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    diameter: Option<String>,
    #[serde(default, rename = "pha")]
    hazardous: Option<String>,
}

impl From<NeoRow> for NeoRecord {
    fn from(row: NeoRow) -> Self {
        Self {
            designation: row.designation,
            name: row.name,
            diameter: row.diameter,
            hazardous: row.hazardous,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CadDocument {
    fields: Vec<String>,
    #[serde(default)]
    data: Vec<Vec<Value>>,
}

/// Positions of the required `cad.json` fields within each data row.
struct CadColumns {
    designation: usize,
    time: usize,
    distance: usize,
    velocity: usize,
}

impl CadColumns {
    fn locate(fields: &[String], origin: &str) -> Result<Self, ExtractError> {
        let find = |column: &'static str| {
            fields
                .iter()
                .position(|field| field == column)
                .ok_or_else(|| ExtractError::MissingColumn {
                    origin: origin.to_owned(),
                    column,
                })
        };
        let [des, cd, dist, v_rel] = CAD_REQUIRED_FIELDS;
        Ok(Self {
            designation: find(des)?,
            time: find(cd)?,
            distance: find(dist)?,
            velocity: find(v_rel)?,
        })
    }

    fn record(&self, row: &[Value]) -> ApproachRecord {
        ApproachRecord {
            designation: cell(row, self.designation),
            time: cell(row, self.time),
            distance: cell(row, self.distance),
            velocity: cell(row, self.velocity),
        }
    }
}

/// Render a JSON cell as text. `null` and absent cells are unknown.
fn cell(row: &[Value], index: usize) -> Option<String> {
    match row.get(index)? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Parse NEO rows from any CSV source with a header row.
///
/// `origin` labels the source in errors.
///
/// # Errors
///
/// Returns [`ExtractError::MissingColumn`] without a `pdes` header,
/// [`ExtractError::Csv`] for malformed CSV and [`ExtractError::Record`] for a
/// row that does not form a valid object.
///
/// # Examples
/// ```
/// use neo_data::read_neos;
///
/// let csv = "id,pdes,name,pha,diameter\na0000433,433,Eros,N,16.84\n";
/// let neos = read_neos(csv.as_bytes(), "inline").expect("valid CSV");
/// assert_eq!(neos[0].full_name(), "433 (Eros)");
/// ```
pub fn read_neos<R: Read>(reader: R, origin: &str) -> Result<Vec<NearEarthObject>, ExtractError> {
    let csv_error = |source| ExtractError::Csv {
        origin: origin.to_owned(),
        source,
    };
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = csv_reader.headers().map_err(csv_error)?;
    if !headers.iter().any(|header| header == NEO_DESIGNATION_COLUMN) {
        return Err(ExtractError::MissingColumn {
            origin: origin.to_owned(),
            column: NEO_DESIGNATION_COLUMN,
        });
    }

    let mut neos = Vec::new();
    for (index, parsed) in csv_reader.deserialize::<NeoRow>().enumerate() {
        let row = parsed.map_err(csv_error)?;
        let neo = NearEarthObject::from_record(row.into()).map_err(|source| {
            ExtractError::Record {
                origin: origin.to_owned(),
                index,
                source,
            }
        })?;
        neos.push(neo);
    }
    debug!("parsed {} NEOs from {origin}", neos.len());
    Ok(neos)
}

/// Parse close approaches from any `cad.json`-shaped source.
///
/// `origin` labels the source in errors.
///
/// # Errors
///
/// Returns [`ExtractError::Json`] for malformed JSON,
/// [`ExtractError::MissingColumn`] when a required field is not declared and
/// [`ExtractError::Record`] for a row that does not form a valid approach.
pub fn read_approaches<R: Read>(
    reader: R,
    origin: &str,
) -> Result<Vec<CloseApproach>, ExtractError> {
    let document: CadDocument =
        serde_json::from_reader(io::BufReader::new(reader)).map_err(|source| {
            ExtractError::Json {
                origin: origin.to_owned(),
                source,
            }
        })?;
    let columns = CadColumns::locate(&document.fields, origin)?;

    let approaches = document
        .data
        .iter()
        .enumerate()
        .map(|(index, row)| {
            CloseApproach::from_record(columns.record(row)).map_err(|source| {
                ExtractError::Record {
                    origin: origin.to_owned(),
                    index,
                    source,
                }
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    debug!("parsed {} close approaches from {origin}", approaches.len());
    Ok(approaches)
}

fn open(path: &Utf8Path) -> Result<cap_std::fs_utf8::File, ExtractError> {
    open_input(path).map_err(|source| ExtractError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Load NEOs from a `neos.csv` file.
///
/// # Errors
///
/// Returns [`ExtractError::Open`] when the file cannot be opened, otherwise
/// as [`read_neos`].
pub fn load_neos(path: &Utf8Path) -> Result<Vec<NearEarthObject>, ExtractError> {
    let neos = read_neos(io::BufReader::new(open(path)?), path.as_str())?;
    info!("loaded {} NEOs from {path}", neos.len());
    Ok(neos)
}

/// Load close approaches from a `cad.json` file.
///
/// # Errors
///
/// Returns [`ExtractError::Open`] when the file cannot be opened, otherwise
/// as [`read_approaches`].
pub fn load_approaches(path: &Utf8Path) -> Result<Vec<CloseApproach>, ExtractError> {
    let approaches = read_approaches(open(path)?, path.as_str())?;
    info!("loaded {} close approaches from {path}", approaches.len());
    Ok(approaches)
}

/// Load both datasets and link them into a [`NeoDatabase`].
///
/// # Errors
///
/// Propagates loader failures and returns [`ExtractError::Database`] when
/// two objects share a designation.
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
/// use neo_data::load_database;
///
/// # fn main() -> Result<(), neo_data::ExtractError> {
/// let db = load_database(Utf8Path::new("data/neos.csv"), Utf8Path::new("data/cad.json"))?;
/// println!("{} objects", db.neo_count());
/// # Ok(())
/// # }
/// ```
pub fn load_database(neo_path: &Utf8Path, cad_path: &Utf8Path) -> Result<NeoDatabase, ExtractError> {
    let neos = load_neos(neo_path)?;
    let approaches = load_approaches(cad_path)?;
    Ok(NeoDatabase::new(neos, approaches)?)
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic,
    reason = "tests should fail fast and inspect fixed-size fixtures"
)]
mod tests {
    use super::*;
    use rstest::rstest;

    const NEOS_CSV: &str = "\
id,spkid,full_name,pdes,name,prefix,neo,pha,H,G,M1,M2,K1,K2,PC,diameter
a0000433,2000433,433 Eros (A898 PA),433,Eros,,Y,N,10.4,0.46,,,,,,16.84
a0099942,2099942,99942 Apophis (2004 MN4),99942,Apophis,,Y,Y,19.09,,,,,,,0.375
bK20A00B,3840000,(2020 AB),2020 AB,,,Y,N,26.1,,,,,,,
";

    const CAD_JSON: &str = r#"{
        "signature": {"version": "1.1", "source": "NASA/JPL SBDB Close Approach Data API"},
        "count": "3",
        "fields": ["des", "orbit_id", "jd", "cd", "dist", "dist_min", "dist_max", "v_rel", "v_inf", "t_sigma_f", "h"],
        "data": [
            ["433", "659", "2415020.507669610", "1900-Jan-01 00:11", "0.313", "0.313", "0.313", "5.58", "5.57", "< 00:01", "10.4"],
            ["99942", "199", "2462240.407", "2029-Apr-13 21:46", "0.000254", "0.000254", "0.000254", "7.42", "5.84", "< 00:01", "19.1"],
            ["2020 AB", "4", "2458849.5", "2020-Jan-01 12:00", 0.0412, "0.04", "0.042", 12.5, null, "00:02", null]
        ]
    }"#;

    #[rstest]
    #[expect(clippy::float_arithmetic, reason = "tolerance check on parsed floats")]
    fn reads_neos_by_header_and_normalises_blanks() {
        let neos = read_neos(NEOS_CSV.as_bytes(), "neos.csv").expect("valid CSV");
        assert_eq!(neos.len(), 3);
        assert_eq!(neos[0].full_name(), "433 (Eros)");
        assert!((neos[0].diameter - 16.84).abs() < 1e-9);
        assert!(neos[1].hazardous);
        assert_eq!(neos[2].name, None);
        assert!(neos[2].diameter.is_nan());
    }

    #[rstest]
    fn padded_cells_are_trimmed_before_normalisation() {
        let csv = "pdes , name , pha\n 99942 , Apophis , Y \n";
        let neos = read_neos(csv.as_bytes(), "neos.csv").expect("valid CSV");
        assert_eq!(neos[0].designation, "99942");
        assert_eq!(neos[0].name.as_deref(), Some("Apophis"));
        assert!(neos[0].hazardous);
    }

    #[rstest]
    fn rejects_csv_without_designation_column() {
        let err = read_neos("name,pha\nEros,N\n".as_bytes(), "neos.csv").expect_err("no pdes");
        assert!(matches!(
            err,
            ExtractError::MissingColumn { column: "pdes", .. }
        ));
    }

    #[rstest]
    fn reports_row_index_for_invalid_neo() {
        let csv = "pdes,diameter\n433,16.84\n99942,wide\n";
        let err = read_neos(csv.as_bytes(), "neos.csv").expect_err("bad diameter");
        match err {
            ExtractError::Record { origin, index, source } => {
                assert_eq!(origin, "neos.csv");
                assert_eq!(index, 1);
                assert!(matches!(source, ModelError::InvalidNumber { field: "diameter", .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[rstest]
    #[expect(clippy::float_arithmetic, reason = "tolerance check on parsed floats")]
    fn reads_approaches_with_string_and_numeric_cells() {
        let approaches = read_approaches(CAD_JSON.as_bytes(), "cad.json").expect("valid JSON");
        assert_eq!(approaches.len(), 3);
        assert_eq!(approaches[0].designation(), "433");
        assert_eq!(approaches[0].time_str(), "1900-01-01 00:11");
        assert!((approaches[2].distance - 0.0412).abs() < 1e-12);
        assert!((approaches[2].velocity - 12.5).abs() < 1e-12);
        assert!(approaches.iter().all(|approach| !approach.is_linked()));
    }

    #[rstest]
    #[case(r#"{"fields": ["des", "cd", "dist"], "data": []}"#, "v_rel")]
    #[case(r#"{"fields": ["cd", "dist", "v_rel"], "data": []}"#, "des")]
    fn rejects_cad_without_required_field(#[case] json: &str, #[case] missing: &str) {
        let err = read_approaches(json.as_bytes(), "cad.json").expect_err("missing field");
        match err {
            ExtractError::MissingColumn { column, .. } => assert_eq!(column, missing),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[rstest]
    fn short_rows_surface_as_missing_fields() {
        let json = r#"{"fields": ["des", "cd", "dist", "v_rel"], "data": [["433", "2020-Jan-01 00:00"]]}"#;
        let err = read_approaches(json.as_bytes(), "cad.json").expect_err("short row");
        assert!(matches!(
            err,
            ExtractError::Record {
                index: 0,
                source: ModelError::MissingField { field: "distance" },
                ..
            }
        ));
    }

    #[rstest]
    fn malformed_json_is_reported() {
        let err = read_approaches("{not json".as_bytes(), "cad.json").expect_err("bad JSON");
        assert!(matches!(err, ExtractError::Json { .. }));
    }
}
