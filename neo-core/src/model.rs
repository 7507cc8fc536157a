//! Near-Earth objects and their close approaches to Earth.
//!
//! Both entities are built from textual records produced by the ingestion
//! adapters. Constructors normalise the quirks of the NASA datasets (missing
//! names, unknown diameters, `Y`/`N` hazard markers) and reject records whose
//! required fields are absent or unparsable.
//!
//! The association between the two is completed by
//! [`NeoDatabase`](crate::NeoDatabase): a NEO holds [`ApproachId`] handles
//! into the database's flat approach collection, and each approach holds an
//! optional [`NeoId`] pointing back at its object.

use std::fmt;
use std::num::ParseFloatError;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::time::{format_datetime, parse_calendar_date};

/// Hazard marker used by `neos.csv` for potentially hazardous objects.
pub const HAZARDOUS_MARKER: &str = "Y";

/// Handle to a [`NearEarthObject`] owned by a [`NeoDatabase`](crate::NeoDatabase).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NeoId(pub(crate) usize);

impl NeoId {
    /// Position of the object in the database's NEO collection.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Handle to a [`CloseApproach`] owned by a [`NeoDatabase`](crate::NeoDatabase).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ApproachId(pub(crate) usize);

impl ApproachId {
    /// Position of the approach in the database's flat approach collection.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Errors raised when a record cannot be turned into an entity.
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    /// A required field was absent or blank.
    #[error("missing required field `{field}`")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },
    /// A numeric field could not be parsed.
    #[error("field `{field}` is not a number: {value:?}")]
    InvalidNumber {
        /// Name of the offending field.
        field: &'static str,
        /// Raw text supplied for the field.
        value: String,
        /// Parser failure.
        #[source]
        source: ParseFloatError,
    },
    /// A numeric field was negative, infinite or NaN.
    #[error("field `{field}` must be a finite, non-negative number, found {value}")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// Parsed value.
        value: f64,
    },
    /// The approach time did not match `YYYY-Mon-DD hh:mm`.
    #[error("invalid approach time {value:?}")]
    InvalidTime {
        /// Raw text supplied for the time.
        value: String,
        /// Parser failure.
        #[source]
        source: chrono::ParseError,
    },
}

/// Textual input for a [`NearEarthObject`].
///
/// Adapters fill the fields they know about. Source columns without a field
/// here are ignored rather than carried along.
///
/// # Examples
/// ```
/// use neo_core::{NearEarthObject, NeoRecord};
///
/// let record = NeoRecord::new("433")
///     .with_name("Eros")
///     .with_diameter("16.84")
///     .with_hazardous("N");
/// let neo = NearEarthObject::from_record(record).expect("valid record");
/// assert_eq!(neo.full_name(), "433 (Eros)");
/// assert!(!neo.hazardous);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeoRecord {
    /// Primary designation. Required.
    pub designation: Option<String>,
    /// IAU name, if the object has one.
    pub name: Option<String>,
    /// Diameter in kilometres, if known.
    pub diameter: Option<String>,
    /// Hazard marker; only `Y` marks an object as hazardous.
    pub hazardous: Option<String>,
}

impl NeoRecord {
    /// Start a record for the given designation.
    #[must_use]
    pub fn new(designation: impl Into<String>) -> Self {
        Self {
            designation: Some(designation.into()),
            ..Self::default()
        }
    }

    /// Set the IAU name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the diameter text.
    #[must_use]
    pub fn with_diameter(mut self, diameter: impl Into<String>) -> Self {
        self.diameter = Some(diameter.into());
        self
    }

    /// Set the hazard marker.
    #[must_use]
    pub fn with_hazardous(mut self, marker: impl Into<String>) -> Self {
        self.hazardous = Some(marker.into());
        self
    }
}

/// Textual input for a [`CloseApproach`].
///
/// # Examples
/// ```
/// use neo_core::{ApproachRecord, CloseApproach};
///
/// let record = ApproachRecord::new("433", "2020-Jan-01 00:00", "0.15", "5.2");
/// let approach = CloseApproach::from_record(record).expect("valid record");
/// assert_eq!(approach.time_str(), "2020-01-01 00:00");
/// assert_eq!(approach.designation(), "433");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApproachRecord {
    /// Designation of the approaching object. Required.
    pub designation: Option<String>,
    /// Calendar date of closest approach (`YYYY-Mon-DD hh:mm`). Required.
    pub time: Option<String>,
    /// Nominal approach distance in astronomical units. Required.
    pub distance: Option<String>,
    /// Relative approach velocity in km/s. Required.
    pub velocity: Option<String>,
}

impl ApproachRecord {
    /// Build a record with every required field populated.
    #[must_use]
    pub fn new(
        designation: impl Into<String>,
        time: impl Into<String>,
        distance: impl Into<String>,
        velocity: impl Into<String>,
    ) -> Self {
        Self {
            designation: Some(designation.into()),
            time: Some(time.into()),
            distance: Some(distance.into()),
            velocity: Some(velocity.into()),
        }
    }
}

/// A near-Earth object (NEO).
///
/// The diameter is `f64::NAN` when unknown so that it cannot be mistaken for
/// a genuine zero. Guard arithmetic with [`Self::has_known_diameter`].
#[derive(Debug, Clone)]
pub struct NearEarthObject {
    /// Primary designation; unique across the dataset and case-sensitive.
    pub designation: String,
    /// IAU name, `None` when the object is unnamed.
    pub name: Option<String>,
    /// Diameter in kilometres, `NaN` when unknown.
    pub diameter: f64,
    /// Whether the object is flagged as potentially hazardous.
    pub hazardous: bool,
    approaches: Vec<ApproachId>,
}

impl NearEarthObject {
    /// Validate and normalise a [`NeoRecord`].
    ///
    /// Blank names become `None` and a blank diameter becomes `NaN`. Only the
    /// exact marker `Y` sets the hazard flag; adapters strip cell padding
    /// before building the record.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingField`] without a designation, and
    /// [`ModelError::InvalidNumber`] or [`ModelError::OutOfRange`] for a
    /// diameter that is not a finite, non-negative number.
    pub fn from_record(record: NeoRecord) -> Result<Self, ModelError> {
        let designation = required(record.designation, "designation")?;
        let name = non_blank(record.name);
        let diameter = match non_blank(record.diameter) {
            Some(text) => parse_measure("diameter", &text)?,
            None => f64::NAN,
        };
        let hazardous = record
            .hazardous
            .is_some_and(|marker| marker == HAZARDOUS_MARKER);
        Ok(Self {
            designation,
            name,
            diameter,
            hazardous,
            approaches: Vec::new(),
        })
    }

    /// Designation and name combined for display.
    ///
    /// Unnamed objects render as the bare designation.
    #[must_use]
    pub fn full_name(&self) -> String {
        self.name.as_ref().map_or_else(
            || self.designation.clone(),
            |name| format!("{} ({name})", self.designation),
        )
    }

    /// Whether the diameter is a usable number.
    #[must_use]
    pub const fn has_known_diameter(&self) -> bool {
        !self.diameter.is_nan()
    }

    /// Handles of this object's close approaches in input order.
    ///
    /// Empty until the object has been linked by a
    /// [`NeoDatabase`](crate::NeoDatabase).
    #[must_use]
    pub fn approach_ids(&self) -> &[ApproachId] {
        &self.approaches
    }

    pub(crate) fn push_approach(&mut self, id: ApproachId) {
        self.approaches.push(id);
    }
}

impl TryFrom<NeoRecord> for NearEarthObject {
    type Error = ModelError;

    fn try_from(record: NeoRecord) -> Result<Self, Self::Error> {
        Self::from_record(record)
    }
}

// Unknown diameters compare equal so that an object equals itself.
impl PartialEq for NearEarthObject {
    fn eq(&self, other: &Self) -> bool {
        let same_diameter = (self.diameter.is_nan() && other.diameter.is_nan())
            || self.diameter == other.diameter;
        self.designation == other.designation
            && self.name == other.name
            && same_diameter
            && self.hazardous == other.hazardous
            && self.approaches == other.approaches
    }
}

impl fmt::Display for NearEarthObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NEO {} has ", self.full_name())?;
        if self.has_known_diameter() {
            write!(f, "a diameter of {:.3} km", self.diameter)?;
        } else {
            f.write_str("an unknown diameter")?;
        }
        if self.hazardous {
            f.write_str(" and is potentially hazardous.")
        } else {
            f.write_str(" and is not potentially hazardous.")
        }
    }
}

/// A close approach to Earth by a NEO.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseApproach {
    /// Time of closest approach (UTC, minute precision).
    pub time: NaiveDateTime,
    /// Nominal approach distance in astronomical units.
    pub distance: f64,
    /// Relative approach velocity in km/s.
    pub velocity: f64,
    designation: String,
    neo: Option<NeoId>,
}

impl CloseApproach {
    /// Validate and parse an [`ApproachRecord`].
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingField`] when a field is absent or blank,
    /// [`ModelError::InvalidTime`] for a malformed time, and
    /// [`ModelError::InvalidNumber`] or [`ModelError::OutOfRange`] for a bad
    /// distance or velocity.
    pub fn from_record(record: ApproachRecord) -> Result<Self, ModelError> {
        let designation = required(record.designation, "designation")?;
        let raw_time = required(record.time, "time")?;
        let time = parse_calendar_date(&raw_time).map_err(|source| ModelError::InvalidTime {
            value: raw_time.clone(),
            source,
        })?;
        let distance = parse_measure("distance", &required(record.distance, "distance")?)?;
        let velocity = parse_measure("velocity", &required(record.velocity, "velocity")?)?;
        Ok(Self {
            time,
            distance,
            velocity,
            designation,
            neo: None,
        })
    }

    /// Designation of the object this approach refers to.
    #[must_use]
    pub fn designation(&self) -> &str {
        &self.designation
    }

    /// Handle of the linked object, if the designation resolved.
    #[must_use]
    pub const fn neo_id(&self) -> Option<NeoId> {
        self.neo
    }

    /// Whether the approach has been linked to a known object.
    #[must_use]
    pub const fn is_linked(&self) -> bool {
        self.neo.is_some()
    }

    /// Calendar date of the approach.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.time.date()
    }

    /// Approach time formatted as `YYYY-MM-DD hh:mm`.
    #[must_use]
    pub fn time_str(&self) -> String {
        format_datetime(&self.time)
    }

    /// Write the one-line summary, naming the object as `object`.
    pub(crate) fn write_summary(&self, f: &mut fmt::Formatter<'_>, object: &str) -> fmt::Result {
        write!(
            f,
            "On {}, '{object}' approaches Earth at a distance of {:.2} au and a velocity of {:.2} km/s.",
            self.time_str(),
            self.distance,
            self.velocity
        )
    }

    pub(crate) const fn link(&mut self, id: NeoId) {
        if self.neo.is_none() {
            self.neo = Some(id);
        }
    }
}

impl TryFrom<ApproachRecord> for CloseApproach {
    type Error = ModelError;

    fn try_from(record: ApproachRecord) -> Result<Self, Self::Error> {
        Self::from_record(record)
    }
}

impl fmt::Display for CloseApproach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_summary(f, &self.designation)
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ModelError> {
    non_blank(value).ok_or(ModelError::MissingField { field })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn parse_measure(field: &'static str, text: &str) -> Result<f64, ModelError> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|source| ModelError::InvalidNumber {
            field,
            value: text.to_owned(),
            source,
        })?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ModelError::OutOfRange { field, value })
    }
}
