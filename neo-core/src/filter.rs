//! Predicate filters over linked close approaches.
//!
//! A query is described by [`QueryFilters`], a struct of optional bounds.
//! [`RawQueryFilters`] carries the same bounds as text, as they arrive from
//! the command line or a configuration file, and parses them up front so that
//! malformed input fails before any scanning starts. [`FilterSet`] turns the
//! bounds into an ordered list of [`ApproachFilter`] predicates which
//! [`Matches`] applies lazily over a [`NeoDatabase`].
//!
//! Predicates are combined with logical AND. Contradictory bounds are not an
//! error; they simply match nothing.

use std::iter::FusedIterator;
use std::num::ParseFloatError;
use std::slice;

use chrono::NaiveDate;
use thiserror::Error;

use crate::database::{LinkedApproach, NeoDatabase};
use crate::model::CloseApproach;
use crate::time::parse_date;

/// Errors raised while parsing or validating filter values.
#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    /// A numeric bound could not be parsed.
    #[error("filter `{field}` is not a number: {value:?}")]
    InvalidNumber {
        /// Name of the offending filter.
        field: &'static str,
        /// Raw text supplied for the filter.
        value: String,
        /// Parser failure.
        #[source]
        source: ParseFloatError,
    },
    /// A numeric bound was infinite or NaN.
    #[error("filter `{field}` must be a finite number, found {value}")]
    NonFinite {
        /// Name of the offending filter.
        field: &'static str,
        /// Parsed value.
        value: f64,
    },
    /// A date bound did not match `YYYY-MM-DD`.
    #[error("filter `{field}` is not a YYYY-MM-DD date: {value:?}")]
    InvalidDate {
        /// Name of the offending filter.
        field: &'static str,
        /// Raw text supplied for the filter.
        value: String,
        /// Parser failure.
        #[source]
        source: chrono::ParseError,
    },
    /// A boolean filter was neither true nor false.
    #[error("filter `{field}` must be true or false, found {value:?}")]
    InvalidFlag {
        /// Name of the offending filter.
        field: &'static str,
        /// Raw text supplied for the filter.
        value: String,
    },
}

/// How an attribute is compared against a filter's reference value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Attribute equals the reference value.
    Equal,
    /// Attribute is greater than or equal to the reference value.
    AtLeast,
    /// Attribute is less than or equal to the reference value.
    AtMost,
}

impl Comparison {
    fn holds<T: PartialOrd>(self, actual: &T, reference: &T) -> bool {
        match self {
            Self::Equal => actual == reference,
            Self::AtLeast => actual >= reference,
            Self::AtMost => actual <= reference,
        }
    }
}

/// A single predicate over a linked close approach.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ApproachFilter {
    /// Compares the calendar date of the approach time.
    Date {
        /// Comparison applied to the approach date.
        comparison: Comparison,
        /// Reference date.
        date: NaiveDate,
    },
    /// Compares the approach distance in au.
    Distance {
        /// Comparison applied to the distance.
        comparison: Comparison,
        /// Reference distance.
        value: f64,
    },
    /// Compares the approach velocity in km/s.
    Velocity {
        /// Comparison applied to the velocity.
        comparison: Comparison,
        /// Reference velocity.
        value: f64,
    },
    /// Compares the linked object's diameter in km.
    ///
    /// Unlinked approaches and unknown diameters never match.
    Diameter {
        /// Comparison applied to the diameter.
        comparison: Comparison,
        /// Reference diameter.
        value: f64,
    },
    /// Requires the linked object's hazard flag to equal the value.
    ///
    /// Unlinked approaches never match.
    Hazardous(bool),
}

impl ApproachFilter {
    /// Whether the candidate satisfies this predicate.
    #[must_use]
    pub fn matches(&self, candidate: &LinkedApproach<'_>) -> bool {
        let approach = candidate.approach();
        match *self {
            Self::Date { comparison, date } => comparison.holds(&approach.date(), &date),
            Self::Distance { comparison, value } => comparison.holds(&approach.distance, &value),
            Self::Velocity { comparison, value } => comparison.holds(&approach.velocity, &value),
            Self::Diameter { comparison, value } => candidate
                .neo()
                .filter(|neo| neo.has_known_diameter())
                .is_some_and(|neo| comparison.holds(&neo.diameter, &value)),
            Self::Hazardous(expected) => candidate.neo().is_some_and(|neo| neo.hazardous == expected),
        }
    }

    /// Relative evaluation cost; approach-local attributes come first.
    const fn cost(&self) -> u8 {
        match self {
            Self::Distance { .. } | Self::Velocity { .. } => 0,
            Self::Date { .. } => 1,
            Self::Hazardous(_) | Self::Diameter { .. } => 2,
        }
    }
}

/// Typed optional bounds for a close approach query.
///
/// Every bound is inclusive. Diameter and hazard bounds apply to the linked
/// object.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QueryFilters {
    /// Approach date must equal this date.
    pub date: Option<NaiveDate>,
    /// Approach date lower bound.
    pub start_date: Option<NaiveDate>,
    /// Approach date upper bound.
    pub end_date: Option<NaiveDate>,
    /// Distance lower bound in au.
    pub distance_min: Option<f64>,
    /// Distance upper bound in au.
    pub distance_max: Option<f64>,
    /// Velocity lower bound in km/s.
    pub velocity_min: Option<f64>,
    /// Velocity upper bound in km/s.
    pub velocity_max: Option<f64>,
    /// Diameter lower bound in km.
    pub diameter_min: Option<f64>,
    /// Diameter upper bound in km.
    pub diameter_max: Option<f64>,
    /// Required hazard flag of the linked object.
    pub hazardous: Option<bool>,
}

/// Textual query bounds, parsed into [`QueryFilters`] before scanning.
///
/// Dates use `YYYY-MM-DD`. The hazard flag accepts `true`/`false`,
/// `yes`/`no` or `y`/`n`, case-insensitively. Blank values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawQueryFilters {
    /// Approach date must equal this date.
    pub date: Option<String>,
    /// Approach date lower bound.
    pub start_date: Option<String>,
    /// Approach date upper bound.
    pub end_date: Option<String>,
    /// Distance lower bound in au.
    pub distance_min: Option<String>,
    /// Distance upper bound in au.
    pub distance_max: Option<String>,
    /// Velocity lower bound in km/s.
    pub velocity_min: Option<String>,
    /// Velocity upper bound in km/s.
    pub velocity_max: Option<String>,
    /// Diameter lower bound in km.
    pub diameter_min: Option<String>,
    /// Diameter upper bound in km.
    pub diameter_max: Option<String>,
    /// Required hazard flag of the linked object.
    pub hazardous: Option<String>,
}

impl RawQueryFilters {
    /// Parse every supplied bound.
    ///
    /// # Errors
    ///
    /// Returns the first [`FilterError`] encountered.
    pub fn parse(&self) -> Result<QueryFilters, FilterError> {
        Ok(QueryFilters {
            date: date_bound("date", self.date.as_deref())?,
            start_date: date_bound("start_date", self.start_date.as_deref())?,
            end_date: date_bound("end_date", self.end_date.as_deref())?,
            distance_min: number_bound("distance_min", self.distance_min.as_deref())?,
            distance_max: number_bound("distance_max", self.distance_max.as_deref())?,
            velocity_min: number_bound("velocity_min", self.velocity_min.as_deref())?,
            velocity_max: number_bound("velocity_max", self.velocity_max.as_deref())?,
            diameter_min: number_bound("diameter_min", self.diameter_min.as_deref())?,
            diameter_max: number_bound("diameter_max", self.diameter_max.as_deref())?,
            hazardous: flag_bound("hazardous", self.hazardous.as_deref())?,
        })
    }
}

impl TryFrom<&RawQueryFilters> for QueryFilters {
    type Error = FilterError;

    fn try_from(raw: &RawQueryFilters) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}

fn date_bound(field: &'static str, value: Option<&str>) -> Result<Option<NaiveDate>, FilterError> {
    present(value)
        .map(|text| {
            parse_date(text).map_err(|source| FilterError::InvalidDate {
                field,
                value: text.to_owned(),
                source,
            })
        })
        .transpose()
}

fn number_bound(field: &'static str, value: Option<&str>) -> Result<Option<f64>, FilterError> {
    present(value)
        .map(|text| {
            text.parse::<f64>()
                .map_err(|source| FilterError::InvalidNumber {
                    field,
                    value: text.to_owned(),
                    source,
                })
        })
        .transpose()
}

fn flag_bound(field: &'static str, value: Option<&str>) -> Result<Option<bool>, FilterError> {
    present(value)
        .map(|text| match text.to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" => Ok(true),
            "false" | "no" | "n" => Ok(false),
            _ => Err(FilterError::InvalidFlag {
                field,
                value: text.to_owned(),
            }),
        })
        .transpose()
}

/// Validated predicates ordered cheapest-first.
///
/// The default set is empty and matches every approach.
///
/// # Examples
/// ```
/// use neo_core::{FilterSet, QueryFilters};
///
/// let filters = FilterSet::new(QueryFilters {
///     distance_min: Some(0.05),
///     distance_max: Some(0.1),
///     hazardous: Some(true),
///     ..QueryFilters::default()
/// })
/// .expect("finite bounds");
/// assert_eq!(filters.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    filters: Vec<ApproachFilter>,
}

impl FilterSet {
    /// Build the predicates described by `bounds`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::NonFinite`] for infinite or NaN numeric bounds.
    pub fn new(bounds: QueryFilters) -> Result<Self, FilterError> {
        let mut filters = Vec::new();
        let dates = [
            (Comparison::Equal, bounds.date),
            (Comparison::AtLeast, bounds.start_date),
            (Comparison::AtMost, bounds.end_date),
        ];
        filters.extend(dates.into_iter().filter_map(|(comparison, bound)| {
            bound.map(|date| ApproachFilter::Date { comparison, date })
        }));
        let numeric = [
            ("distance_min", Comparison::AtLeast, bounds.distance_min, Measure::Distance),
            ("distance_max", Comparison::AtMost, bounds.distance_max, Measure::Distance),
            ("velocity_min", Comparison::AtLeast, bounds.velocity_min, Measure::Velocity),
            ("velocity_max", Comparison::AtMost, bounds.velocity_max, Measure::Velocity),
            ("diameter_min", Comparison::AtLeast, bounds.diameter_min, Measure::Diameter),
            ("diameter_max", Comparison::AtMost, bounds.diameter_max, Measure::Diameter),
        ];
        for (field, comparison, bound, measure) in numeric {
            let Some(value) = bound else {
                continue;
            };
            if !value.is_finite() {
                return Err(FilterError::NonFinite { field, value });
            }
            filters.push(measure.filter(comparison, value));
        }
        if let Some(hazardous) = bounds.hazardous {
            filters.push(ApproachFilter::Hazardous(hazardous));
        }
        Ok(Self::from_filters(filters))
    }

    /// Parse textual bounds and build the predicates.
    ///
    /// # Errors
    ///
    /// Returns a [`FilterError`] for any malformed bound.
    pub fn from_raw(raw: &RawQueryFilters) -> Result<Self, FilterError> {
        Self::new(raw.parse()?)
    }

    /// Wrap predicates that were assembled by hand.
    #[must_use]
    pub fn from_filters(mut filters: Vec<ApproachFilter>) -> Self {
        filters.sort_by_key(ApproachFilter::cost);
        Self { filters }
    }

    /// Predicates in evaluation order.
    #[must_use]
    pub fn filters(&self) -> &[ApproachFilter] {
        &self.filters
    }

    /// Number of predicates.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether the set matches every approach.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Whether the candidate satisfies every predicate.
    #[must_use]
    pub fn matches(&self, candidate: &LinkedApproach<'_>) -> bool {
        self.filters.iter().all(|filter| filter.matches(candidate))
    }
}

#[derive(Debug, Clone, Copy)]
enum Measure {
    Distance,
    Velocity,
    Diameter,
}

impl Measure {
    const fn filter(self, comparison: Comparison, value: f64) -> ApproachFilter {
        match self {
            Self::Distance => ApproachFilter::Distance { comparison, value },
            Self::Velocity => ApproachFilter::Velocity { comparison, value },
            Self::Diameter => ApproachFilter::Diameter { comparison, value },
        }
    }
}

/// Lazy iterator over the approaches matching a [`FilterSet`].
///
/// Created by [`NeoDatabase::query`]. Yields approaches in input order.
#[derive(Debug, Clone)]
pub struct Matches<'a> {
    db: &'a NeoDatabase,
    filters: &'a FilterSet,
    remaining: slice::Iter<'a, CloseApproach>,
}

impl<'a> Matches<'a> {
    pub(crate) fn new(db: &'a NeoDatabase, filters: &'a FilterSet) -> Self {
        Self {
            db,
            filters,
            remaining: db.approach_slice().iter(),
        }
    }
}

impl<'a> Iterator for Matches<'a> {
    type Item = LinkedApproach<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let db = self.db;
        let filters = self.filters;
        self.remaining
            .by_ref()
            .map(|approach| db.linked(approach))
            .find(|candidate| filters.matches(candidate))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.remaining.size_hint().1)
    }
}

impl FusedIterator for Matches<'_> {}

/// Yield at most `max` items; `None` or `Some(0)` means no limit.
///
/// # Examples
/// ```
/// use neo_core::filter::limit;
///
/// assert_eq!(limit(1..=5, Some(2)).collect::<Vec<_>>(), [1, 2]);
/// assert_eq!(limit(1..=3, Some(0)).count(), 3);
/// assert_eq!(limit(1..=3, None).count(), 3);
/// ```
pub fn limit<I: IntoIterator>(items: I, max: Option<usize>) -> std::iter::Take<I::IntoIter> {
    let cap = max.filter(|count| *count > 0).unwrap_or(usize::MAX);
    items.into_iter().take(cap)
}
