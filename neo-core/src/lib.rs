//! Core domain model, linker and query engine for NEO Explorer.
//!
//! Responsibilities:
//! - Model near-Earth objects and their close approaches, normalising the
//!   quirks of the NASA datasets at construction time.
//! - Link approaches to objects in a single build pass and index objects by
//!   designation and by name.
//! - Answer point lookups and lazy, multi-predicate approach queries.
//!
//! Boundaries:
//! - No file formats or I/O (those live in `neo-data`).
//! - No global state; callers own the [`NeoDatabase`] value.
//!
//! # Examples
//!
//! ```
//! use neo_core::{
//!     ApproachRecord, CloseApproach, FilterSet, NearEarthObject, NeoDatabase, NeoRecord,
//!     RawQueryFilters,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let neos = vec![NearEarthObject::from_record(
//!     NeoRecord::new("99942").with_name("Apophis").with_hazardous("Y"),
//! )?];
//! let approaches = vec![CloseApproach::from_record(ApproachRecord::new(
//!     "99942",
//!     "2029-Apr-13 21:46",
//!     "0.000254",
//!     "7.42",
//! ))?];
//! let db = NeoDatabase::new(neos, approaches)?;
//!
//! let filters = FilterSet::from_raw(&RawQueryFilters {
//!     hazardous: Some("true".to_owned()),
//!     ..RawQueryFilters::default()
//! })?;
//! let hits: Vec<_> = db.query(&filters).collect();
//! assert_eq!(hits.len(), 1);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod database;
pub mod filter;
pub mod model;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod time;

pub use database::{DatabaseError, LinkSummary, LinkedApproach, NeoDatabase};
pub use filter::{
    ApproachFilter, Comparison, FilterError, FilterSet, Matches, QueryFilters, RawQueryFilters,
    limit,
};
pub use model::{
    ApproachId, ApproachRecord, CloseApproach, ModelError, NearEarthObject, NeoId, NeoRecord,
};
