//! Facade crate for NEO Explorer.
//!
//! This crate re-exports the core domain, linker and query types and, behind
//! the `data` feature, the file adapters for the NASA datasets.

#![forbid(unsafe_code)]

pub use neo_core::{
    ApproachFilter, ApproachId, ApproachRecord, CloseApproach, Comparison, DatabaseError,
    FilterError, FilterSet, LinkSummary, LinkedApproach, Matches, ModelError, NearEarthObject,
    NeoDatabase, NeoId, NeoRecord, QueryFilters, RawQueryFilters, limit, time,
};

#[cfg(feature = "data")]
pub use neo_data::{
    ExtractError, OutputFormat, WriteError, load_approaches, load_database, load_neos,
    write_results,
};
