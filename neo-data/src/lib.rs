//! File adapters for NEO Explorer.
//!
//! Responsibilities:
//! - Read the NASA `neos.csv` and `cad.json` datasets into `neo-core`
//!   entities and link them into a [`NeoDatabase`](neo_core::NeoDatabase).
//! - Export query results as CSV or JSON.
//! - Provide capability-based file helpers shared with the CLI.
//!
//! Boundaries:
//! - Value normalisation and linking rules live in `neo-core`.
//! - Errors name the file and, for row failures, the record index.

#![forbid(unsafe_code)]

pub mod extract;
pub mod fs;
pub mod write;

pub use extract::{
    ExtractError, load_approaches, load_database, load_neos, read_approaches, read_neos,
};
pub use write::{OutputFormat, WriteError, write_results, write_to_csv, write_to_json};
