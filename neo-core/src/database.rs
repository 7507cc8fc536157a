//! The linked, in-memory NEO database.
//!
//! [`NeoDatabase`] owns both flat collections. Building it indexes the
//! objects by designation and by name, then walks the approaches once to
//! resolve each foreign-key designation. Resolution fills the object's
//! approach list and the approach's back-reference in the same pass, so the
//! joined structure is complete by the time the constructor returns.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use log::{debug, info, warn};
use thiserror::Error;

use crate::filter::{FilterSet, Matches};
use crate::model::{ApproachId, CloseApproach, NearEarthObject, NeoId};

/// Errors raised while building a [`NeoDatabase`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DatabaseError {
    /// Two objects share a primary designation.
    #[error("duplicate NEO designation {designation:?}")]
    DuplicateDesignation {
        /// The repeated designation.
        designation: String,
    },
}

/// Counts describing the outcome of the link pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkSummary {
    /// Number of indexed objects.
    pub neos: usize,
    /// Number of close approaches, linked or not.
    pub approaches: usize,
    /// Approaches whose designation resolved to an object.
    pub linked: usize,
    /// Approaches whose designation matched no object.
    pub unresolved: usize,
}

/// A close approach together with the object it resolved to.
///
/// Only a [`NeoDatabase`] hands these out, so the pairing always reflects
/// the link pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkedApproach<'a> {
    approach: &'a CloseApproach,
    neo: Option<&'a NearEarthObject>,
}

impl<'a> LinkedApproach<'a> {
    /// The approach itself.
    #[must_use]
    pub const fn approach(&self) -> &'a CloseApproach {
        self.approach
    }

    /// The linked object; `None` when the designation matched no object.
    #[must_use]
    pub const fn neo(&self) -> Option<&'a NearEarthObject> {
        self.neo
    }

    /// Display name of the approaching object.
    ///
    /// Falls back to the bare designation for unlinked approaches.
    #[must_use]
    pub fn neo_full_name(&self) -> String {
        self.neo.map_or_else(
            || self.approach.designation().to_owned(),
            NearEarthObject::full_name,
        )
    }
}

impl fmt::Display for LinkedApproach<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.approach.write_summary(f, &self.neo_full_name())
    }
}

/// Near-Earth objects and close approaches linked into one structure.
///
/// # Examples
/// ```
/// use neo_core::{ApproachRecord, CloseApproach, FilterSet, NearEarthObject, NeoDatabase, NeoRecord};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let neo = NearEarthObject::from_record(NeoRecord::new("433").with_name("Eros"))?;
/// let approach = CloseApproach::from_record(ApproachRecord::new(
///     "433",
///     "2020-Jan-01 00:00",
///     "0.15",
///     "5.2",
/// ))?;
/// let db = NeoDatabase::new(vec![neo], vec![approach])?;
///
/// let eros = db.get_neo_by_designation("433").expect("indexed");
/// let first = db.approaches_of(eros).next().expect("linked");
/// assert_eq!(db.neo_of(first).and_then(|n| n.name.as_deref()), Some("Eros"));
///
/// let filters = FilterSet::default();
/// assert_eq!(db.query(&filters).count(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct NeoDatabase {
    neos: Vec<NearEarthObject>,
    approaches: Vec<CloseApproach>,
    by_designation: HashMap<String, NeoId>,
    by_name: HashMap<String, NeoId>,
}

impl NeoDatabase {
    /// Index the objects and link every approach to its object.
    ///
    /// Approaches keep their input order, both in the flat collection and in
    /// each object's approach list. Approaches whose designation matches no
    /// object are retained unlinked.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::DuplicateDesignation`] when two objects share
    /// a designation.
    pub fn new(
        neos: Vec<NearEarthObject>,
        approaches: Vec<CloseApproach>,
    ) -> Result<Self, DatabaseError> {
        let mut db = Self {
            neos,
            approaches,
            by_designation: HashMap::new(),
            by_name: HashMap::new(),
        };
        db.index_designations()?;
        db.index_names();
        db.link_approaches();
        Ok(db)
    }

    fn index_designations(&mut self) -> Result<(), DatabaseError> {
        self.by_designation.reserve(self.neos.len());
        for (position, neo) in self.neos.iter().enumerate() {
            match self.by_designation.entry(neo.designation.clone()) {
                Entry::Occupied(_) => {
                    return Err(DatabaseError::DuplicateDesignation {
                        designation: neo.designation.clone(),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(NeoId(position));
                }
            }
        }
        debug!("indexed {} NEO designations", self.by_designation.len());
        Ok(())
    }

    fn index_names(&mut self) {
        for (position, neo) in self.neos.iter().enumerate() {
            let Some(name) = &neo.name else {
                continue;
            };
            match self.by_name.entry(name.clone()) {
                Entry::Occupied(existing) => {
                    warn!(
                        "NEO name {name:?} is shared by {} and {}; keeping the first",
                        self.neos
                            .get(existing.get().index())
                            .map_or("<unknown>", |first| first.designation.as_str()),
                        neo.designation
                    );
                }
                Entry::Vacant(slot) => {
                    slot.insert(NeoId(position));
                }
            }
        }
        debug!("indexed {} NEO names", self.by_name.len());
    }

    fn link_approaches(&mut self) {
        let mut unresolved = 0_usize;
        for (position, approach) in self.approaches.iter_mut().enumerate() {
            let target = self
                .by_designation
                .get(approach.designation())
                .copied()
                .and_then(|id| self.neos.get_mut(id.index()).map(|neo| (id, neo)));
            match target {
                Some((id, neo)) => {
                    approach.link(id);
                    neo.push_approach(ApproachId(position));
                }
                None => {
                    debug!(
                        "close approach {position} references unknown NEO {:?}",
                        approach.designation()
                    );
                    unresolved += 1;
                }
            }
        }
        if unresolved > 0 {
            warn!(
                "{unresolved} of {} close approaches reference unknown NEOs",
                self.approaches.len()
            );
        }
        info!(
            "linked {} close approaches to {} NEOs",
            self.approaches.len() - unresolved,
            self.neos.len()
        );
    }

    /// Look up an object by its exact primary designation.
    #[must_use]
    pub fn get_neo_by_designation(&self, designation: &str) -> Option<&NearEarthObject> {
        self.by_designation
            .get(designation)
            .and_then(|id| self.neo(*id))
    }

    /// Look up an object by its exact IAU name.
    ///
    /// Only named objects are indexed, so an empty query never matches.
    #[must_use]
    pub fn get_neo_by_name(&self, name: &str) -> Option<&NearEarthObject> {
        if name.is_empty() {
            return None;
        }
        self.by_name.get(name).and_then(|id| self.neo(*id))
    }

    /// Stream the approaches matching every filter, in input order.
    ///
    /// The iterator borrows the database and evaluates lazily. Calling
    /// `query` again starts a fresh scan.
    #[must_use]
    pub fn query<'a>(&'a self, filters: &'a FilterSet) -> Matches<'a> {
        Matches::new(self, filters)
    }

    /// Resolve an object handle.
    #[must_use]
    pub fn neo(&self, id: NeoId) -> Option<&NearEarthObject> {
        self.neos.get(id.index())
    }

    /// Resolve an approach handle.
    #[must_use]
    pub fn approach(&self, id: ApproachId) -> Option<&CloseApproach> {
        self.approaches.get(id.index())
    }

    /// Object that the approach was linked to, if any.
    #[must_use]
    pub fn neo_of(&self, approach: &CloseApproach) -> Option<&NearEarthObject> {
        approach.neo_id().and_then(|id| self.neo(id))
    }

    /// Approaches of the given object in input order.
    pub fn approaches_of<'a>(
        &'a self,
        neo: &'a NearEarthObject,
    ) -> impl Iterator<Item = &'a CloseApproach> + 'a {
        neo.approach_ids()
            .iter()
            .filter_map(move |id| self.approach(*id))
    }

    /// All objects in input order.
    #[must_use]
    pub fn neos(&self) -> impl ExactSizeIterator<Item = &NearEarthObject> + '_ {
        self.neos.iter()
    }

    /// All approaches in input order, paired with their linked object.
    #[must_use]
    pub fn approaches(&self) -> impl ExactSizeIterator<Item = LinkedApproach<'_>> + '_ {
        self.approaches.iter().map(|approach| self.linked(approach))
    }

    pub(crate) fn approach_slice(&self) -> &[CloseApproach] {
        &self.approaches
    }

    /// Pair an approach with the object it was linked to.
    #[must_use]
    pub fn linked<'a>(&'a self, approach: &'a CloseApproach) -> LinkedApproach<'a> {
        LinkedApproach {
            approach,
            neo: self.neo_of(approach),
        }
    }

    /// Number of indexed objects.
    #[must_use]
    pub const fn neo_count(&self) -> usize {
        self.neos.len()
    }

    /// Number of close approaches, linked or not.
    #[must_use]
    pub const fn approach_count(&self) -> usize {
        self.approaches.len()
    }

    /// Whether the database holds neither objects nor approaches.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.neos.is_empty() && self.approaches.is_empty()
    }

    /// Counts describing how many approaches were linked.
    #[must_use]
    pub fn link_summary(&self) -> LinkSummary {
        let linked = self
            .approaches
            .iter()
            .filter(|approach| approach.is_linked())
            .count();
        LinkSummary {
            neos: self.neos.len(),
            approaches: self.approaches.len(),
            linked,
            unresolved: self.approaches.len() - linked,
        }
    }
}
