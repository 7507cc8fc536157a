//! Dataset builders shared by unit tests, behaviour tests and benchmarks.
#![expect(
    clippy::expect_used,
    reason = "fixtures are hard-coded and should fail fast if they drift"
)]

use crate::{ApproachRecord, CloseApproach, NearEarthObject, NeoDatabase, NeoRecord};

/// Build an object from literal fields; an empty string means "unknown".
///
/// # Panics
///
/// Panics if the fields do not form a valid object.
#[must_use]
pub fn neo(designation: &str, name: &str, diameter: &str, hazardous: &str) -> NearEarthObject {
    NearEarthObject::from_record(NeoRecord {
        designation: Some(designation.to_owned()),
        name: Some(name.to_owned()),
        diameter: Some(diameter.to_owned()),
        hazardous: Some(hazardous.to_owned()),
    })
    .expect("fixture NEO should be valid")
}

/// Build an approach from literal fields.
///
/// # Panics
///
/// Panics if the fields do not form a valid approach.
#[must_use]
pub fn approach(designation: &str, time: &str, distance: &str, velocity: &str) -> CloseApproach {
    CloseApproach::from_record(ApproachRecord::new(designation, time, distance, velocity))
        .expect("fixture approach should be valid")
}

/// A small dataset with named, unnamed, hazardous and orphaned entries.
///
/// | designation | name    | diameter | hazardous | approaches |
/// |-------------|---------|----------|-----------|------------|
/// | 433         | Eros    | 16.84    | no        | 2          |
/// | 99942       | Apophis | 0.37     | yes       | 2          |
/// | 2020 AB     | -       | unknown  | no        | 1          |
/// | 3122        | Florence| 4.9      | yes       | 0          |
///
/// One further approach references the unknown designation `999`.
///
/// # Panics
///
/// Panics if the literal fixture stops linking.
#[must_use]
pub fn sample_database() -> NeoDatabase {
    let neos = vec![
        neo("433", "Eros", "16.84", "N"),
        neo("99942", "Apophis", "0.37", "Y"),
        neo("2020 AB", "", "", "N"),
        neo("3122", "Florence", "4.9", "Y"),
    ];
    let approaches = vec![
        approach("433", "1900-Jan-01 00:11", "0.4", "3.8"),
        approach("99942", "2020-Jan-01 12:30", "0.05", "7.4"),
        approach("2020 AB", "2020-Jan-01 23:59", "0.1", "12.0"),
        approach("999", "2020-Jan-03 00:00", "0.07", "3.1"),
        approach("433", "2020-Mar-15 06:00", "0.15", "5.2"),
        approach("99942", "2029-Apr-13 21:46", "0.000254", "7.42"),
    ];
    NeoDatabase::new(neos, approaches).expect("fixture designations are unique")
}

/// Position of `index` within a repeating cycle of `period` values.
///
/// An empty cycle always yields zero.
const fn cycle(index: usize, period: usize) -> usize {
    let Some(position) = index.checked_rem(period) else {
        return 0;
    };
    position
}

/// A synthetic dataset for benchmarks and property checks.
///
/// Objects are named `N0`, `N1`, ...; every tenth approach references an
/// unknown designation.
///
/// # Panics
///
/// Panics if the generated designations collide, which they cannot.
#[must_use]
pub fn synthetic_database(neo_count: usize, approaches_per_neo: usize) -> NeoDatabase {
    let neos = (0..neo_count)
        .map(|index| {
            let hazardous = if cycle(index, 7) == 0 { "Y" } else { "N" };
            let diameter = if cycle(index, 5) == 0 {
                String::new()
            } else {
                format!("{}.{}", cycle(index, 40), cycle(index, 10))
            };
            neo(&format!("N{index}"), "", &diameter, hazardous)
        })
        .collect();
    let total = neo_count.saturating_mul(approaches_per_neo);
    let approaches = (0..total)
        .map(|index| {
            let designation = if cycle(index, 10) == 9 {
                format!("missing-{index}")
            } else {
                format!("N{}", cycle(index, neo_count))
            };
            let day = cycle(index, 28).saturating_add(1);
            let distance = format!("0.{:04}", cycle(index, 5000));
            let velocity = format!("{}.5", cycle(index, 30));
            approach(
                &designation,
                &format!("2020-Jan-{day:02} 00:00"),
                &distance,
                &velocity,
            )
        })
        .collect();
    NeoDatabase::new(neos, approaches).expect("synthetic designations are unique")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 7, 0)]
    #[case(13, 5, 3)]
    #[case(4, 0, 0)]
    fn cycle_wraps_and_tolerates_empty_periods(
        #[case] index: usize,
        #[case] period: usize,
        #[case] expected: usize,
    ) {
        assert_eq!(cycle(index, period), expected);
    }

    #[rstest]
    fn synthetic_database_leaves_every_tenth_approach_unlinked() {
        let db = synthetic_database(4, 5);
        let summary = db.link_summary();
        assert_eq!(summary.neos, 4);
        assert_eq!(summary.approaches, 20);
        assert_eq!(summary.unresolved, 2);
    }
}
