//! Property tests for the link pass and the query engine.
#![expect(
    clippy::expect_used,
    reason = "generated records are valid by construction"
)]
#![expect(
    clippy::float_arithmetic,
    reason = "distance bounds are scaled from generated integers"
)]

use neo_core::{
    ApproachRecord, CloseApproach, FilterSet, NearEarthObject, NeoDatabase, NeoRecord,
    QueryFilters,
};
use proptest::prelude::*;

/// Up to `n` distinct designations and approaches referencing a wider range,
/// so that some approaches stay unresolved.
fn dataset() -> impl Strategy<Value = (Vec<usize>, Vec<(usize, u16)>)> {
    (1_usize..12).prop_flat_map(|neo_count| {
        let neos = Just((0..neo_count).collect::<Vec<_>>());
        let approaches = prop::collection::vec((0..neo_count + 3, 0_u16..1000), 0..40);
        (neos, approaches)
    })
}

fn build(neos: &[usize], approaches: &[(usize, u16)]) -> NeoDatabase {
    let neos = neos
        .iter()
        .map(|index| {
            NearEarthObject::from_record(
                NeoRecord::new(format!("D{index}")).with_name(format!("Name {index}")),
            )
            .expect("generated NEO")
        })
        .collect();
    let approaches = approaches
        .iter()
        .map(|(target, milli_au)| {
            CloseApproach::from_record(ApproachRecord::new(
                format!("D{target}"),
                "2020-Jan-01 00:00",
                format!("0.{milli_au:03}"),
                "1.0",
            ))
            .expect("generated approach")
        })
        .collect();
    NeoDatabase::new(neos, approaches).expect("generated designations are unique")
}

proptest! {
    #[test]
    fn every_object_is_found_by_designation_and_name((neos, approaches) in dataset()) {
        let db = build(&neos, &approaches);
        for neo in db.neos() {
            let by_designation = db.get_neo_by_designation(&neo.designation);
            prop_assert!(by_designation.is_some_and(|found| std::ptr::eq(found, neo)));
            let name = neo.name.as_deref().expect("generated objects are named");
            prop_assert!(db.get_neo_by_name(name).is_some_and(|found| std::ptr::eq(found, neo)));
        }
    }

    #[test]
    fn links_are_consistent_and_lossless((neos, approaches) in dataset()) {
        let db = build(&neos, &approaches);
        let summary = db.link_summary();
        let owned: usize = db.neos().map(|neo| neo.approach_ids().len()).sum();
        prop_assert_eq!(owned + summary.unresolved, approaches.len());
        prop_assert_eq!(summary.linked, owned);

        for linked in db.approaches() {
            if let Some(owner) = linked.neo() {
                prop_assert_eq!(&owner.designation, linked.approach().designation());
                prop_assert!(db
                    .approaches_of(owner)
                    .any(|candidate| std::ptr::eq(candidate, linked.approach())));
            }
        }
    }

    #[test]
    fn distance_queries_preserve_order((neos, approaches) in dataset(), low in 0_u16..1000, high in 0_u16..1000) {
        let db = build(&neos, &approaches);
        let min = f64::from(low) / 1000.0;
        let max = f64::from(high) / 1000.0;
        let filters = FilterSet::new(QueryFilters {
            distance_min: Some(min),
            distance_max: Some(max),
            ..QueryFilters::default()
        })
        .expect("finite bounds");

        let expected: Vec<_> = db
            .approaches()
            .filter(|linked| (min..=max).contains(&linked.approach().distance))
            .map(|linked| linked.approach() as *const CloseApproach)
            .collect();
        let actual: Vec<_> = db
            .query(&filters)
            .map(|linked| linked.approach() as *const CloseApproach)
            .collect();
        prop_assert_eq!(&actual, &expected);

        let again: Vec<_> = db
            .query(&filters)
            .map(|linked| linked.approach() as *const CloseApproach)
            .collect();
        prop_assert_eq!(actual, again);
    }
}
