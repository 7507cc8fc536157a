//! Behavioural tests for linking and querying the NEO database.
#![expect(
    clippy::expect_used,
    clippy::panic,
    reason = "behaviour steps should fail fast when setup breaks"
)]

use neo_core::{
    ApproachRecord, CloseApproach, DatabaseError, FilterSet, NearEarthObject, NeoDatabase,
    NeoRecord, QueryFilters,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

type Inputs = (Vec<NearEarthObject>, Vec<CloseApproach>);

fn neo(record: NeoRecord) -> NearEarthObject {
    NearEarthObject::from_record(record).expect("valid NEO record")
}

fn approach(designation: &str, time: &str, distance: &str) -> CloseApproach {
    CloseApproach::from_record(ApproachRecord::new(designation, time, distance, "6.0"))
        .expect("valid approach record")
}

fn designations(db: &NeoDatabase, filters: &FilterSet) -> Vec<String> {
    db.query(filters)
        .map(|linked| linked.approach().designation().to_owned())
        .collect()
}

#[fixture]
fn inputs() -> RefCell<Inputs> {
    RefCell::new((Vec::new(), Vec::new()))
}

#[fixture]
fn built() -> RefCell<Option<Result<NeoDatabase, DatabaseError>>> {
    RefCell::new(None)
}

#[fixture]
fn results() -> RefCell<Vec<String>> {
    RefCell::new(Vec::new())
}

fn database(built: &RefCell<Option<Result<NeoDatabase, DatabaseError>>>) -> NeoDatabase {
    built
        .borrow()
        .as_ref()
        .expect("database build attempted")
        .clone()
        .expect("database built")
}

#[given("the object 433 named Eros and one approach on 2020-Jan-01")]
fn given_eros(#[from(inputs)] inputs: &RefCell<Inputs>) {
    *inputs.borrow_mut() = (
        vec![neo(NeoRecord::new("433")
            .with_name("Eros")
            .with_diameter("16.84")
            .with_hazardous("N"))],
        vec![approach("433", "2020-Jan-01 00:00", "0.15")],
    );
}

#[given("a hazardous object and an approach to the unknown designation 999")]
fn given_orphan(#[from(inputs)] inputs: &RefCell<Inputs>) {
    *inputs.borrow_mut() = (
        vec![neo(NeoRecord::new("99942")
            .with_name("Apophis")
            .with_hazardous("Y"))],
        vec![
            approach("99942", "2029-Apr-13 21:46", "0.000254"),
            approach("999", "2020-Jan-01 00:00", "0.2"),
        ],
    );
}

#[given("approaches at several distances")]
fn given_distances(#[from(inputs)] inputs: &RefCell<Inputs>) {
    *inputs.borrow_mut() = (
        vec![neo(NeoRecord::new("433")), neo(NeoRecord::new("1036"))],
        vec![
            approach("433", "2020-Jan-01 00:00", "0.04"),
            approach("1036", "2020-Jan-02 00:00", "0.1"),
            approach("433", "2020-Jan-03 00:00", "0.2"),
            approach("433", "2020-Jan-04 00:00", "0.05"),
            approach("1036", "2020-Jan-05 00:00", "0.07"),
        ],
    );
}

#[given("two objects sharing the designation 433")]
fn given_duplicates(#[from(inputs)] inputs: &RefCell<Inputs>) {
    *inputs.borrow_mut() = (
        vec![
            neo(NeoRecord::new("433").with_name("Eros")),
            neo(NeoRecord::new("433")),
        ],
        Vec::new(),
    );
}

#[when("I build the database")]
fn when_build(
    #[from(inputs)] inputs: &RefCell<Inputs>,
    #[from(built)] built: &RefCell<Option<Result<NeoDatabase, DatabaseError>>>,
) {
    let (neos, approaches) = inputs.take();
    *built.borrow_mut() = Some(NeoDatabase::new(neos, approaches));
}

#[when("I query for hazardous approaches")]
fn when_query_hazardous(
    #[from(built)] built: &RefCell<Option<Result<NeoDatabase, DatabaseError>>>,
    #[from(results)] results: &RefCell<Vec<String>>,
) {
    let db = database(built);
    let filters = FilterSet::new(QueryFilters {
        hazardous: Some(true),
        ..QueryFilters::default()
    })
    .expect("valid filters");
    *results.borrow_mut() = designations(&db, &filters);
}

#[when("I query for distances between 0.05 and 0.1 au")]
fn when_query_distance(
    #[from(built)] built: &RefCell<Option<Result<NeoDatabase, DatabaseError>>>,
    #[from(results)] results: &RefCell<Vec<String>>,
) {
    let db = database(built);
    let filters = FilterSet::new(QueryFilters {
        distance_min: Some(0.05),
        distance_max: Some(0.1),
        ..QueryFilters::default()
    })
    .expect("valid filters");
    let distances: Vec<String> = db
        .query(&filters)
        .map(|linked| linked.approach().distance.to_string())
        .collect();
    *results.borrow_mut() = distances;
}

#[then("the first approach of 433 belongs to Eros")]
fn then_linked_to_eros(
    #[from(built)] built: &RefCell<Option<Result<NeoDatabase, DatabaseError>>>,
) {
    let db = database(built);
    let eros = db.get_neo_by_designation("433").expect("433 indexed");
    let first = db.approaches_of(eros).next().expect("approach linked");
    let owner = db.neo_of(first).expect("back-reference set");
    assert_eq!(owner.name.as_deref(), Some("Eros"));
    assert_eq!(first.time_str(), "2020-01-01 00:00");
}

#[then("the approach to 999 is not returned")]
fn then_orphan_excluded(#[from(results)] results: &RefCell<Vec<String>>) {
    assert_eq!(*results.borrow(), ["99942"]);
}

#[then("an unfiltered query returns every approach")]
fn then_unfiltered_returns_all(
    #[from(built)] built: &RefCell<Option<Result<NeoDatabase, DatabaseError>>>,
) {
    let db = database(built);
    assert_eq!(designations(&db, &FilterSet::default()), ["99942", "999"]);
    let orphan = db
        .approaches()
        .find(|linked| linked.approach().designation() == "999")
        .expect("orphan retained");
    assert!(orphan.neo().is_none());
}

#[then("only the in-range approaches are returned in input order")]
fn then_distance_range(#[from(results)] results: &RefCell<Vec<String>>) {
    assert_eq!(*results.borrow(), ["0.1", "0.05", "0.07"]);
}

#[then("the build fails with a duplicate designation error")]
fn then_duplicate_rejected(
    #[from(built)] built: &RefCell<Option<Result<NeoDatabase, DatabaseError>>>,
) {
    let outcome = built.borrow();
    match outcome.as_ref().expect("database build attempted") {
        Err(DatabaseError::DuplicateDesignation { designation }) => {
            assert_eq!(designation, "433");
        }
        Ok(_) => panic!("expected duplicate designation error"),
    }
}

#[scenario(path = "tests/features/neo_database.feature", index = 0)]
fn scenario_linked_to_named_object(
    inputs: RefCell<Inputs>,
    built: RefCell<Option<Result<NeoDatabase, DatabaseError>>>,
    results: RefCell<Vec<String>>,
) {
    let _ = (inputs, built, results);
}

#[scenario(path = "tests/features/neo_database.feature", index = 1)]
fn scenario_unresolved_approach(
    inputs: RefCell<Inputs>,
    built: RefCell<Option<Result<NeoDatabase, DatabaseError>>>,
    results: RefCell<Vec<String>>,
) {
    let _ = (inputs, built, results);
}

#[scenario(path = "tests/features/neo_database.feature", index = 2)]
fn scenario_distance_range(
    inputs: RefCell<Inputs>,
    built: RefCell<Option<Result<NeoDatabase, DatabaseError>>>,
    results: RefCell<Vec<String>>,
) {
    let _ = (inputs, built, results);
}

#[scenario(path = "tests/features/neo_database.feature", index = 3)]
fn scenario_duplicate_designation(
    inputs: RefCell<Inputs>,
    built: RefCell<Option<Result<NeoDatabase, DatabaseError>>>,
    results: RefCell<Vec<String>>,
) {
    let _ = (inputs, built, results);
}
