//! Behavioural tests for the dataset loaders and result writers.
#![expect(
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic,
    reason = "behaviour steps should fail fast when setup breaks"
)]

use camino::Utf8PathBuf;
use neo_core::{FilterSet, NeoDatabase, QueryFilters};
use neo_data::{ExtractError, load_database, write_results};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;
use std::cell::RefCell;
use tempfile::TempDir;

type LoadResultCell = RefCell<Option<Result<NeoDatabase, ExtractError>>>;

#[fixture]
fn working_dir() -> TempDir {
    TempDir::new().expect("temporary directory")
}

#[derive(Debug, Default)]
struct LoadContext {
    sources: RefCell<Option<(Utf8PathBuf, Utf8PathBuf)>>,
    loaded: LoadResultCell,
    export: RefCell<Option<Utf8PathBuf>>,
}

#[fixture]
fn load_context() -> LoadContext {
    LoadContext::default()
}

fn fixture_path(name: &str) -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn utf8_dir(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir")
}

fn with_database<T>(ctx: &LoadContext, f: impl FnOnce(&NeoDatabase) -> T) -> T {
    let loaded = ctx.loaded.borrow();
    let db = loaded
        .as_ref()
        .expect("load attempted")
        .as_ref()
        .expect("database loaded");
    f(db)
}

fn export(ctx: &LoadContext, dir: &TempDir, relative: &str, filters: QueryFilters) {
    let target = utf8_dir(dir).join(relative);
    let filters = FilterSet::new(filters).expect("valid filters");
    with_database(ctx, |db| {
        write_results(&target, db.query(&filters)).expect("export results");
    });
    *ctx.export.borrow_mut() = Some(target);
}

fn exported(ctx: &LoadContext) -> String {
    let path = ctx.export.borrow().clone().expect("export written");
    std::fs::read_to_string(path).expect("read export")
}

#[given("the bundled NEO and close-approach fixtures")]
fn bundled_fixtures(#[from(load_context)] ctx: &LoadContext) {
    *ctx.sources.borrow_mut() = Some((fixture_path("neos.csv"), fixture_path("cad.json")));
}

#[given("a NEO file path that does not exist")]
fn missing_neo_file(
    #[from(load_context)] ctx: &LoadContext,
    #[from(working_dir)] dir: &TempDir,
) {
    *ctx.sources.borrow_mut() = Some((utf8_dir(dir).join("absent.csv"), fixture_path("cad.json")));
}

#[when("I load the database")]
fn load(#[from(load_context)] ctx: &LoadContext) {
    let (neo_path, cad_path) = ctx.sources.borrow().clone().expect("sources chosen");
    *ctx.loaded.borrow_mut() = Some(load_database(&neo_path, &cad_path));
}

#[when("I export hazardous approaches to reports/hazardous.json")]
fn export_hazardous(
    #[from(load_context)] ctx: &LoadContext,
    #[from(working_dir)] dir: &TempDir,
) {
    let filters = QueryFilters {
        hazardous: Some(true),
        ..QueryFilters::default()
    };
    export(ctx, dir, "reports/hazardous.json", filters);
}

#[when("I export approaches closer than 0.1 au to close.csv")]
fn export_close(#[from(load_context)] ctx: &LoadContext, #[from(working_dir)] dir: &TempDir) {
    let filters = QueryFilters {
        distance_max: Some(0.1),
        ..QueryFilters::default()
    };
    export(ctx, dir, "close.csv", filters);
}

#[then("3 objects and 4 approaches are loaded")]
fn counts_loaded(#[from(load_context)] ctx: &LoadContext) {
    with_database(ctx, |db| {
        assert_eq!(db.neo_count(), 3);
        assert_eq!(db.approach_count(), 4);
        let summary = db.link_summary();
        assert_eq!(summary.linked, 3);
        assert_eq!(summary.unresolved, 1);
    });
}

#[then("the approach to 2019 XY is unlinked")]
fn orphan_unlinked(#[from(load_context)] ctx: &LoadContext) {
    with_database(ctx, |db| {
        let orphan = db
            .approaches()
            .find(|linked| linked.approach().designation() == "2019 XY")
            .expect("orphan retained");
        assert!(orphan.neo().is_none());
        let eros = db.get_neo_by_name("Eros").expect("Eros indexed");
        assert_eq!(db.approaches_of(eros).count(), 1);
    });
}

#[then("the export lists only Apophis")]
fn export_lists_apophis(#[from(load_context)] ctx: &LoadContext) {
    let value: Value = serde_json::from_str(&exported(ctx)).expect("valid JSON export");
    let entries = value.as_array().expect("array export");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["neo"]["name"], "Apophis");
    assert_eq!(entries[0]["neo"]["potentially_hazardous"], true);
    assert_eq!(entries[0]["datetime_utc"], "2029-04-13 21:46");
}

#[then("the CSV export has 3 data rows")]
fn csv_rows(#[from(load_context)] ctx: &LoadContext) {
    assert_eq!(exported(ctx).lines().count(), 4);
}

#[then("the unlinked row has blank object columns")]
fn csv_orphan_row(#[from(load_context)] ctx: &LoadContext) {
    let text = exported(ctx);
    let orphan = text
        .lines()
        .find(|line| line.contains("2019 XY"))
        .expect("orphan row exported");
    assert_eq!(orphan, "2020-02-20 12:00,0.0801,9.1,2019 XY,,,");
}

#[then("loading fails naming the missing file")]
fn load_fails(#[from(load_context)] ctx: &LoadContext) {
    let loaded = ctx.loaded.borrow();
    match loaded.as_ref().expect("load attempted") {
        Err(ExtractError::Open { path, .. }) => {
            assert_eq!(path.file_name(), Some("absent.csv"));
            assert!(path.is_absolute());
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected a missing file error"),
    }
}

macro_rules! register_scenario {
    ($name:ident, $index:literal) => {
        #[scenario(path = "tests/features/load_and_export.feature", index = $index)]
        fn $name(#[from(load_context)] context: LoadContext, working_dir: TempDir) {
            let _ = (context, working_dir);
        }
    };
}

register_scenario!(fixtures_are_loaded_and_linked, 0);
register_scenario!(hazardous_approaches_export_as_json, 1);
register_scenario!(close_approaches_export_as_csv, 2);
register_scenario!(missing_neo_file_is_reported, 3);
