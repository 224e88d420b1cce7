//! Behavioural coverage for preparing the dataset.

use std::cell::RefCell;

use camino::Utf8PathBuf;
use coverage_core::{CoverageSource, PostcodeKey};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

use super::super::test_support::{StubArchiveSource, block_on_for_tests, zip_archive};
use super::super::{DatasetError, DatasetManager, EditionTable, SetupReport};

#[derive(Default)]
struct SetupContext {
    dir: RefCell<Option<TempDir>>,
    manager: RefCell<Option<DatasetManager>>,
    source: RefCell<Option<StubArchiveSource>>,
    outcome: RefCell<Option<Result<SetupReport, DatasetError>>>,
}

#[fixture]
fn setup_context() -> SetupContext {
    SetupContext::default()
}

fn manager(ctx: &SetupContext) -> DatasetManager {
    ctx.manager
        .borrow()
        .as_ref()
        .cloned()
        .unwrap_or_else(|| panic!("data directory must be prepared"))
}

#[given("an empty data directory")]
fn empty_data_dir(#[from(setup_context)] ctx: &SetupContext) {
    let dir = TempDir::new().unwrap_or_else(|err| panic!("failed to create temp dir: {err}"));
    let data_dir = Utf8PathBuf::from_path_buf(dir.path().join("data"))
        .unwrap_or_else(|path| panic!("non-UTF-8 temp path {path:?}"));
    let editions = EditionTable::empty().with_edition("2023", "https://example.org/2023.zip");
    *ctx.manager.borrow_mut() = Some(DatasetManager::new(data_dir).with_editions(editions));
    *ctx.dir.borrow_mut() = Some(dir);
}

#[given("an archive source serving a coverage CSV")]
fn archive_source(#[from(setup_context)] ctx: &SetupContext) {
    let archive = zip_archive(&[(
        "2023_mobile_pc_r01.csv",
        "postcode,ee_voice,ee_4g\nSW1A 1AA,1.0,0.98\n",
    )]);
    *ctx.source.borrow_mut() = Some(StubArchiveSource::new(archive));
}

#[when("I set up edition 2023")]
fn set_up_2023(#[from(setup_context)] ctx: &SetupContext) {
    run_setup(ctx, "2023");
}

#[when("I set up edition 1999")]
fn set_up_1999(#[from(setup_context)] ctx: &SetupContext) {
    run_setup(ctx, "1999");
}

fn run_setup(ctx: &SetupContext, edition: &str) {
    let manager = manager(ctx);
    let source_borrow = ctx.source.borrow();
    let source = source_borrow
        .as_ref()
        .unwrap_or_else(|| panic!("archive source must be initialised"));
    let outcome = block_on_for_tests(manager.setup(source, edition, false));
    *ctx.outcome.borrow_mut() = Some(outcome);
}

#[then("the raw CSV for 2023 is retained")]
fn csv_retained(#[from(setup_context)] ctx: &SetupContext) {
    let borrow = ctx.outcome.borrow();
    let report = match borrow.as_ref() {
        Some(Ok(report)) => report,
        Some(Err(err)) => panic!("setup should succeed: {err}"),
        None => panic!("setup outcome must be captured"),
    };
    assert!(report.csv_path.as_std_path().is_file());
    assert_eq!(report.csv_path, manager(ctx).csv_path("2023"));
}

#[then("postcode sw1a 1aa resolves to a coverage row")]
fn postcode_resolves(#[from(setup_context)] ctx: &SetupContext) {
    let row = match manager(ctx).query_postcode(&PostcodeKey::normalise("sw1a 1aa")) {
        Ok(Some(row)) => row,
        Ok(None) => panic!("expected a coverage row"),
        Err(err) => panic!("query failed: {err}"),
    };
    assert_eq!(row.get("ee_4g"), Some("0.98"));
}

#[then("setup fails with an unknown edition error")]
fn unknown_edition(#[from(setup_context)] ctx: &SetupContext) {
    let borrow = ctx.outcome.borrow();
    match borrow.as_ref() {
        Some(Err(DatasetError::UnknownEdition { edition, .. })) => assert_eq!(edition, "1999"),
        Some(Err(err)) => panic!("unexpected error variant: {err}"),
        Some(Ok(_)) => panic!("expected setup to fail"),
        None => panic!("setup outcome must be captured"),
    }
}

#[then("no download was attempted")]
fn no_download(#[from(setup_context)] ctx: &SetupContext) {
    let calls = ctx.source.borrow().as_ref().map_or(0, StubArchiveSource::calls);
    assert_eq!(calls, 0);
}

macro_rules! register_scenario {
    ($name:ident, $index:literal) => {
        #[scenario(path = "tests/features/setup_dataset.feature", index = $index)]
        fn $name(setup_context: SetupContext) {
            let _ = setup_context;
        }
    };
}

register_scenario!(building_the_store_from_a_downloaded_edition, 0);
register_scenario!(rejecting_an_unknown_edition, 1);
