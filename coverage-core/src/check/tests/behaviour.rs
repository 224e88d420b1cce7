//! Behavioural coverage for checking postcodes end to end.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::test_support::{StubCoverageSource, StubGeoLookup};
use crate::{CheckResult, CoverageChecker, NOT_IN_DATASET_NOTE, RawCoverageRow};

#[derive(Default)]
struct CheckContext {
    geocoder: RefCell<Option<StubGeoLookup>>,
    source: RefCell<Option<StubCoverageSource>>,
    checker: RefCell<Option<CoverageChecker<StubGeoLookup, StubCoverageSource>>>,
    result: RefCell<Option<CheckResult>>,
}

#[fixture]
fn check_context() -> CheckContext {
    CheckContext::default()
}

fn with_result<T>(ctx: &CheckContext, f: impl FnOnce(&CheckResult) -> T) -> T {
    let borrow = ctx.result.borrow();
    let result = borrow
        .as_ref()
        .unwrap_or_else(|| panic!("a postcode must be checked first"));
    f(result)
}

#[given("a geocoder that only knows SW1A 1AA")]
fn geocoder_knows_westminster(#[from(check_context)] ctx: &CheckContext) {
    *ctx.geocoder.borrow_mut() = Some(StubGeoLookup::accepting(["SW1A 1AA"]));
}

#[given("a geocoder that knows EC1A 1BB")]
fn geocoder_knows_city(#[from(check_context)] ctx: &CheckContext) {
    *ctx.geocoder.borrow_mut() = Some(StubGeoLookup::accepting(["EC1A 1BB"]));
}

#[given("a coverage dataset holding SW1A 1AA")]
fn dataset_holds_westminster(#[from(check_context)] ctx: &CheckContext) {
    *ctx.source.borrow_mut() = Some(StubCoverageSource::with_rows([RawCoverageRow::from([
        ("postcode", "SW1A1AA"),
        ("ee_4g", "0.9"),
    ])]));
}

#[when("I check postcode ZZ99 9ZZ")]
fn check_unknown(#[from(check_context)] ctx: &CheckContext) {
    run_check(ctx, "ZZ99 9ZZ");
}

#[when("I check postcode EC1A 1BB")]
fn check_city(#[from(check_context)] ctx: &CheckContext) {
    run_check(ctx, "EC1A 1BB");
}

fn run_check(ctx: &CheckContext, postcode: &str) {
    let geocoder = ctx
        .geocoder
        .borrow_mut()
        .take()
        .unwrap_or_else(|| panic!("geocoder must be configured"));
    let source = ctx
        .source
        .borrow_mut()
        .take()
        .unwrap_or_else(|| panic!("coverage dataset must be configured"));
    let checker = CoverageChecker::new(geocoder, source);
    *ctx.result.borrow_mut() = Some(checker.check(postcode));
    *ctx.checker.borrow_mut() = Some(checker);
}

#[then("the result is marked invalid")]
fn result_invalid(#[from(check_context)] ctx: &CheckContext) {
    with_result(ctx, |result| {
        assert!(!result.valid);
        assert!(result.error.is_some());
    });
}

#[then("the result is marked valid")]
fn result_valid(#[from(check_context)] ctx: &CheckContext) {
    with_result(ctx, |result| {
        assert!(result.valid);
        assert!(result.geographic.is_some());
    });
}

#[then("the result carries no coverage summary")]
fn no_summary(#[from(check_context)] ctx: &CheckContext) {
    with_result(ctx, |result| assert!(result.mobile.is_none()));
}

#[then("the coverage dataset was never queried")]
fn dataset_untouched(#[from(check_context)] ctx: &CheckContext) {
    let borrow = ctx.checker.borrow();
    let checker = borrow
        .as_ref()
        .unwrap_or_else(|| panic!("checker must be built"));
    assert_eq!(checker.source().calls(), 0);
}

#[then("the result notes the postcode is not in the dataset")]
fn not_in_dataset(#[from(check_context)] ctx: &CheckContext) {
    with_result(ctx, |result| {
        assert!(result.mobile.is_none());
        assert_eq!(result.note.as_deref(), Some(NOT_IN_DATASET_NOTE));
    });
}

macro_rules! register_scenario {
    ($name:ident, $index:literal) => {
        #[scenario(path = "tests/features/check_postcodes.feature", index = $index)]
        fn $name(check_context: CheckContext) {
            let _ = check_context;
        }
    };
}

register_scenario!(rejecting_a_postcode_the_geocoder_cannot_resolve, 0);
register_scenario!(reporting_a_postcode_missing_from_the_dataset, 1);
