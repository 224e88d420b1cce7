//! Rendering tests for check results and setup reports.

use coverage_core::{CheckResult, GeographicInfo, PostcodeKey, RawCoverageRow, interpret};
use coverage_data::SetupReport;
use rstest::{fixture, rstest};

use super::helpers::output_text;
use crate::render;

fn rule(width: usize) -> String {
    "─".repeat(width)
}

fn westminster() -> GeographicInfo {
    GeographicInfo {
        postcode: "SW1A 1AA".to_owned(),
        country: Some("England".to_owned()),
        region: Some("London".to_owned()),
        admin_district: Some("Westminster".to_owned()),
        latitude: Some(51.501_009),
        longitude: Some(-0.141_588),
        ..GeographicInfo::default()
    }
}

#[fixture]
fn covered_result() -> CheckResult {
    let row = RawCoverageRow::from([
        ("postcode", "SW1A1AA"),
        ("ee_voice", "0.95"),
        ("ee_4g", "0.8"),
        ("ee_5g", "0.1"),
    ]);
    CheckResult {
        postcode: PostcodeKey::normalise("SW1A 1AA"),
        valid: true,
        geographic: Some(westminster()),
        mobile: Some(interpret(&row)),
        ..CheckResult::default()
    }
}

fn render_text(results: &[CheckResult]) -> String {
    let mut buffer = Vec::new();
    render::write_results(&mut buffer, results).expect("render results");
    output_text(buffer)
}

#[rstest]
fn invalid_result_shows_only_the_error() {
    let result = CheckResult {
        postcode: PostcodeKey::normalise("ZZ99 9ZZ"),
        error: Some("Postcode lookup failed: not found".to_owned()),
        ..CheckResult::default()
    };
    let text = render_text(&[result]);
    let expected = format!(
        "\n{rule}\n  Postcode: ZZ999ZZ\n{rule}\n  ✗ Postcode lookup failed: not found\n",
        rule = rule(52)
    );
    assert_eq!(text, expected);
}

#[rstest]
fn noted_result_stops_after_the_note() {
    let result = CheckResult {
        postcode: PostcodeKey::normalise("SW1A 1AA"),
        valid: true,
        geographic: Some(westminster()),
        note: Some("Postcode not found in Ofcom mobile dataset.".to_owned()),
        ..CheckResult::default()
    };
    let text = render_text(&[result]);
    assert!(text.contains("  Region:   London\n"));
    assert!(text.contains("  District: Westminster\n"));
    assert!(text.contains("  Country:  England\n"));
    assert!(text.contains("  Lat/Lon:  51.501009, -0.141588\n"));
    assert!(text.ends_with("\n  Note: Postcode not found in Ofcom mobile dataset.\n"));
    assert!(!text.contains("Operator"));
}

#[rstest]
fn valid_result_without_summary_says_not_available() {
    let result = CheckResult {
        postcode: PostcodeKey::normalise("SW1A 1AA"),
        valid: true,
        geographic: Some(westminster()),
        ..CheckResult::default()
    };
    let text = render_text(&[result]);
    assert!(text.ends_with("\n  Mobile data: Not available\n"));
}

#[rstest]
fn covered_result_prints_the_operator_table(covered_result: CheckResult) {
    let text = render_text(&[covered_result]);
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let table_rule = format!("  {}", rule(44));

    assert!(lines.contains(&"  Operator     Voice      4G         5G"));
    assert!(lines.contains(&"  EE           ✓ 95%      ✓ 80%      ✗ 10%"));
    assert!(lines.contains(&"  O2           ✗ N/A      ✗ N/A      ✗ N/A"));
    assert_eq!(lines.iter().filter(|line| **line == table_rule).count(), 2);
    assert!(lines.contains(&"  4G operators: 1/4   5G operators: 0/4"));
    assert_eq!(
        lines.last().copied(),
        Some("  Source: Ofcom Connected Nations (open data)")
    );
}

#[rstest]
fn results_are_separated_by_a_blank_line(covered_result: CheckResult) {
    let text = render_text(&[covered_result.clone(), covered_result]);
    let separator = format!("(open data)\n\n\n{}", rule(52));
    assert_eq!(text.matches(&separator).count(), 1);
    assert_eq!(text.matches("  Postcode: SW1A1AA").count(), 2);
}

#[rstest]
fn json_output_is_a_pretty_array(covered_result: CheckResult) {
    let mut buffer = Vec::new();
    render::write_json(&mut buffer, &[covered_result]).expect("render json");
    let text = output_text(buffer);

    assert!(text.starts_with("[\n  {\n"));
    assert!(text.ends_with("]\n"));
    let value: serde_json::Value = serde_json::from_str(&text).expect("valid JSON");
    assert_eq!(value[0]["postcode"], "SW1A1AA");
    assert_eq!(value[0]["valid"], true);
    assert_eq!(value[0]["mobile"]["overall"]["four_g_count"], 1);
    assert!(value[0].get("error").is_none());
}

#[rstest]
fn setup_report_mentions_reused_artefacts() {
    let report = SetupReport {
        edition: "2023".to_owned(),
        csv_path: "/data/ofcom_mobile_2023.csv".into(),
        store_path: "/data/mobile.db".into(),
        downloaded_bytes: None,
        ingest: None,
    };
    let mut buffer = Vec::new();
    render::write_setup_report(&mut buffer, &report).expect("render report");
    let text = output_text(buffer);

    assert!(text.contains("  Reusing /data/ofcom_mobile_2023.csv\n"));
    assert!(text.contains("  Reusing /data/mobile.db\n"));
    assert!(text.ends_with("\n✓ Setup complete.\n  You can now run: mobile-coverage check <POSTCODE>\n"));
}
