//! Human-readable and JSON rendering of command output.

use std::io::{self, Write};

use coverage_core::{CheckResult, GeographicInfo, MobileSummary, OperatorCoverage};
use coverage_data::SetupReport;

use crate::CliError;

const BANNER: &str = "
╔══════════════════════════════════════════════╗
║        UK Mobile Coverage Checker            ║
║  Data: Ofcom Connected Nations + postcodes.io║
╚══════════════════════════════════════════════╝
";

const RESULT_RULE_WIDTH: usize = 52;
const TABLE_RULE_WIDTH: usize = 44;

pub(crate) fn write_setup_banner(writer: &mut dyn Write, edition: &str) -> Result<(), CliError> {
    writeln!(writer, "{BANNER}")
        .and_then(|()| writeln!(writer, "Setting up Ofcom mobile {edition} dataset..."))
        .map_err(CliError::WriteOutput)
}

pub(crate) fn write_setup_report(
    writer: &mut dyn Write,
    report: &SetupReport,
) -> Result<(), CliError> {
    setup_report(writer, report).map_err(CliError::WriteOutput)
}

fn setup_report(writer: &mut dyn Write, report: &SetupReport) -> io::Result<()> {
    match report.downloaded_bytes {
        Some(bytes) => writeln!(writer, "  Downloaded {bytes} bytes to {}", report.csv_path)?,
        None => writeln!(writer, "  Reusing {}", report.csv_path)?,
    }
    match &report.ingest {
        Some(ingest) => writeln!(
            writer,
            "  Built {} ({} rows, {} skipped, {} columns)",
            report.store_path,
            ingest.rows,
            ingest.skipped_rows,
            ingest.columns.len()
        )?,
        None => writeln!(writer, "  Reusing {}", report.store_path)?,
    }
    writeln!(writer, "\n✓ Setup complete.")?;
    writeln!(writer, "  You can now run: mobile-coverage check <POSTCODE>")
}

pub(crate) fn write_json(writer: &mut dyn Write, results: &[CheckResult]) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(results).map_err(CliError::SerializeResults)?;
    writer
        .write_all(payload.as_bytes())
        .and_then(|()| writer.write_all(b"\n"))
        .map_err(CliError::WriteOutput)
}

/// Print every result, separated by blank lines.
pub(crate) fn write_results(
    writer: &mut dyn Write,
    results: &[CheckResult],
) -> Result<(), CliError> {
    for (index, result) in results.iter().enumerate() {
        write_result(writer, result).map_err(CliError::WriteOutput)?;
        if index + 1 < results.len() {
            writeln!(writer).map_err(CliError::WriteOutput)?;
        }
    }
    Ok(())
}

fn write_result(writer: &mut dyn Write, result: &CheckResult) -> io::Result<()> {
    let rule = "─".repeat(RESULT_RULE_WIDTH);
    writeln!(writer, "\n{rule}")?;
    writeln!(writer, "  Postcode: {}", result.postcode)?;
    writeln!(writer, "{rule}")?;

    if let Some(error) = &result.error {
        return writeln!(writer, "  ✗ {error}");
    }
    if let Some(geographic) = &result.geographic {
        write_geographic(writer, geographic)?;
    }
    if let Some(note) = &result.note {
        return writeln!(writer, "\n  Note: {note}");
    }
    match &result.mobile {
        Some(summary) => write_summary(writer, summary),
        None => writeln!(writer, "\n  Mobile data: Not available"),
    }
}

fn write_geographic(writer: &mut dyn Write, info: &GeographicInfo) -> io::Result<()> {
    let region = info.region.as_deref().unwrap_or_default();
    let district = info.admin_district.as_deref().unwrap_or_default();
    let country = info.country.as_deref().unwrap_or_default();
    writeln!(writer, "  Region:   {region}")?;
    writeln!(writer, "  District: {district}")?;
    writeln!(writer, "  Country:  {country}")?;
    writeln!(
        writer,
        "  Lat/Lon:  {:.6}, {:.6}",
        info.latitude.unwrap_or_default(),
        info.longitude.unwrap_or_default()
    )
}

fn write_summary(writer: &mut dyn Write, summary: &MobileSummary) -> io::Result<()> {
    let rule = "─".repeat(TABLE_RULE_WIDTH);
    writeln!(
        writer,
        "\n  {:<12} {:<10} {:<10} {:<10}",
        "Operator", "Voice", "4G", "5G"
    )?;
    writeln!(writer, "  {rule}")?;
    for coverage in &summary.operators {
        write_operator_row(writer, coverage)?;
    }
    writeln!(writer, "  {rule}")?;
    writeln!(
        writer,
        "  4G operators: {}/4   5G operators: {}/4",
        summary.overall.four_g_count, summary.overall.five_g_count
    )?;
    writeln!(writer, "\n  Source: Ofcom Connected Nations (open data)")
}

fn write_operator_row(writer: &mut dyn Write, coverage: &OperatorCoverage) -> io::Result<()> {
    let cell = |covered: bool, value: &str| format!("{} {value}", marker(covered));
    writeln!(
        writer,
        "  {:<12} {:<10} {:<10} {:<10}",
        coverage.operator.name(),
        cell(coverage.has_voice, &coverage.voice),
        cell(coverage.has_four_g, &coverage.four_g),
        cell(coverage.has_five_g, &coverage.five_g)
    )
}

const fn marker(covered: bool) -> &'static str {
    if covered { "✓" } else { "✗" }
}
