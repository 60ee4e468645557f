//! Output formatting for validation reports.
//!
//! Both writers target any `Write` so the CLI can print to stdout and tests
//! can render into a buffer.

use std::io::Write;

use crate::report::ValidationReport;

/// Format a `ValidationReport` as JSON to a writer.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json(report: &ValidationReport, writer: &mut dyn Write) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    writeln!(writer, "{json}")?;
    Ok(())
}

/// Format a `ValidationReport` as plain text to a writer.
///
/// ```text
/// OK: subprojects/a.wrap
/// OK: subprojects/b.wrap
///
/// Failures:
///  - subprojects/c.wrap: missing revision
/// ```
///
/// With no failures the last block is the single line `All revisions valid`.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human(report: &ValidationReport, writer: &mut dyn Write) -> anyhow::Result<()> {
    for path in &report.ok_files {
        writeln!(writer, "OK: {}", path.display())?;
    }

    writeln!(writer)?;
    if report.failures.is_empty() {
        writeln!(writer, "All revisions valid")?;
        return Ok(());
    }

    writeln!(writer, "Failures:")?;
    for failure in &report.failures {
        writeln!(writer, " - {failure}")?;
    }
    Ok(())
}
