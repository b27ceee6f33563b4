//! # Coverage Summary
//!
//! Summarises JaCoCo instruction coverage for every service in a
//! multi-service repository. Each service under `services/` that has run its
//! Gradle test task with JaCoCo leaves
//! `build/reports/jacoco/test/jacocoTestReport.xml`; this crate finds those
//! reports, reads the report-level `INSTRUCTION` counter of each, and prints
//! one row per service:
//!
//! ```text
//! Test coverage summary:
//! ================================================================================
//! api-gateway               :  90.0% (   90/  100 instructions)
//! ```
//!
//! Reports without a report-level `INSTRUCTION` counter produce no row. The
//! first unreadable or malformed report stops the run unless
//! [`Options::keep_going`] is set.

pub mod error;
pub mod locate;
pub mod report;
pub mod summary;

use std::io::Write;
use std::path::Path;

pub use error::{CounterError, SummaryError, SummaryResult};
pub use locate::{locate_reports, resolve_root, ReportLocation, REPORT_PATTERN};
pub use report::{
    parse_instruction_counter, read_report, service_name, CoverageCounter, ServiceCoverage,
};
pub use summary::OutputFormat;

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub format: OutputFormat,
    /// Record failing reports and continue instead of stopping at the first.
    pub keep_going: bool,
}

/// What a summary run produced.
#[derive(Debug, Default)]
pub struct Outcome {
    pub rows: Vec<ServiceCoverage>,
    /// Services whose report has no report-level INSTRUCTION counter.
    pub skipped: Vec<String>,
    /// Root-relative report path and error, only filled in keep-going mode.
    pub failures: Vec<(String, SummaryError)>,
}

/// Locate, parse and print every service report under `root`.
///
/// Text output is streamed: rows for reports ordered before a failing one
/// have already been written when the error is returned.
pub fn summarize(root: &Path, out: &mut impl Write, options: Options) -> SummaryResult<Outcome> {
    let locations = locate_reports(root)?;
    let mut outcome = Outcome::default();

    if options.format == OutputFormat::Text {
        summary::write_header(out).map_err(SummaryError::Output)?;
    }

    for location in &locations {
        let parsed = match report::read_report(location) {
            Ok(parsed) => parsed,
            Err(err) if options.keep_going => {
                tracing::error!("{}: {}", location.relative, err);
                outcome.failures.push((location.relative.clone(), err));
                continue;
            }
            Err(err) => return Err(err),
        };

        match parsed {
            Some(row) => {
                tracing::debug!(
                    "{}: {}/{} instructions covered",
                    row.service,
                    row.covered,
                    row.total
                );
                if options.format == OutputFormat::Text {
                    summary::write_row(out, &row).map_err(SummaryError::Output)?;
                }
                outcome.rows.push(row);
            }
            None => {
                let service = service_name(&location.relative);
                tracing::debug!("{}: no report-level INSTRUCTION counter, skipping", service);
                outcome.skipped.push(service);
            }
        }
    }

    if options.format == OutputFormat::Json {
        writeln!(out, "{}", summary::format_json(&outcome.rows)).map_err(SummaryError::Output)?;
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn write_report(root: &Path, service: &str, body: &str) {
        let path = root
            .join("services")
            .join(service)
            .join("build/reports/jacoco/test/jacocoTestReport.xml");
        fs::create_dir_all(path.parent().expect("parent")).expect("report dir");
        fs::write(path, body).expect("report");
    }

    fn instruction_report(missed: u64, covered: u64) -> String {
        format!(
            r#"<report name="svc"><counter type="INSTRUCTION" missed="{missed}" covered="{covered}"/></report>"#
        )
    }

    fn run(root: &Path, options: Options) -> (SummaryResult<Outcome>, String) {
        let mut out = Vec::new();
        let result = summarize(root, &mut out, options);
        (result, String::from_utf8(out).expect("utf8"))
    }

    #[test]
    fn summarize__no_reports__then_header_only() {
        let temp = TempDir::new().expect("temp dir");
        let (result, text) = run(temp.path(), Options::default());

        let outcome = result.expect("summary");
        assert!(outcome.rows.is_empty());
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn summarize__services_in_reverse_creation_order__then_rows_alphabetical() {
        let temp = TempDir::new().expect("temp dir");
        write_report(temp.path(), "beta-svc", &instruction_report(0, 0));
        write_report(temp.path(), "alpha-svc", &instruction_report(0, 50));

        let (result, text) = run(temp.path(), Options::default());
        let outcome = result.expect("summary");

        let services: Vec<&str> = outcome.rows.iter().map(|r| r.service.as_str()).collect();
        assert_eq!(services, vec!["alpha-svc", "beta-svc"]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("alpha-svc") && lines[2].contains("100.0%"));
        assert!(lines[3].starts_with("beta-svc") && lines[3].contains("  0.0%"));
    }

    #[test]
    fn summarize__report_without_instruction_counter__then_skipped_not_failed() {
        let temp = TempDir::new().expect("temp dir");
        write_report(
            temp.path(),
            "event-generator",
            r#"<report><counter type="LINE" missed="1" covered="1"/></report>"#,
        );

        let (result, text) = run(temp.path(), Options::default());
        let outcome = result.expect("summary");

        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.skipped, vec!["event-generator".to_string()]);
        assert!(!text.contains("event-generator"));
    }

    #[test]
    fn summarize__malformed_report__then_earlier_rows_written_and_later_ones_not() {
        let temp = TempDir::new().expect("temp dir");
        write_report(temp.path(), "a-first", &instruction_report(1, 1));
        write_report(temp.path(), "b-broken", "<report><counter");
        write_report(temp.path(), "c-after", &instruction_report(1, 1));

        let (result, text) = run(temp.path(), Options::default());

        match result {
            Err(SummaryError::Report { path, source: CounterError::Malformed(_) }) => {
                assert!(path.to_string_lossy().contains("b-broken"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(text.contains("a-first"));
        assert!(!text.contains("c-after"));
    }

    #[test]
    fn summarize__keep_going__then_collects_failures_and_continues() {
        let temp = TempDir::new().expect("temp dir");
        write_report(temp.path(), "a-first", &instruction_report(1, 3));
        write_report(
            temp.path(),
            "b-broken",
            r#"<report><counter type="INSTRUCTION" missed="1"/></report>"#,
        );
        write_report(temp.path(), "c-after", &instruction_report(0, 2));

        let options = Options {
            keep_going: true,
            ..Options::default()
        };
        let (result, text) = run(temp.path(), options);
        let outcome = result.expect("summary");

        assert_eq!(outcome.rows.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.failures[0].0.contains("b-broken"));
        assert!(matches!(
            outcome.failures[0].1,
            SummaryError::Report {
                source: CounterError::MissingAttribute { attribute: "covered" },
                ..
            }
        ));
        assert!(text.contains("c-after"));
    }

    #[test]
    fn summarize__json_format__then_no_header_and_valid_json() {
        let temp = TempDir::new().expect("temp dir");
        write_report(temp.path(), "api-gateway", &instruction_report(10, 90));

        let options = Options {
            format: OutputFormat::Json,
            ..Options::default()
        };
        let (result, text) = run(temp.path(), options);
        result.expect("summary");

        assert!(!text.contains(summary::HEADER));
        let value: serde_json::Value = serde_json::from_str(&text).expect("json");
        assert_eq!(value[0]["service"], "api-gateway");
        assert_eq!(value[0]["percentage"], 90.0);
    }
}
