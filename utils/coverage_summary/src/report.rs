//! JaCoCo report parsing.
//!
//! Only the report-level `INSTRUCTION` counter is read. JaCoCo writes one
//! `<counter>` per metric as direct children of `<report>` after the package
//! breakdown; package, class, and method counters further down the tree are
//! never consulted.
//!
//! Reports are read as UTF-8, which is what JaCoCo writes. A report saved in
//! another encoding fails with an I/O error of kind `InvalidData`.

use std::fs;
use std::num::ParseIntError;

use roxmltree::{Document, Node, ParsingOptions};

use crate::error::{CounterError, SummaryError, SummaryResult};
use crate::locate::ReportLocation;

const COUNTER_TAG: &str = "counter";
const INSTRUCTION: &str = "INSTRUCTION";

/// Missed and covered instruction counts from one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageCounter {
    pub missed: u64,
    pub covered: u64,
}

impl CoverageCounter {
    /// Widened so two `u64` counts can never overflow when summed.
    pub fn total(&self) -> u128 {
        u128::from(self.missed) + u128::from(self.covered)
    }

    pub fn percentage(&self) -> f64 {
        percentage(self.covered, self.total())
    }
}

/// One summary row: a service and its instruction coverage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCoverage {
    pub service: String,
    pub covered: u64,
    pub total: u128,
}

impl ServiceCoverage {
    pub fn new(service: impl Into<String>, counter: CoverageCounter) -> Self {
        Self {
            service: service.into(),
            covered: counter.covered,
            total: counter.total(),
        }
    }

    /// Zero when the report counted no instructions at all.
    pub fn percentage(&self) -> f64 {
        percentage(self.covered, self.total)
    }
}

fn percentage(covered: u64, total: u128) -> f64 {
    if total > 0 {
        (covered as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Service name for a root-relative report path: the directory directly
/// below `services/`, or `"unknown"` when the path is too short to have one.
pub fn service_name(relative: &str) -> String {
    let normalized = relative.replace('\\', "/");
    normalized
        .split('/')
        .nth(1)
        .unwrap_or("unknown")
        .to_string()
}

/// Extract the first report-level `INSTRUCTION` counter.
///
/// Returns `Ok(None)` when the root element has no such counter; callers
/// treat that as "nothing to report" rather than as zero coverage.
pub fn parse_instruction_counter(xml: &str) -> Result<Option<CoverageCounter>, CounterError> {
    // JaCoCo reports open with a DOCTYPE naming report.dtd.
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;
    let document = Document::parse_with_options(xml, options)?;

    let counter = document
        .root_element()
        .children()
        .filter(|node| {
            node.is_element()
                && node.tag_name().namespace().is_none()
                && node.tag_name().name() == COUNTER_TAG
        })
        .find(|node| node.attribute("type") == Some(INSTRUCTION));

    match counter {
        Some(node) => Ok(Some(CoverageCounter {
            missed: count_attribute(node, "missed")?,
            covered: count_attribute(node, "covered")?,
        })),
        None => Ok(None),
    }
}

fn count_attribute(node: Node<'_, '_>, attribute: &'static str) -> Result<u64, CounterError> {
    let value = node
        .attribute(attribute)
        .ok_or(CounterError::MissingAttribute { attribute })?;
    value
        .trim()
        .parse()
        .map_err(|source: ParseIntError| CounterError::InvalidAttribute {
            attribute,
            value: value.to_string(),
            source,
        })
}

/// Read one located report and turn it into a summary row.
pub fn read_report(location: &ReportLocation) -> SummaryResult<Option<ServiceCoverage>> {
    let xml = fs::read_to_string(&location.path)
        .map_err(|err| SummaryError::io(&location.path, err))?;
    let counter = parse_instruction_counter(&xml)
        .map_err(|err| SummaryError::report(&location.path, err))?;

    Ok(counter.map(|counter| ServiceCoverage::new(service_name(&location.relative), counter)))
}
