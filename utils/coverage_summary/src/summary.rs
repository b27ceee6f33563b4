//! Output formatters for the coverage summary
//!
//! Supports the fixed-width text table and JSON.

use std::io::{self, Write};

use serde::Serialize;

use crate::report::ServiceCoverage;

pub const HEADER: &str = "Test coverage summary:";
pub const SEPARATOR_WIDTH: usize = 80;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format '{}'. Use 'text' or 'json'", s)),
        }
    }
}

pub fn write_header(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", HEADER)?;
    writeln!(out, "{}", "=".repeat(SEPARATOR_WIDTH))
}

/// Format one table row, e.g.
/// `api-gateway               :  90.0% (   90/  100 instructions)`.
pub fn format_row(row: &ServiceCoverage) -> String {
    format!(
        "{:<25}: {:>5.1}% ({:>5}/{:>5} instructions)",
        row.service,
        row.percentage(),
        row.covered,
        row.total
    )
}

pub fn write_row(out: &mut impl Write, row: &ServiceCoverage) -> io::Result<()> {
    writeln!(out, "{}", format_row(row))
}

pub fn format_json(rows: &[ServiceCoverage]) -> String {
    #[derive(Serialize)]
    struct JsonRow<'a> {
        service: &'a str,
        covered: u64,
        total: u128,
        percentage: f64,
    }

    let json_rows: Vec<JsonRow<'_>> = rows
        .iter()
        .map(|row| JsonRow {
            service: &row.service,
            covered: row.covered,
            total: row.total,
            percentage: (row.percentage() * 10.0).round() / 10.0,
        })
        .collect();

    serde_json::to_string_pretty(&json_rows).unwrap_or_else(|_| "[]".to_string())
}
