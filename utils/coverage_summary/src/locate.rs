//! Discovery of per-service JaCoCo reports under a repository root.
//!
//! Every service lives in its own directory directly below `services/` and,
//! once its Gradle test task has run with JaCoCo enabled, leaves a report at
//! [`REPORT_PATTERN`]. Discovery never touches the process working directory;
//! all paths are joined onto an explicit root.

use std::path::{Component, Path, PathBuf};
use std::process::Command;

use glob::{MatchOptions, Pattern};

use crate::error::{SummaryError, SummaryResult};

/// Root-relative location of a service report.
pub const REPORT_PATTERN: &str = "services/*/build/reports/jacoco/test/jacocoTestReport.xml";

/// A report file found by [`locate_reports`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLocation {
    /// Root-joined path, used to read the file.
    pub path: PathBuf,
    /// Root-relative path with `/` separators, used for ordering and naming.
    pub relative: String,
}

/// Find every service report under `root`, sorted by relative path.
///
/// A missing `services/` directory is not an error and yields no reports.
pub fn locate_reports(root: &Path) -> SummaryResult<Vec<ReportLocation>> {
    let root_str = root.to_str().ok_or_else(|| {
        SummaryError::workspace_root(format!("{} is not valid UTF-8", root.display()))
    })?;
    let pattern = if root_str.is_empty() {
        REPORT_PATTERN.to_string()
    } else {
        format!(
            "{}/{}",
            Pattern::escape(root_str.trim_end_matches(['/', '\\'])),
            REPORT_PATTERN
        )
    };

    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };

    let mut reports = Vec::new();
    for entry in glob::glob_with(&pattern, options)? {
        let path = match entry {
            Ok(path) => path,
            Err(err) => {
                tracing::warn!("skipping unreadable path {}: {}", err.path().display(), err.error());
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }
        let relative = relative_string(root, &path);
        reports.push(ReportLocation { path, relative });
    }

    reports.sort_by(|a, b| a.relative.cmp(&b.relative));
    tracing::debug!("located {} coverage report(s) under {}", reports.len(), root.display());
    Ok(reports)
}

fn relative_string(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Pick the repository root to scan.
///
/// An explicit root wins. Otherwise the workspace this tool was built in is
/// used, and when that checkout is gone the workspace cargo reports for the
/// current directory.
pub fn resolve_root(explicit: Option<PathBuf>) -> SummaryResult<PathBuf> {
    if let Some(root) = explicit {
        return Ok(root);
    }

    if let Some(root) = Path::new(env!("CARGO_MANIFEST_DIR")).ancestors().nth(2) {
        if root.is_dir() {
            return Ok(root.to_path_buf());
        }
    }

    locate_cargo_workspace()
}

fn locate_cargo_workspace() -> SummaryResult<PathBuf> {
    let output = Command::new("cargo")
        .args(["locate-project", "--workspace", "--message-format=plain"])
        .output()
        .map_err(|err| SummaryError::workspace_root(format!("failed to run cargo: {err}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SummaryError::workspace_root(stderr.trim()));
    }

    let cargo_toml = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
    cargo_toml
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| SummaryError::workspace_root("cargo returned an empty manifest path"))
}
