use std::{fmt, io, num::ParseIntError, path::PathBuf};

use thiserror::Error;

/// Failures while pulling the instruction counter out of one report document.
#[derive(Debug, Error)]
pub enum CounterError {
    #[error("malformed report: {0}")]
    Malformed(#[from] roxmltree::Error),
    #[error("INSTRUCTION counter is missing the `{attribute}` attribute")]
    MissingAttribute { attribute: &'static str },
    #[error("INSTRUCTION counter has invalid `{attribute}` value {value:?}: {source}")]
    InvalidAttribute {
        attribute: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },
}

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path:?}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: CounterError,
    },
    #[error("failed to write summary: {0}")]
    Output(#[source] io::Error),
    #[error("invalid report pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("could not resolve workspace root: {0}")]
    WorkspaceRoot(String),
    #[error("{failed} coverage report(s) could not be read")]
    Incomplete { failed: usize },
}

pub type SummaryResult<T> = Result<T, SummaryError>;

impl SummaryError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn report(path: impl Into<PathBuf>, source: CounterError) -> Self {
        Self::Report {
            path: path.into(),
            source,
        }
    }

    pub fn workspace_root(details: impl fmt::Display) -> Self {
        Self::WorkspaceRoot(details.to_string())
    }
}
