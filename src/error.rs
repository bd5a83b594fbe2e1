use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort an analysis run
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// The log file could not be opened
    #[error("could not open file '{}': {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The log file was opened but reading it failed part-way
    #[error("could not read line {line} of '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        line: usize,
        #[source]
        source: io::Error,
    },
}

/// Failures while writing one of the optional report exports
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON serialization failed for '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV serialization failed for '{}': {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Why a full run ended unsuccessfully; details are already on stderr
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Input(#[from] AnalyzeError),

    #[error("could not write summary: {0}")]
    Summary(#[source] io::Error),

    #[error("{failed} export(s) failed")]
    Export { failed: usize },
}
