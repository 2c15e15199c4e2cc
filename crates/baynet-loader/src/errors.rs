//! Error types for loading networks from CSV tables.

use baynet_core::NetworkError;
use thiserror::Error;

/// Errors that can occur while reading a network directory.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LoadError {
    /// A file could not be opened or read.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A file is not well-formed CSV (e.g. rows of different lengths).
    #[error("malformed CSV in '{path}': {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// The graph names a variable that has no probability table file.
    #[error("no probability table for '{variable}' (expected '{path}')")]
    MissingTable { variable: String, path: String },

    /// A required column is absent from a table header.
    #[error("'{path}' has no column '{column}'")]
    MissingColumn { path: String, column: String },

    /// A probability cell does not parse as a number.
    #[error("'{path}' row {row}: '{value}' in column '{column}' is not a number")]
    InvalidNumber {
        path: String,
        row: usize,
        column: String,
        value: String,
    },

    /// The graph file lists no edges, so there are no variables.
    #[error("graph '{0}' has no edges")]
    EmptyGraph(String),

    /// The tables were read but do not form a valid network.
    #[error(transparent)]
    Network(#[from] NetworkError),
}
