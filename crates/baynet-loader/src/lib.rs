//! # Baynet Loader
//!
//! Builds a [`Network`] from a directory of CSV tables:
//!
//! - `graph.csv` with `origin,destination` columns, one directed edge per row
//! - `<variable>.csv` for every variable named in the graph. Roots use
//!   `value,prob` columns; other variables have one column per parent followed
//!   by one column per value of the variable.
//!
//! CPT problems that do not prevent construction (rows not summing to one,
//! missing parent combinations) are logged as warnings and returned by
//! [`load_network_with_warnings`].

#![forbid(unsafe_code)]

pub mod errors;
pub mod tables;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use baynet_core::{CptWarning, Network, NetworkBuilder};

pub use errors::LoadError;
pub use tables::{parse_graph, parse_table, GraphStructure, ParsedTable};

/// Name of the graph file inside a network directory.
pub const GRAPH_FILE: &str = "graph.csv";

/// Tolerance used when linting loaded CPTs.
pub const LINT_TOLERANCE: f64 = 1e-6;

fn open(path: &Path) -> Result<BufReader<File>, LoadError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })
}

/// Path of the probability table for `variable` inside `dir`.
pub fn table_path(dir: &Path, variable: &str) -> PathBuf {
    dir.join(format!("{}.csv", variable))
}

/// Loads the network stored in `dir`.
pub fn load_network(dir: impl AsRef<Path>) -> Result<Network, LoadError> {
    load_network_with_warnings(dir).map(|(network, _)| network)
}

/// Loads the network stored in `dir` along with its CPT lint warnings.
pub fn load_network_with_warnings(
    dir: impl AsRef<Path>,
) -> Result<(Network, Vec<CptWarning>), LoadError> {
    let dir = dir.as_ref();
    let graph_path = dir.join(GRAPH_FILE);
    let graph = parse_graph(open(&graph_path)?, &graph_path.display().to_string())?;
    tracing::debug!(
        "Read {} variables from '{}'",
        graph.variables.len(),
        graph_path.display()
    );

    let mut builder = NetworkBuilder::new();
    for (variable, parents) in graph.variables.iter().zip(&graph.parents) {
        let path = table_path(dir, variable);
        if !path.exists() {
            return Err(LoadError::MissingTable {
                variable: variable.clone(),
                path: path.display().to_string(),
            });
        }
        let table = parse_table(open(&path)?, parents, &path.display().to_string())?;
        builder = match table {
            ParsedTable::Prior(priors) => builder.root(variable.as_str(), priors),
            ParsedTable::Conditional { domain, rows } => builder.variable(
                variable.as_str(),
                parents.iter().map(String::as_str),
                domain,
                rows,
            ),
        };
    }

    let network = builder.build()?;
    let warnings = network.lint(LINT_TOLERANCE);
    for warning in &warnings {
        tracing::warn!("{}: {}", dir.display(), warning);
    }
    tracing::info!(
        "Loaded network '{}' with {} variables",
        dir.display(),
        network.len()
    );
    Ok((network, warnings))
}
