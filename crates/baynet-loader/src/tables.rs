//! CSV parsing for the graph file and per-variable probability tables.

use std::io::Read;

use baynet_core::CptRow;
use csv::{ReaderBuilder, StringRecord};

use crate::errors::LoadError;

/// Column names of the graph file.
pub const ORIGIN_COLUMN: &str = "origin";
pub const DESTINATION_COLUMN: &str = "destination";

/// Column names of a root variable's prior table.
pub const VALUE_COLUMN: &str = "value";
pub const PROB_COLUMN: &str = "prob";

/// Parent structure read from the graph file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphStructure {
    /// Variables in order of first appearance.
    pub variables: Vec<String>,
    /// `(variable, parents)` aligned with `variables`; parents in edge order.
    pub parents: Vec<Vec<String>>,
}

impl GraphStructure {
    pub fn parents_of(&self, variable: &str) -> &[String] {
        self.variables
            .iter()
            .position(|v| v == variable)
            .map(|idx| self.parents[idx].as_slice())
            .unwrap_or(&[])
    }

    fn intern(&mut self, name: &str) -> usize {
        match self.variables.iter().position(|v| v == name) {
            Some(idx) => idx,
            None => {
                self.variables.push(name.to_string());
                self.parents.push(Vec::new());
                self.variables.len() - 1
            }
        }
    }
}

/// A parsed probability table, ready for the network builder.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedTable {
    Prior(Vec<(String, f64)>),
    Conditional { domain: Vec<String>, rows: Vec<CptRow> },
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn headers<R: Read>(reader: &mut csv::Reader<R>, path: &str) -> Result<StringRecord, LoadError> {
    reader.headers().cloned().map_err(|source| LoadError::Csv {
        path: path.to_string(),
        source,
    })
}

fn column(headers: &StringRecord, name: &str, path: &str) -> Result<usize, LoadError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| LoadError::MissingColumn {
            path: path.to_string(),
            column: name.to_string(),
        })
}

fn records<R: Read>(
    reader: &mut csv::Reader<R>,
    path: &str,
) -> Result<Vec<(usize, StringRecord)>, LoadError> {
    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|source| LoadError::Csv {
            path: path.to_string(),
            source,
        })?;
        // Incomplete rows are skipped rather than rejected.
        if record.iter().any(str::is_empty) {
            tracing::debug!("Skipping incomplete row {} in '{}'", idx + 1, path);
            continue;
        }
        rows.push((idx + 1, record));
    }
    Ok(rows)
}

fn parse_probability(
    record: &StringRecord,
    idx: usize,
    row: usize,
    headers: &StringRecord,
    path: &str,
) -> Result<f64, LoadError> {
    let cell = &record[idx];
    cell.parse::<f64>().map_err(|_| LoadError::InvalidNumber {
        path: path.to_string(),
        row,
        column: headers[idx].to_string(),
        value: cell.to_string(),
    })
}

/// Parses a graph file with `origin,destination` columns, one edge per row.
pub fn parse_graph<R: Read>(reader: R, path: &str) -> Result<GraphStructure, LoadError> {
    let mut reader = csv_reader(reader);
    let headers = headers(&mut reader, path)?;
    let origin = column(&headers, ORIGIN_COLUMN, path)?;
    let destination = column(&headers, DESTINATION_COLUMN, path)?;

    let mut graph = GraphStructure::default();
    for (_, record) in records(&mut reader, path)? {
        let parent = &record[origin];
        let child = &record[destination];
        graph.intern(parent);
        let child_idx = graph.intern(child);
        if !graph.parents[child_idx].iter().any(|p| p == parent) {
            graph.parents[child_idx].push(parent.to_string());
        }
    }

    if graph.variables.is_empty() {
        return Err(LoadError::EmptyGraph(path.to_string()));
    }
    Ok(graph)
}

/// Parses the probability table of a variable with the given parents.
///
/// Roots use `value,prob` columns, one row per value. Other variables have one
/// column per parent followed by one column per value, one row per parent
/// combination. Rows with empty cells are skipped.
pub fn parse_table<R: Read>(
    reader: R,
    parents: &[String],
    path: &str,
) -> Result<ParsedTable, LoadError> {
    let mut reader = csv_reader(reader);
    let headers = headers(&mut reader, path)?;

    if parents.is_empty() {
        let value = column(&headers, VALUE_COLUMN, path)?;
        let prob = column(&headers, PROB_COLUMN, path)?;
        let mut priors = Vec::new();
        for (row, record) in records(&mut reader, path)? {
            let p = parse_probability(&record, prob, row, &headers, path)?;
            priors.push((record[value].to_string(), p));
        }
        return Ok(ParsedTable::Prior(priors));
    }

    let parent_columns = parents
        .iter()
        .map(|parent| column(&headers, parent, path))
        .collect::<Result<Vec<_>, _>>()?;
    let value_columns: Vec<usize> = (0..headers.len())
        .filter(|idx| !parent_columns.contains(idx))
        .collect();
    let domain = value_columns
        .iter()
        .map(|&idx| headers[idx].to_string())
        .collect();

    let mut rows = Vec::new();
    for (row, record) in records(&mut reader, path)? {
        let probabilities = value_columns
            .iter()
            .map(|&idx| {
                parse_probability(&record, idx, row, &headers, path)
                    .map(|p| (headers[idx].to_string(), p))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let parent_values = parent_columns.iter().map(|&idx| record[idx].to_string());
        rows.push(CptRow::new(parent_values, probabilities));
    }
    Ok(ParsedTable::Conditional { domain, rows })
}
