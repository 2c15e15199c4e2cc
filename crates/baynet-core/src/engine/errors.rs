//! Error types for network construction and inference.

use thiserror::Error;

/// Structural errors detected while building a [`Network`](crate::engine::network::Network).
///
/// These are raised once, at construction time. Problems that only show up for
/// particular queries (a missing CPT row, a missing value key) are reported by
/// [`InferenceError`] instead.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    /// The same variable name was declared twice.
    #[error("variable '{0}' declared more than once")]
    DuplicateVariable(String),

    /// A variable was declared without any admissible values.
    #[error("variable '{0}' has an empty domain")]
    EmptyDomain(String),

    /// A value appears twice in one variable's domain.
    #[error("variable '{variable}' lists value '{value}' more than once")]
    DuplicateValue { variable: String, value: String },

    /// A declared parent is not a variable of the network.
    #[error("variable '{variable}' names unknown parent '{parent}'")]
    UnknownParent { variable: String, parent: String },

    /// A CPT row does not assign exactly one value per declared parent.
    #[error("CPT row {row} of '{variable}' has {found} parent values, expected {expected}")]
    RowShape {
        variable: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A CPT row assigns a parent a value outside that parent's domain.
    #[error("CPT row {row} of '{variable}' assigns '{parent}={value}', which is not in the domain of '{parent}'")]
    UnknownParentValue {
        variable: String,
        row: usize,
        parent: String,
        value: String,
    },

    /// Two CPT rows carry the same parent-value combination.
    #[error("CPT of '{variable}' has duplicate rows for parents ({parents})")]
    DuplicateRow { variable: String, parents: String },

    /// A probability is NaN, infinite, or outside [0, 1].
    #[error("CPT of '{variable}' has invalid probability {probability} for value '{value}'")]
    InvalidProbability {
        variable: String,
        value: String,
        probability: f64,
    },

    /// A CPT entry names a value outside the variable's own domain.
    #[error("CPT of '{variable}' has an entry for unknown value '{value}'")]
    UnknownValue { variable: String, value: String },

    /// The parent graph is not acyclic.
    #[error("parent graph has a cycle through: {}", .variables.join(", "))]
    Cycle { variables: Vec<String> },
}

/// Errors raised while answering a query.
///
/// All variants are deterministic structural faults: retrying the same query
/// against the same network always fails the same way.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    /// A CPT has no entry for the requested value.
    #[error("no probability for {variable}={value}{}", describe_parents(.parents))]
    MissingProbability {
        variable: String,
        value: String,
        parents: String,
    },

    /// No CPT row matches the given parent assignment.
    #[error("no matching CPT row for {variable}={value} given ({parents})")]
    NoMatchingRow {
        variable: String,
        value: String,
        parents: String,
    },

    /// The evidence has probability zero under the model, so no posterior exists.
    #[error("evidence {evidence} has zero probability; cannot normalize P({query} | evidence)")]
    ZeroEvidence { query: String, evidence: String },

    /// A query or evidence names a variable the network does not have.
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    /// Evidence assigns a value outside the variable's domain.
    #[error("'{value}' is not a value of variable '{variable}'")]
    UnknownValue { variable: String, value: String },

    /// A caller-supplied enumeration order is not a topological order of the network.
    #[error("invalid enumeration order: {0}")]
    InvalidOrder(String),

    /// Normalization produced a non-finite total.
    #[error("numerical error: {0}")]
    Numerical(String),
}

impl InferenceError {
    /// True for lookup failures caused by an incomplete or malformed CPT.
    pub fn is_malformed_network(&self) -> bool {
        matches!(
            self,
            Self::MissingProbability { .. } | Self::NoMatchingRow { .. }
        )
    }
}

fn describe_parents(parents: &str) -> String {
    if parents.is_empty() {
        String::new()
    } else {
        format!(" given ({})", parents)
    }
}
