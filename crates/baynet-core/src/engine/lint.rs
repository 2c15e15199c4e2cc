//! Non-fatal CPT checks.
//!
//! The engine trusts CPTs: rows that do not sum to one produce silently wrong
//! posteriors, and missing rows only fail when a query reaches them. `lint`
//! reports both up front without rejecting the network.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::engine::network::{describe_combination, Cpt, Network, Variable};

/// A suspicious CPT entry.
#[derive(Debug, Clone, PartialEq)]
pub enum CptWarning {
    /// Probabilities for one parent combination do not sum to 1.
    RowSum {
        variable: String,
        parents: String,
        sum: f64,
    },
    /// No row covers this parent combination.
    MissingRow { variable: String, parents: String },
    /// A row or prior has no probability for a domain value.
    MissingValue {
        variable: String,
        parents: String,
        value: String,
    },
}

impl fmt::Display for CptWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RowSum {
                variable,
                parents,
                sum,
            } => write!(
                f,
                "P({}{}) sums to {:.6}",
                variable,
                given(parents),
                sum
            ),
            Self::MissingRow { variable, parents } => {
                write!(f, "CPT of '{}' has no row for ({})", variable, parents)
            }
            Self::MissingValue {
                variable,
                parents,
                value,
            } => write!(
                f,
                "P({}={}{}) is not defined",
                variable,
                value,
                given(parents)
            ),
        }
    }
}

fn given(parents: &str) -> String {
    if parents.is_empty() {
        String::new()
    } else {
        format!(" | {}", parents)
    }
}

impl Network {
    /// Reports CPT rows whose sums differ from 1 by more than `tolerance`,
    /// parent combinations without a row, and undefined value probabilities.
    pub fn lint(&self, tolerance: f64) -> Vec<CptWarning> {
        let mut warnings = Vec::new();
        for variable in self.variables() {
            match &variable.cpt {
                Cpt::Prior(priors) => {
                    lint_entries(variable, "", |v| priors.get(v).copied(), tolerance, &mut warnings)
                }
                Cpt::Table(rows) => {
                    for row in rows {
                        let parents = describe_combination(&variable.parents, &row.parent_values);
                        lint_entries(
                            variable,
                            &parents,
                            |v| row.probabilities.get(v).copied(),
                            tolerance,
                            &mut warnings,
                        );
                    }
                    let covered: HashSet<&[Arc<str>]> =
                        rows.iter().map(|row| row.parent_values.as_slice()).collect();
                    for combination in self.parent_combinations(variable) {
                        if !covered.contains(combination.as_slice()) {
                            warnings.push(CptWarning::MissingRow {
                                variable: variable.name.to_string(),
                                parents: describe_combination(&variable.parents, &combination),
                            });
                        }
                    }
                }
            }
        }
        warnings
    }

    /// Every combination of parent values, first parent varying slowest.
    fn parent_combinations(&self, variable: &Variable) -> Vec<Vec<Arc<str>>> {
        let domains: Vec<&[Arc<str>]> = variable
            .parents
            .iter()
            .filter_map(|parent| self.domain(parent))
            .collect();
        let mut combinations = vec![Vec::with_capacity(domains.len())];
        for domain in domains {
            combinations = combinations
                .into_iter()
                .flat_map(|prefix| {
                    domain.iter().map(move |value| {
                        let mut next = prefix.clone();
                        next.push(value.clone());
                        next
                    })
                })
                .collect();
        }
        combinations
    }
}

fn lint_entries(
    variable: &Variable,
    parents: &str,
    probability: impl Fn(&str) -> Option<f64>,
    tolerance: f64,
    warnings: &mut Vec<CptWarning>,
) {
    let mut sum = 0.0;
    for value in &variable.domain {
        match probability(&**value) {
            Some(p) => sum += p,
            None => warnings.push(CptWarning::MissingValue {
                variable: variable.name.to_string(),
                parents: parents.to_string(),
                value: value.to_string(),
            }),
        }
    }
    if (sum - 1.0).abs() > tolerance {
        warnings.push(CptWarning::RowSum {
            variable: variable.name.to_string(),
            parents: parents.to_string(),
            sum,
        });
    }
}
