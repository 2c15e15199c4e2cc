//! CPT lookup: resolves `P(variable = value | parents)` against a network.

use crate::engine::errors::InferenceError;
use crate::engine::evidence::Evidence;
use crate::engine::network::{Cpt, Network, Variable};

/// Looks up `P(variable = value | assignment)`.
///
/// Only the variable's declared parents are read from `assignment`; other
/// entries are ignored. For a variable with parents, the first CPT row that
/// agrees with every *assigned* parent is used, and unassigned parents do not
/// constrain the match.
///
/// A missing value key or a parent combination with no row is a malformed
/// network and is reported as an error, never as probability zero.
pub fn probability(
    network: &Network,
    variable: &str,
    value: &str,
    assignment: &Evidence,
) -> Result<f64, InferenceError> {
    let var = network
        .variable(variable)
        .ok_or_else(|| InferenceError::UnknownVariable(variable.to_string()))?;
    lookup(var, value, assignment)
}

pub(crate) fn lookup(
    var: &Variable,
    value: &str,
    assignment: &Evidence,
) -> Result<f64, InferenceError> {
    let missing = || InferenceError::MissingProbability {
        variable: var.name.to_string(),
        value: value.to_string(),
        parents: assignment.describe_parents(&var.parents),
    };

    match &var.cpt {
        Cpt::Prior(priors) => priors.get(value).copied().ok_or_else(missing),
        Cpt::Table(rows) => {
            let assigned = assignment.parent_values(&var.parents);
            let row = rows.iter().find(|row| row.matches(&assigned)).ok_or_else(|| {
                InferenceError::NoMatchingRow {
                    variable: var.name.to_string(),
                    value: value.to_string(),
                    parents: assignment.describe_parents(&var.parents),
                }
            })?;
            row.probabilities.get(value).copied().ok_or_else(missing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::network::{CptRow, NetworkBuilder};

    fn network() -> Network {
        NetworkBuilder::new()
            .root("rain", [("none", 0.7), ("light", 0.2), ("heavy", 0.1)])
            .root("maintenance", [("yes", 0.4), ("no", 0.6)])
            .variable(
                "train",
                ["rain", "maintenance"],
                ["on_time", "delayed"],
                [
                    CptRow::new(["none", "yes"], [("on_time", 0.8), ("delayed", 0.2)]),
                    CptRow::new(["none", "no"], [("on_time", 0.9), ("delayed", 0.1)]),
                    CptRow::new(["light", "yes"], [("on_time", 0.6), ("delayed", 0.4)]),
                    CptRow::new(["light", "no"], [("on_time", 0.7), ("delayed", 0.3)]),
                ],
            )
            .build()
            .expect("network")
    }

    #[test]
    fn root_lookup_reads_prior() {
        let p = probability(&network(), "rain", "light", &Evidence::new()).expect("prior");
        assert_eq!(p, 0.2);
    }

    #[test]
    fn conditional_lookup_matches_full_assignment() {
        let evidence = Evidence::new()
            .with("rain", "light")
            .with("maintenance", "no")
            .with("appointment", "attend");
        let p = probability(&network(), "train", "delayed", &evidence).expect("row");
        assert_eq!(p, 0.3);
    }

    #[test]
    fn partial_assignment_takes_first_agreeing_row() {
        let evidence = Evidence::new().with("maintenance", "no");
        let p = probability(&network(), "train", "on_time", &evidence).expect("row");
        assert_eq!(p, 0.9);
    }

    #[test]
    fn missing_row_is_an_error_not_zero() {
        let evidence = Evidence::new().with("rain", "heavy").with("maintenance", "yes");
        let err = probability(&network(), "train", "on_time", &evidence).expect_err("no row");
        assert!(err.is_malformed_network());
        assert_eq!(
            err,
            InferenceError::NoMatchingRow {
                variable: "train".into(),
                value: "on_time".into(),
                parents: "rain=heavy, maintenance=yes".into(),
            }
        );
    }

    #[test]
    fn missing_value_key_is_an_error() {
        let network = NetworkBuilder::new()
            .variable(
                "coin",
                Vec::<&str>::new(),
                ["heads", "tails"],
                [CptRow::new(Vec::<&str>::new(), [("heads", 0.5)])],
            )
            .build()
            .expect("network");
        let err = probability(&network, "coin", "tails", &Evidence::new()).expect_err("missing");
        assert!(matches!(err, InferenceError::MissingProbability { .. }));
    }

    #[test]
    fn unknown_variable_is_reported() {
        let err = probability(&network(), "ghost", "x", &Evidence::new()).expect_err("unknown");
        assert_eq!(err, InferenceError::UnknownVariable("ghost".into()));
    }
}
