//! Exact inference by enumeration.
//!
//! [`enumerate_all`] sums the full joint distribution over every variable of
//! the order that the evidence leaves unassigned, multiplying CPT entries along
//! the way. [`enumeration_ask`] runs it once per value of the query variable and
//! normalizes the result.
//!
//! The cost is exponential in the number of hidden variables: each one
//! multiplies the number of branches by its domain size. No pruning, factor
//! caching or variable elimination is performed.
//!
//! Entry points come in the usual families: plain, `_with_config`,
//! `_with_observer`, `_with_diagnostics`, and `_traced`, which also returns a
//! human-readable derivation.

use std::sync::Arc;

use crate::engine::distribution::Distribution;
use crate::engine::errors::InferenceError;
use crate::engine::evidence::Evidence;
use crate::engine::network::Network;
use crate::engine::observer::{
    DiagnosticsRecorder, EnumerationDiagnostics, InferenceObserver, Lookup, NoopObserver,
    TraceRecorder,
};
use crate::engine::probability::lookup;

/// Order in which the engine visits variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VariableOrder {
    /// The network's cached topological order.
    #[default]
    Topological,
    /// A caller-supplied order. It must list every variable exactly once with
    /// parents before children.
    Custom(Vec<Arc<str>>),
}

/// Configuration for enumeration queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumerationConfig {
    pub order: VariableOrder,
}

impl EnumerationConfig {
    /// Configuration using a custom variable order.
    pub fn with_order<I>(order: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Arc<str>>,
    {
        Self {
            order: VariableOrder::Custom(order.into_iter().map(Into::into).collect()),
        }
    }

    fn resolve<'a>(&'a self, network: &'a Network) -> Result<&'a [Arc<str>], InferenceError> {
        match &self.order {
            VariableOrder::Topological => Ok(network.topological_order()),
            VariableOrder::Custom(order) => {
                network
                    .check_order(order)
                    .map_err(InferenceError::InvalidOrder)?;
                Ok(order.as_slice())
            }
        }
    }
}

/// Joint probability of `evidence`, marginalized over every variable of `order`
/// that `evidence` does not assign.
///
/// `order` must be topological for the result to be meaningful; it is not
/// checked here. An empty order yields 1.0.
pub fn enumerate_all(
    network: &Network,
    order: &[Arc<str>],
    evidence: &Evidence,
) -> Result<f64, InferenceError> {
    enumerate(network, order, evidence, 0, &mut NoopObserver)
}

/// [`enumerate_all`] reporting each step to `observer`.
pub fn enumerate_all_with_observer<O>(
    network: &Network,
    order: &[Arc<str>],
    evidence: &Evidence,
    observer: &mut O,
) -> Result<f64, InferenceError>
where
    O: InferenceObserver + ?Sized,
{
    enumerate(network, order, evidence, 0, observer)
}

fn enumerate<O>(
    network: &Network,
    order: &[Arc<str>],
    evidence: &Evidence,
    depth: usize,
    observer: &mut O,
) -> Result<f64, InferenceError>
where
    O: InferenceObserver + ?Sized,
{
    let Some((first, rest)) = order.split_first() else {
        observer.exhausted(depth);
        return Ok(1.0);
    };
    let variable = network
        .variable(first)
        .ok_or_else(|| InferenceError::UnknownVariable(first.to_string()))?;

    if let Some(value) = evidence.get(first) {
        let probability = lookup(variable, value, evidence)?;
        observer.lookup(&Lookup {
            depth,
            variable,
            value,
            assignment: evidence,
            probability,
            hidden: false,
        });
        let result = probability * enumerate(network, rest, evidence, depth + 1, observer)?;
        observer.partial_product(depth, first, value, result);
        return Ok(result);
    }

    observer.sum_started(depth, variable);
    let mut total = 0.0;
    for value in &variable.domain {
        let extended = evidence.extended(&variable.name, value);
        let probability = lookup(variable, value, &extended)?;
        observer.lookup(&Lookup {
            depth,
            variable,
            value,
            assignment: &extended,
            probability,
            hidden: true,
        });
        let term = probability * enumerate(network, rest, &extended, depth + 1, observer)?;
        observer.term(depth, first, value, term);
        total += term;
    }
    observer.sum_finished(depth, first, total);
    Ok(total)
}

/// Posterior distribution of `query` given `evidence`, using the network's
/// topological order.
pub fn enumeration_ask(
    network: &Network,
    query: &str,
    evidence: &Evidence,
) -> Result<Distribution, InferenceError> {
    enumeration_ask_with_config(network, query, evidence, &EnumerationConfig::default())
}

/// Posterior distribution of `query` with explicit configuration.
pub fn enumeration_ask_with_config(
    network: &Network,
    query: &str,
    evidence: &Evidence,
    config: &EnumerationConfig,
) -> Result<Distribution, InferenceError> {
    enumeration_ask_with_observer(network, query, evidence, config, &mut NoopObserver)
}

/// Posterior distribution of `query` with default configuration and work counters.
pub fn enumeration_ask_with_diagnostics(
    network: &Network,
    query: &str,
    evidence: &Evidence,
) -> Result<(Distribution, EnumerationDiagnostics), InferenceError> {
    let mut recorder = DiagnosticsRecorder::default();
    let distribution = enumeration_ask_with_observer(
        network,
        query,
        evidence,
        &EnumerationConfig::default(),
        &mut recorder,
    )?;
    Ok((distribution, recorder.diagnostics))
}

/// Posterior distribution of `query` together with a multi-line derivation.
pub fn enumeration_ask_traced(
    network: &Network,
    query: &str,
    evidence: &Evidence,
) -> Result<(Distribution, String), InferenceError> {
    let mut recorder = TraceRecorder::default();
    let distribution = enumeration_ask_with_observer(
        network,
        query,
        evidence,
        &EnumerationConfig::default(),
        &mut recorder,
    )?;
    Ok((distribution, recorder.into_string()))
}

/// Posterior distribution of `query` with explicit configuration, reporting
/// every step to `observer`.
///
/// Evidence is validated against the network first. If `query` itself is
/// observed, values other than the observed one receive zero mass, so the
/// result is a point mass on the observation.
pub fn enumeration_ask_with_observer<O>(
    network: &Network,
    query: &str,
    evidence: &Evidence,
    config: &EnumerationConfig,
    observer: &mut O,
) -> Result<Distribution, InferenceError>
where
    O: InferenceObserver + ?Sized,
{
    let variable = network
        .variable(query)
        .ok_or_else(|| InferenceError::UnknownVariable(query.to_string()))?;
    evidence.validate(network)?;
    let order = config.resolve(network)?;

    observer.query_started(query, evidence, order);
    let observed = evidence.get(query);
    let mut masses = Vec::with_capacity(variable.domain.len());
    for value in &variable.domain {
        if let Some(observed) = observed.filter(|observed| *observed != value) {
            observer.candidate_contradicted(query, value, observed);
            masses.push((value.clone(), 0.0));
            continue;
        }
        observer.candidate_started(query, value, evidence);
        let extended = evidence.extended(&variable.name, value);
        let mass = enumerate(network, order, &extended, 0, observer)?;
        observer.candidate_finished(query, value, evidence, mass);
        masses.push((value.clone(), mass));
    }

    let distribution = Distribution::normalize(variable.name.clone(), masses, evidence)?;
    observer.query_finished(&distribution);

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "P({} | {}) computed over {} values",
        query,
        evidence,
        distribution.len()
    );

    Ok(distribution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::network::{CptRow, NetworkBuilder};

    fn rain_appointment() -> Network {
        NetworkBuilder::new()
            .root("rain", [("none", 0.7), ("heavy", 0.3)])
            .variable(
                "appointment",
                ["rain"],
                ["attend", "miss"],
                [
                    CptRow::new(["none"], [("attend", 0.9), ("miss", 0.1)]),
                    CptRow::new(["heavy"], [("attend", 0.4), ("miss", 0.6)]),
                ],
            )
            .build()
            .expect("network")
    }

    #[test]
    fn empty_order_is_multiplicative_identity() {
        let network = rain_appointment();
        let p = enumerate_all(&network, &[], &Evidence::new()).expect("enumerate");
        assert_eq!(p, 1.0);
    }

    #[test]
    fn joint_of_full_assignment_is_product_of_cpt_entries() {
        let network = rain_appointment();
        let evidence = Evidence::new().with("rain", "heavy").with("appointment", "miss");
        let p = enumerate_all(&network, network.topological_order(), &evidence).expect("joint");
        assert!((p - 0.18).abs() < 1e-12);
    }

    #[test]
    fn marginal_sums_out_hidden_variables() {
        let network = rain_appointment();
        let evidence = Evidence::new().with("appointment", "miss");
        let p = enumerate_all(&network, network.topological_order(), &evidence).expect("marginal");
        assert!((p - 0.25).abs() < 1e-12);
    }

    #[test]
    fn posterior_of_cause_given_effect() {
        let network = rain_appointment();
        let dist = enumeration_ask(&network, "rain", &Evidence::new().with("appointment", "miss"))
            .expect("posterior");
        assert!((dist.get("none").expect("none") - 0.28).abs() < 1e-9);
        assert!((dist.get("heavy").expect("heavy") - 0.72).abs() < 1e-9);
    }

    #[test]
    fn observed_query_variable_yields_point_mass() {
        let network = rain_appointment();
        let dist = enumeration_ask(&network, "rain", &Evidence::new().with("rain", "heavy"))
            .expect("posterior");
        assert_eq!(dist.get("heavy"), Some(1.0));
        assert_eq!(dist.get("none"), Some(0.0));
    }

    #[test]
    fn custom_order_must_be_topological() {
        let network = rain_appointment();
        let config = EnumerationConfig::with_order(["appointment", "rain"]);
        let err = enumeration_ask_with_config(&network, "rain", &Evidence::new(), &config)
            .expect_err("invalid order");
        assert!(matches!(err, InferenceError::InvalidOrder(_)));
    }

    #[test]
    fn unknown_query_and_evidence_are_rejected() {
        let network = rain_appointment();
        let err = enumeration_ask(&network, "ghost", &Evidence::new()).expect_err("query");
        assert_eq!(err, InferenceError::UnknownVariable("ghost".into()));

        let err = enumeration_ask(&network, "rain", &Evidence::new().with("appointment", "late"))
            .expect_err("value");
        assert!(matches!(err, InferenceError::UnknownValue { .. }));
    }

    #[test]
    fn diagnostics_count_complete_assignments() {
        let network = rain_appointment();
        let (_, diagnostics) =
            enumeration_ask_with_diagnostics(&network, "rain", &Evidence::new()).expect("query");
        // Two candidates for rain, each summing appointment's two values.
        assert_eq!(diagnostics.candidates, 2);
        assert_eq!(diagnostics.hidden_sums, 2);
        assert_eq!(diagnostics.complete_assignments, 4);
        assert_eq!(diagnostics.probability_lookups, 6);
    }

    #[test]
    fn trace_does_not_change_result() {
        let network = rain_appointment();
        let evidence = Evidence::new().with("appointment", "attend");
        let plain = enumeration_ask(&network, "rain", &evidence).expect("plain");
        let (traced, trace) = enumeration_ask_traced(&network, "rain", &evidence).expect("traced");
        assert_eq!(plain, traced);
        assert!(trace.starts_with("Computing P(rain | {appointment=attend})"));
        assert!(trace.contains("P(appointment=attend | rain=none) = 0.900000"));
    }
}
