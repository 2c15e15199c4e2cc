//! Observers of the enumeration engine.
//!
//! The engine is a pure function of the network, the order and the evidence.
//! Anything that wants to watch a computation (the human-readable trace, step
//! counters) implements [`InferenceObserver`] and is handed to the engine
//! explicitly. Observers only receive values; they cannot influence the result.

use std::sync::Arc;

use crate::engine::distribution::Distribution;
use crate::engine::evidence::Evidence;
use crate::engine::network::Variable;

/// One CPT lookup performed by the engine.
#[derive(Debug, Clone, Copy)]
pub struct Lookup<'a> {
    /// Recursion depth, 0 for the first variable of the order.
    pub depth: usize,
    pub variable: &'a Variable,
    pub value: &'a str,
    /// Evidence in force for the lookup; only the variable's parents matter.
    pub assignment: &'a Evidence,
    pub probability: f64,
    /// True when `variable` is being summed out rather than read from evidence.
    pub hidden: bool,
}

/// Callbacks invoked at each decision point of a query. All methods default to
/// doing nothing.
pub trait InferenceObserver {
    fn query_started(&mut self, _query: &str, _evidence: &Evidence, _order: &[Arc<str>]) {}

    fn candidate_started(&mut self, _query: &str, _value: &str, _evidence: &Evidence) {}

    /// The query variable is observed with `observed`, so `value` gets no mass.
    fn candidate_contradicted(&mut self, _query: &str, _value: &str, _observed: &str) {}

    fn candidate_finished(
        &mut self,
        _query: &str,
        _value: &str,
        _evidence: &Evidence,
        _mass: f64,
    ) {
    }

    /// The order is exhausted and the recursion returns 1.0.
    fn exhausted(&mut self, _depth: usize) {}

    fn lookup(&mut self, _lookup: &Lookup<'_>) {}

    /// Result of an evidence step: lookup times the rest of the enumeration.
    fn partial_product(&mut self, _depth: usize, _variable: &str, _value: &str, _result: f64) {}

    fn sum_started(&mut self, _depth: usize, _variable: &Variable) {}

    fn term(&mut self, _depth: usize, _variable: &str, _value: &str, _term: f64) {}

    fn sum_finished(&mut self, _depth: usize, _variable: &str, _total: f64) {}

    fn query_finished(&mut self, _distribution: &Distribution) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl InferenceObserver for NoopObserver {}

/// Counters describing the work done by one or more queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumerationDiagnostics {
    /// Query values enumerated (contradicted candidates excluded).
    pub candidates: usize,
    /// CPT lookups performed.
    pub probability_lookups: usize,
    /// Hidden variables summed out, counted once per sum.
    pub hidden_sums: usize,
    /// Complete assignments reached at the bottom of the recursion.
    pub complete_assignments: usize,
}

/// Observer that fills an [`EnumerationDiagnostics`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagnosticsRecorder {
    pub diagnostics: EnumerationDiagnostics,
}

impl InferenceObserver for DiagnosticsRecorder {
    fn candidate_started(&mut self, _query: &str, _value: &str, _evidence: &Evidence) {
        self.diagnostics.candidates += 1;
    }

    fn exhausted(&mut self, _depth: usize) {
        self.diagnostics.complete_assignments += 1;
    }

    fn lookup(&mut self, _lookup: &Lookup<'_>) {
        self.diagnostics.probability_lookups += 1;
    }

    fn sum_started(&mut self, _depth: usize, _variable: &Variable) {
        self.diagnostics.hidden_sums += 1;
    }
}

const DEFAULT_TRACE_PRECISION: usize = 6;

/// Records a human-readable derivation of a query, one line per step,
/// indented by recursion depth.
#[derive(Debug, Clone)]
pub struct TraceRecorder {
    lines: Vec<String>,
    precision: usize,
}

impl Default for TraceRecorder {
    fn default() -> Self {
        Self::with_precision(DEFAULT_TRACE_PRECISION)
    }
}

impl TraceRecorder {
    /// Recorder printing probabilities with `precision` decimal places.
    pub fn with_precision(precision: usize) -> Self {
        Self {
            lines: Vec::new(),
            precision,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_string(self) -> String {
        self.lines.join("\n")
    }

    fn push(&mut self, depth: usize, extra: usize, text: String) {
        let indent = 2 * (depth + 1) + extra;
        self.lines.push(format!("{:indent$}{}", "", text, indent = indent));
    }

    fn num(&self, value: f64) -> String {
        format!("{:.*}", self.precision, value)
    }
}

impl InferenceObserver for TraceRecorder {
    fn query_started(&mut self, query: &str, evidence: &Evidence, order: &[Arc<str>]) {
        self.lines.push(format!("Computing P({} | {})", query, evidence));
        self.lines.push(format!("Enumeration order: {}", order.join(", ")));
    }

    fn candidate_started(&mut self, query: &str, value: &str, evidence: &Evidence) {
        self.lines.push(String::new());
        self.lines.push(format!("Computing P({}={} | {})", query, value, evidence));
    }

    fn candidate_contradicted(&mut self, query: &str, value: &str, observed: &str) {
        self.lines.push(String::new());
        self.lines.push(format!(
            "{}={} contradicts observed {}={}; mass 0",
            query, value, query, observed
        ));
    }

    fn candidate_finished(&mut self, query: &str, value: &str, evidence: &Evidence, mass: f64) {
        let mass = self.num(mass);
        self.push(
            0,
            0,
            format!("P({}={} | {}) = {} (unnormalized)", query, value, evidence, mass),
        );
    }

    fn exhausted(&mut self, depth: usize) {
        self.push(depth, 0, "No variables left to enumerate, returning 1.0".into());
    }

    fn lookup(&mut self, lookup: &Lookup<'_>) {
        let parents = lookup.assignment.describe_parents(&lookup.variable.parents);
        let p = self.num(lookup.probability);
        let text = if parents.is_empty() {
            format!("P({}={}) = {}", lookup.variable.name, lookup.value, p)
        } else {
            format!(
                "P({}={} | {}) = {}",
                lookup.variable.name, lookup.value, parents, p
            )
        };
        let extra = if lookup.hidden { 2 } else { 0 };
        self.push(lookup.depth, extra, text);
    }

    fn partial_product(&mut self, depth: usize, variable: &str, value: &str, result: f64) {
        let result = self.num(result);
        self.push(
            depth,
            0,
            format!("Partial result for {}={}: {}", variable, value, result),
        );
    }

    fn sum_started(&mut self, depth: usize, variable: &Variable) {
        self.push(
            depth,
            0,
            format!(
                "Summing over values of {}: [{}]",
                variable.name,
                variable.domain.join(", ")
            ),
        );
    }

    fn term(&mut self, depth: usize, variable: &str, value: &str, term: f64) {
        let term = self.num(term);
        self.push(depth, 2, format!("Term for {}={}: {}", variable, value, term));
    }

    fn sum_finished(&mut self, depth: usize, variable: &str, total: f64) {
        let total = self.num(total);
        self.push(depth, 0, format!("Total for {}: {}", variable, total));
    }

    fn query_finished(&mut self, distribution: &Distribution) {
        self.lines.push(String::new());
        let entries = distribution
            .iter()
            .map(|(value, p)| format!("{}={}", value, self.num(p)))
            .collect::<Vec<_>>()
            .join(", ");
        self.lines.push(format!(
            "Normalized P({}): {}",
            distribution.variable(),
            entries
        ));
    }
}
