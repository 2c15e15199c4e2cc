//! # Bayesian network structure
//!
//! Immutable description of a discrete Bayesian network: variables, their ordered
//! parent lists, their domains and their conditional probability tables.
//!
//! ## Design
//!
//! - CPT rows are tagged records ([`CptRow`]): parent values are stored positionally,
//!   aligned with the variable's declared parents, and kept apart from the per-value
//!   probabilities. Lookups never have to tell parent keys from value keys.
//! - A topological order is computed once by [`NetworkBuilder::build`], which also
//!   rejects cycles, and is cached for every query against the network.
//! - Name lookups go through an `FxHashMap` index; variables keep declaration order.
//!
//! ## Example
//!
//! ```rust
//! use baynet_core::engine::network::{CptRow, NetworkBuilder};
//!
//! let network = NetworkBuilder::new()
//!     .root("rain", [("none", 0.7), ("heavy", 0.3)])
//!     .variable(
//!         "appointment",
//!         ["rain"],
//!         ["attend", "miss"],
//!         [
//!             CptRow::new(["none"], [("attend", 0.9), ("miss", 0.1)]),
//!             CptRow::new(["heavy"], [("attend", 0.4), ("miss", 0.6)]),
//!         ],
//!     )
//!     .build()
//!     .expect("valid network");
//! assert_eq!(network.len(), 2);
//! ```

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::engine::errors::NetworkError;

/// Ordered parent names of a variable. Most variables have a handful of parents.
pub type Parents = SmallVec<[Arc<str>; 4]>;

/// One row of a conditional probability table.
///
/// `parent_values[i]` is the value of the variable's `i`-th declared parent.
#[derive(Debug, Clone, PartialEq)]
pub struct CptRow {
    pub parent_values: Parents,
    pub probabilities: FxHashMap<Arc<str>, f64>,
}

impl CptRow {
    pub fn new<P, V, K>(parent_values: P, probabilities: V) -> Self
    where
        P: IntoIterator,
        P::Item: Into<Arc<str>>,
        V: IntoIterator<Item = (K, f64)>,
        K: Into<Arc<str>>,
    {
        Self {
            parent_values: parent_values.into_iter().map(Into::into).collect(),
            probabilities: probabilities
                .into_iter()
                .map(|(value, p)| (value.into(), p))
                .collect(),
        }
    }

    /// True when every parent present in `assigned` agrees with this row.
    ///
    /// `assigned[i]` is `None` when the `i`-th parent has no value yet; such
    /// parents are ignored.
    pub fn matches(&self, assigned: &[Option<&str>]) -> bool {
        self.parent_values
            .iter()
            .zip(assigned)
            .all(|(recorded, given)| given.map_or(true, |v| &**recorded == v))
    }
}

/// Conditional probability table of one variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Cpt {
    /// Unconditional distribution of a root variable.
    Prior(FxHashMap<Arc<str>, f64>),
    /// Rows keyed by parent-value combination, scanned in order.
    Table(Vec<CptRow>),
}

/// A discrete random variable of the network.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: Arc<str>,
    pub parents: Parents,
    pub domain: Vec<Arc<str>>,
    pub cpt: Cpt,
}

impl Variable {
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn has_value(&self, value: &str) -> bool {
        self.domain.iter().any(|v| &**v == value)
    }
}

/// An immutable, validated Bayesian network.
///
/// `Network` is `Send + Sync`; any number of queries may share one instance.
#[derive(Debug, Clone)]
pub struct Network {
    variables: Vec<Variable>,
    index: FxHashMap<Arc<str>, usize>,
    children: Vec<SmallVec<[usize; 4]>>,
    order: Vec<Arc<str>>,
}

impl Network {
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Variables in declaration order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.index.get(name).map(|&idx| &self.variables[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn parents(&self, name: &str) -> Option<&[Arc<str>]> {
        self.variable(name).map(|v| v.parents.as_slice())
    }

    pub fn domain(&self, name: &str) -> Option<&[Arc<str>]> {
        self.variable(name).map(|v| v.domain.as_slice())
    }

    pub fn cpt(&self, name: &str) -> Option<&Cpt> {
        self.variable(name).map(|v| &v.cpt)
    }

    /// Direct children of `name`, in declaration order.
    pub fn children(&self, name: &str) -> Vec<&Arc<str>> {
        self.index
            .get(name)
            .map(|&idx| {
                self.children[idx]
                    .iter()
                    .map(|&child| &self.variables[child].name)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Cached topological order (parents before children).
    ///
    /// Ties are broken by declaration order, so the order is stable for a given
    /// builder sequence.
    pub fn topological_order(&self) -> &[Arc<str>] {
        &self.order
    }

    /// Checks that `order` is a permutation of the network's variables in which
    /// every parent precedes its children.
    pub fn check_order(&self, order: &[Arc<str>]) -> Result<(), String> {
        if order.len() != self.variables.len() {
            return Err(format!(
                "order lists {} variables, network has {}",
                order.len(),
                self.variables.len()
            ));
        }
        let mut seen: HashSet<&str> = HashSet::with_capacity(order.len());
        for name in order {
            let variable = self
                .variable(name)
                .ok_or_else(|| format!("unknown variable '{}'", name))?;
            if let Some(parent) = variable.parents.iter().find(|p| !seen.contains(&***p)) {
                return Err(format!("'{}' appears before its parent '{}'", name, parent));
            }
            if !seen.insert(&**name) {
                return Err(format!("'{}' appears more than once", name));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for variable in &self.variables {
            write!(f, "{} {{{}}}", variable.name, variable.domain.join(", "))?;
            if !variable.parents.is_empty() {
                write!(f, " <- {}", variable.parents.join(", "))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum TableDecl {
    Prior(Vec<(Arc<str>, f64)>),
    Rows(Vec<CptRow>),
}

#[derive(Debug, Clone)]
struct VariableDecl {
    name: Arc<str>,
    parents: Parents,
    domain: Vec<Arc<str>>,
    table: TableDecl,
}

/// Collects variable declarations and validates them into a [`Network`].
#[derive(Debug, Clone, Default)]
pub struct NetworkBuilder {
    decls: Vec<VariableDecl>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a root variable. The domain follows the order of `priors`.
    pub fn root<N, I, K>(mut self, name: N, priors: I) -> Self
    where
        N: Into<Arc<str>>,
        I: IntoIterator<Item = (K, f64)>,
        K: Into<Arc<str>>,
    {
        let priors: Vec<(Arc<str>, f64)> =
            priors.into_iter().map(|(v, p)| (v.into(), p)).collect();
        self.decls.push(VariableDecl {
            name: name.into(),
            parents: Parents::new(),
            domain: priors.iter().map(|(v, _)| v.clone()).collect(),
            table: TableDecl::Prior(priors),
        });
        self
    }

    /// Declares a variable with an explicit domain and CPT rows.
    ///
    /// With no parents, at most one row (with no parent values) is expected and
    /// it becomes the variable's prior.
    pub fn variable<N, P, D, R>(mut self, name: N, parents: P, domain: D, rows: R) -> Self
    where
        N: Into<Arc<str>>,
        P: IntoIterator,
        P::Item: Into<Arc<str>>,
        D: IntoIterator,
        D::Item: Into<Arc<str>>,
        R: IntoIterator<Item = CptRow>,
    {
        self.decls.push(VariableDecl {
            name: name.into(),
            parents: parents.into_iter().map(Into::into).collect(),
            domain: domain.into_iter().map(Into::into).collect(),
            table: TableDecl::Rows(rows.into_iter().collect()),
        });
        self
    }

    /// Validates the declarations and computes the topological order.
    pub fn build(self) -> Result<Network, NetworkError> {
        let mut index: FxHashMap<Arc<str>, usize> = FxHashMap::default();
        for (idx, decl) in self.decls.iter().enumerate() {
            if index.insert(decl.name.clone(), idx).is_some() {
                return Err(NetworkError::DuplicateVariable(decl.name.to_string()));
            }
        }

        for decl in &self.decls {
            check_domain(decl)?;
            for parent in &decl.parents {
                if !index.contains_key(parent) {
                    return Err(NetworkError::UnknownParent {
                        variable: decl.name.to_string(),
                        parent: parent.to_string(),
                    });
                }
            }
        }

        let mut variables = Vec::with_capacity(self.decls.len());
        for decl in &self.decls {
            let cpt = build_cpt(decl, &self.decls, &index)?;
            variables.push(Variable {
                name: decl.name.clone(),
                parents: decl.parents.clone(),
                domain: decl.domain.clone(),
                cpt,
            });
        }

        let mut children = vec![SmallVec::<[usize; 4]>::new(); variables.len()];
        for (idx, variable) in variables.iter().enumerate() {
            for parent in &variable.parents {
                children[index[parent]].push(idx);
            }
        }

        let order = topological_order(&variables, &index, &children)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Built network with {} variables, order: {}",
            variables.len(),
            order.join(", ")
        );

        Ok(Network {
            variables,
            index,
            children,
            order,
        })
    }
}

fn check_domain(decl: &VariableDecl) -> Result<(), NetworkError> {
    if decl.domain.is_empty() {
        return Err(NetworkError::EmptyDomain(decl.name.to_string()));
    }
    let mut seen = HashSet::with_capacity(decl.domain.len());
    for value in &decl.domain {
        if !seen.insert(value) {
            return Err(NetworkError::DuplicateValue {
                variable: decl.name.to_string(),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

fn check_probabilities<'a>(
    decl: &VariableDecl,
    entries: impl IntoIterator<Item = (&'a Arc<str>, f64)>,
) -> Result<(), NetworkError> {
    for (value, p) in entries {
        if !decl.domain.contains(value) {
            return Err(NetworkError::UnknownValue {
                variable: decl.name.to_string(),
                value: value.to_string(),
            });
        }
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(NetworkError::InvalidProbability {
                variable: decl.name.to_string(),
                value: value.to_string(),
                probability: p,
            });
        }
    }
    Ok(())
}

fn build_cpt(
    decl: &VariableDecl,
    decls: &[VariableDecl],
    index: &FxHashMap<Arc<str>, usize>,
) -> Result<Cpt, NetworkError> {
    let rows = match &decl.table {
        TableDecl::Prior(priors) => {
            check_probabilities(decl, priors.iter().map(|(v, p)| (v, *p)))?;
            return Ok(Cpt::Prior(priors.iter().cloned().collect()));
        }
        TableDecl::Rows(rows) => rows,
    };

    let mut combinations: HashSet<&[Arc<str>]> = HashSet::with_capacity(rows.len());
    for (row_idx, row) in rows.iter().enumerate() {
        if row.parent_values.len() != decl.parents.len() {
            return Err(NetworkError::RowShape {
                variable: decl.name.to_string(),
                row: row_idx,
                expected: decl.parents.len(),
                found: row.parent_values.len(),
            });
        }
        for (parent, value) in decl.parents.iter().zip(&row.parent_values) {
            let parent_decl = &decls[index[parent]];
            if !parent_decl.domain.contains(value) {
                return Err(NetworkError::UnknownParentValue {
                    variable: decl.name.to_string(),
                    row: row_idx,
                    parent: parent.to_string(),
                    value: value.to_string(),
                });
            }
        }
        if !combinations.insert(row.parent_values.as_slice()) {
            return Err(NetworkError::DuplicateRow {
                variable: decl.name.to_string(),
                parents: describe_combination(&decl.parents, &row.parent_values),
            });
        }
        check_probabilities(decl, row.probabilities.iter().map(|(v, p)| (v, *p)))?;
    }

    if decl.parents.is_empty() {
        let prior = rows
            .first()
            .map(|row| row.probabilities.clone())
            .unwrap_or_default();
        return Ok(Cpt::Prior(prior));
    }
    Ok(Cpt::Table(rows.clone()))
}

fn topological_order(
    variables: &[Variable],
    index: &FxHashMap<Arc<str>, usize>,
    children: &[SmallVec<[usize; 4]>],
) -> Result<Vec<Arc<str>>, NetworkError> {
    let mut in_degree: Vec<usize> = variables.iter().map(|v| v.parents.len()).collect();
    let mut ready: BTreeSet<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|&(_, &degree)| degree == 0)
        .map(|(idx, _)| idx)
        .collect();

    let mut order = Vec::with_capacity(variables.len());
    while let Some(idx) = ready.pop_first() {
        order.push(variables[idx].name.clone());
        for &child in &children[idx] {
            in_degree[child] = in_degree[child].saturating_sub(1);
            if in_degree[child] == 0 {
                ready.insert(child);
            }
        }
    }

    if order.len() != variables.len() {
        let placed: HashSet<usize> = order.iter().map(|name| index[name]).collect();
        let variables = variables
            .iter()
            .enumerate()
            .filter(|(idx, _)| !placed.contains(idx))
            .map(|(_, v)| v.name.to_string())
            .collect();
        return Err(NetworkError::Cycle { variables });
    }
    Ok(order)
}

pub(crate) fn describe_combination(parents: &[Arc<str>], values: &[Arc<str>]) -> String {
    parents
        .iter()
        .zip(values)
        .map(|(p, v)| format!("{}={}", p, v))
        .collect::<Vec<_>>()
        .join(", ")
}
