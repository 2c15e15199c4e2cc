//! Evidence: observed variable assignments for one query.
//!
//! Evidence is extended by copy. The enumeration engine never mutates the
//! evidence it was handed, so sibling branches of the recursion cannot see each
//! other's hypothetical assignments.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::engine::errors::InferenceError;
use crate::engine::network::Network;

/// A set of `variable = value` assignments, iterated in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Evidence {
    assignments: BTreeMap<Arc<str>, Arc<str>>,
}

impl Evidence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `variable = value`, replacing any previous value of `variable`.
    pub fn with(mut self, variable: impl Into<Arc<str>>, value: impl Into<Arc<str>>) -> Self {
        self.assignments.insert(variable.into(), value.into());
        self
    }

    /// Returns a copy of this evidence extended with `variable = value`.
    pub fn extended(&self, variable: &Arc<str>, value: &Arc<str>) -> Self {
        let mut assignments = self.assignments.clone();
        assignments.insert(variable.clone(), value.clone());
        Self { assignments }
    }

    pub fn get(&self, variable: &str) -> Option<&Arc<str>> {
        self.assignments.get(variable)
    }

    pub fn contains(&self, variable: &str) -> bool {
        self.assignments.contains_key(variable)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Arc<str>, &Arc<str>)> {
        self.assignments.iter()
    }

    /// Values of `parents` that are assigned, positionally aligned with `parents`.
    pub fn parent_values<'a>(&'a self, parents: &[Arc<str>]) -> SmallVec<[Option<&'a str>; 4]> {
        parents
            .iter()
            .map(|parent| self.get(parent).map(|v| &**v))
            .collect()
    }

    /// `parent=value` pairs for the assigned subset of `parents`, in parent order.
    pub fn describe_parents(&self, parents: &[Arc<str>]) -> String {
        parents
            .iter()
            .filter_map(|parent| self.get(parent).map(|value| format!("{}={}", parent, value)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Checks every assignment against the network's variables and domains.
    pub fn validate(&self, network: &Network) -> Result<(), InferenceError> {
        for (variable, value) in &self.assignments {
            let var = network
                .variable(variable)
                .ok_or_else(|| InferenceError::UnknownVariable(variable.to_string()))?;
            if !var.has_value(value) {
                return Err(InferenceError::UnknownValue {
                    variable: variable.to_string(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl<K, V> FromIterator<(K, V)> for Evidence
where
    K: Into<Arc<str>>,
    V: Into<Arc<str>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            assignments: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (idx, (variable, value)) in self.assignments.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", variable, value)?;
        }
        write!(f, "}}")
    }
}
