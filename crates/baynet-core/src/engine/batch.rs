//! Batches of independent queries against one network.
//!
//! Queries share the network read-only and own their evidence, so they need no
//! synchronization. With the `parallel` feature they run on the rayon pool;
//! otherwise they run one after another. Either way results line up with the
//! input slice.

use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::engine::distribution::Distribution;
use crate::engine::enumeration::enumeration_ask;
use crate::engine::errors::InferenceError;
use crate::engine::evidence::Evidence;
use crate::engine::network::Network;

/// A query variable together with the evidence to condition on.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Query {
    pub variable: Arc<str>,
    pub evidence: Evidence,
}

impl Query {
    pub fn new(variable: impl Into<Arc<str>>, evidence: Evidence) -> Self {
        Self {
            variable: variable.into(),
            evidence,
        }
    }
}

/// Answers every query in `queries`.
#[cfg(feature = "parallel")]
pub fn enumeration_ask_batch(
    network: &Network,
    queries: &[Query],
) -> Vec<Result<Distribution, InferenceError>> {
    queries
        .par_iter()
        .map(|query| enumeration_ask(network, &query.variable, &query.evidence))
        .collect()
}

/// Answers every query in `queries`.
#[cfg(not(feature = "parallel"))]
pub fn enumeration_ask_batch(
    network: &Network,
    queries: &[Query],
) -> Vec<Result<Distribution, InferenceError>> {
    queries
        .iter()
        .map(|query| enumeration_ask(network, &query.variable, &query.evidence))
        .collect()
}
