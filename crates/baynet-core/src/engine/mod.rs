//! The inference engine for discrete Bayesian networks.
//!
//! This module provides:
//! - **errors**: Error types for construction and query failures
//! - **network**: Immutable network structure, builder and topological order
//! - **evidence**: Copy-on-extend variable assignments
//! - **probability**: CPT lookup with partial parent matching
//! - **enumeration**: Recursive enumeration and the query entry points
//! - **observer**: Trace and diagnostics observers of the engine
//! - **distribution**: Normalized posterior distributions
//! - **lint**: Non-fatal CPT checks
//! - **batch**: Independent queries against a shared network

pub mod batch;
pub mod distribution;
pub mod enumeration;
pub mod errors;
pub mod evidence;
pub mod lint;
pub mod network;
pub mod observer;
pub mod probability;
