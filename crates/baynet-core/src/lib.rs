//! # Baynet Core
//!
//! Exact inference by enumeration over discrete Bayesian networks.
//!
//! ## Usage
//!
//! ```rust
//! use baynet_core::{enumeration_ask, CptRow, Evidence, NetworkBuilder};
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
//!     .build()?;
//!
//! let posterior = enumeration_ask(&network, "rain", &Evidence::new().with("appointment", "miss"))?;
//! assert!((posterior.get("heavy").unwrap() - 0.72).abs() < 1e-9);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]

pub mod engine;

// Re-export commonly used types
pub use engine::batch::{enumeration_ask_batch, Query};
pub use engine::distribution::Distribution;
pub use engine::enumeration::{
    enumerate_all, enumerate_all_with_observer, enumeration_ask, enumeration_ask_traced,
    enumeration_ask_with_config, enumeration_ask_with_diagnostics, enumeration_ask_with_observer,
    EnumerationConfig, VariableOrder,
};
pub use engine::errors::{InferenceError, NetworkError};
pub use engine::evidence::Evidence;
pub use engine::lint::CptWarning;
pub use engine::network::{Cpt, CptRow, Network, NetworkBuilder, Variable};
pub use engine::observer::{
    DiagnosticsRecorder, EnumerationDiagnostics, InferenceObserver, Lookup, NoopObserver,
    TraceRecorder,
};
pub use engine::probability::probability;
