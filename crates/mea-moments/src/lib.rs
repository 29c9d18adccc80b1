#![deny(missing_docs)]
#![doc = "Moment counters, mean equations and the central-moment derivation engine of the Moment Expansion Approximation."]

/// Central-moment derivation engine.
pub mod central;
/// Canonically ordered moment counters.
pub mod counter;
/// Canonical hashing helpers for derived artefacts.
pub mod hash;
/// Mean (first-order raw moment) equations.
pub mod mean_odes;
/// Built-in example networks.
pub mod models;
/// Moment descriptors and equation labels.
pub mod moment;
/// Multi-index combinatorics.
pub mod multi_index;
/// Reaction network descriptors and model files.
pub mod network;
/// Derivation option structures.
pub mod params;
/// Serde helpers for JSON artefacts.
#[path = "serde.rs"]
pub mod serde_io;
/// Whole-system assembly.
pub mod system;
/// Taylor coefficients of network expectations.
pub mod taylor;

pub use central::{derive_central_moment_odes, derive_central_with};
pub use counter::Counter;
pub use mean_odes::derive_mean_odes;
pub use moment::{Descriptor, Moment};
pub use multi_index::MultiIndex;
pub use network::{ModelConfig, ReactionNetwork};
pub use params::DeriveOpts;
pub use system::{DerivationReport, MomentSystem};
