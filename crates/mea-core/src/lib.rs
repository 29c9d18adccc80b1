#![deny(missing_docs)]
#![doc = "Shared error, provenance and seeding types for the MEA workspace."]

pub mod errors;
pub mod provenance;
pub mod rng;

pub use errors::{ErrorInfo, MeaError};
pub use provenance::{DerivationProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};

/// Convenience alias used throughout the workspace.
pub type MeaResult<T> = Result<T, MeaError>;
