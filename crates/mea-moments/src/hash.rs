use mea_core::errors::{ErrorInfo, MeaError};
use mea_sym::ExprMatrix;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::counter::Counter;
use crate::moment::Descriptor;
use crate::network::ReactionNetwork;

fn hash_json<T: Serialize>(value: &T) -> Result<String, MeaError> {
    let json = serde_json::to_vec(value)
        .map_err(|err| MeaError::Serde(ErrorInfo::new("serialize", err.to_string())))?;
    let mut hasher = Sha256::new();
    hasher.update(json);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Computes the canonical hash of a reaction network.
pub fn hash_network(network: &ReactionNetwork) -> Result<String, MeaError> {
    hash_json(network)
}

/// Computes the canonical hash of a central/raw counter pair.
pub fn hash_counters(central: &Counter, raw: &Counter) -> Result<String, MeaError> {
    #[derive(Serialize)]
    struct Payload<'a> {
        central: &'a Counter,
        raw: &'a Counter,
    }

    hash_json(&Payload { central, raw })
}

/// Computes the content hash of a derived equation system.
pub fn hash_equations(
    descriptors: &[Descriptor],
    mean_derivatives: &ExprMatrix,
    central_derivatives: &ExprMatrix,
) -> Result<String, MeaError> {
    #[derive(Serialize)]
    struct Payload<'a> {
        descriptors: &'a [Descriptor],
        mean_derivatives: &'a ExprMatrix,
        central_derivatives: &'a ExprMatrix,
    }

    hash_json(&Payload {
        descriptors,
        mean_derivatives,
        central_derivatives,
    })
}
