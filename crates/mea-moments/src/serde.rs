use mea_core::errors::{ErrorInfo, MeaError};
use mea_sym::ExprMatrix;

use crate::counter::Counter;
use crate::network::{ModelConfig, ReactionNetwork};
use crate::system::MomentSystem;

fn map_err(err: serde_json::Error, code: &str) -> MeaError {
    MeaError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Serialises a moment system to JSON.
pub fn system_to_json(system: &MomentSystem) -> Result<String, MeaError> {
    serde_json::to_string_pretty(system).map_err(|err| map_err(err, "moment-system-serialize"))
}

/// Restores a moment system from JSON.
pub fn system_from_json(json: &str) -> Result<MomentSystem, MeaError> {
    serde_json::from_str(json).map_err(|err| map_err(err, "moment-system-deserialize"))
}

/// Serialises a reaction network to JSON.
pub fn network_to_json(network: &ReactionNetwork) -> Result<String, MeaError> {
    serde_json::to_string_pretty(network).map_err(|err| map_err(err, "network-serialize"))
}

/// Restores a reaction network from JSON, re-validating its shape.
pub fn network_from_json(json: &str) -> Result<ReactionNetwork, MeaError> {
    serde_json::from_str(json).map_err(|err| map_err(err, "network-deserialize"))
}

/// Serialises a counter to JSON.
pub fn counter_to_json(counter: &Counter) -> Result<String, MeaError> {
    serde_json::to_string_pretty(counter).map_err(|err| map_err(err, "counter-serialize"))
}

/// Restores a counter from JSON.
pub fn counter_from_json(json: &str) -> Result<Counter, MeaError> {
    serde_json::from_str(json).map_err(|err| map_err(err, "counter-deserialize"))
}

/// Serialises an expression matrix to JSON.
pub fn matrix_to_json(matrix: &ExprMatrix) -> Result<String, MeaError> {
    serde_json::to_string_pretty(matrix).map_err(|err| map_err(err, "matrix-serialize"))
}

/// Restores an expression matrix from JSON.
pub fn matrix_from_json(json: &str) -> Result<ExprMatrix, MeaError> {
    serde_json::from_str(json).map_err(|err| map_err(err, "matrix-deserialize"))
}

/// Restores a model description from JSON.
pub fn model_from_json(json: &str) -> Result<ModelConfig, MeaError> {
    serde_json::from_str(json).map_err(|err| map_err(err, "model-deserialize"))
}
