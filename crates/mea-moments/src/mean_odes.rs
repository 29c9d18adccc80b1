use mea_core::errors::{ErrorInfo, MeaError};
use mea_sym::ExprMatrix;
use tracing::debug;

use crate::counter::Counter;
use crate::network::ReactionNetwork;
use crate::taylor::mean_row;

/// Builds the raw-moment (mean) derivative matrix.
///
/// Row `s` holds the Taylor coefficients of `d mean_s / dt = Σ_r S_{s,r} a_r`,
/// one column per entry of `central`. Column zero (the order-zero entry) is
/// the drift itself evaluated at the means.
pub fn derive_mean_odes(network: &ReactionNetwork, central: &Counter) -> Result<ExprMatrix, MeaError> {
    if central.dim() != network.species_count() {
        return Err(MeaError::Shape(
            ErrorInfo::new(
                "counter-dimension",
                "central counter dimension must equal the species count",
            )
            .with_context("counter", central.dim().to_string())
            .with_context("species", network.species_count().to_string()),
        ));
    }
    let mut entries = Vec::with_capacity(network.species_count() * central.len());
    for (species, symbol) in network.species().iter().enumerate() {
        debug!(species = %symbol, "deriving mean equation");
        let row = mean_row(network, species, central)
            .map_err(|err| err.with_context("species", symbol.name()))?;
        entries.extend(row);
    }
    ExprMatrix::new(network.species_count(), central.len(), entries)
}
