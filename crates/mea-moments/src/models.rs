//! Built-in reaction networks.

use mea_core::errors::{ErrorInfo, MeaError};

use crate::network::{ModelConfig, ReactionNetwork};

/// Names accepted by [`builtin`].
pub const BUILTIN_MODELS: [&str; 4] = ["p53", "michaelis-menten", "birth", "symmetric-dimer"];

fn config(
    name: &str,
    description: &str,
    species: &[&str],
    propensities: &[&str],
    stoichiometry: &[&[i64]],
) -> ModelConfig {
    ModelConfig {
        name: Some(name.to_string()),
        description: Some(description.to_string()),
        species: species.iter().map(|s| s.to_string()).collect(),
        propensities: propensities.iter().map(|p| p.to_string()).collect(),
        stoichiometry: stoichiometry.iter().map(|row| row.to_vec()).collect(),
    }
}

/// Description of a built-in model by name.
pub fn builtin_config(name: &str) -> Option<ModelConfig> {
    let model = match name {
        "p53" => config(
            "p53",
            "p53 / Mdm2 negative feedback oscillator",
            &["y_0", "y_1", "y_2"],
            &[
                "c_0",
                "c_1*y_0",
                "c_2*y_0*y_2/(c_6 + y_0)",
                "c_3*y_0",
                "c_4*y_1",
                "c_5*y_2",
            ],
            &[&[1, -1, -1, 0, 0, 0], &[0, 0, 0, 1, -1, 0], &[0, 0, 0, 0, 1, -1]],
        ),
        "michaelis-menten" => config(
            "michaelis-menten",
            "Michaelis-Menten enzyme kinetics with conserved totals",
            &["y_0", "y_1"],
            &[
                "c_0*y_0*(y_0 + y_1 - 181)",
                "c_1*(-y_0 - y_1 + 301)",
                "c_2*(-y_0 - y_1 + 301)",
            ],
            &[&[-1, 1, 0], &[0, 0, 1]],
        ),
        "birth" => config(
            "birth",
            "constant-rate birth process",
            &["y_0"],
            &["k_0"],
            &[&[1]],
        ),
        "symmetric-dimer" => config(
            "symmetric-dimer",
            "two interchangeable species with production, decay and dimerisation",
            &["y_0", "y_1"],
            &["k_0", "k_0", "k_1*y_0", "k_1*y_1", "k_2*y_0*y_1"],
            &[&[1, 0, -1, 0, -1], &[0, 1, 0, -1, -1]],
        ),
        _ => return None,
    };
    Some(model)
}

/// Validated built-in network by name.
pub fn builtin(name: &str) -> Result<ReactionNetwork, MeaError> {
    builtin_config(name)
        .ok_or_else(|| {
            MeaError::Configuration(
                ErrorInfo::new("unknown-model", format!("no built-in model named '{name}'"))
                    .with_hint(format!("available: {}", BUILTIN_MODELS.join(", "))),
            )
        })?
        .to_network()
}

/// The three-species p53 oscillator.
pub fn p53() -> Result<ReactionNetwork, MeaError> {
    builtin("p53")
}

/// The two-species Michaelis-Menten model.
pub fn michaelis_menten() -> Result<ReactionNetwork, MeaError> {
    builtin("michaelis-menten")
}

/// A single species born at constant rate `k_0`.
pub fn birth() -> Result<ReactionNetwork, MeaError> {
    builtin("birth")
}

/// Two species that are exchanged by swapping `y_0` and `y_1`.
pub fn symmetric_dimer() -> Result<ReactionNetwork, MeaError> {
    builtin("symmetric-dimer")
}
