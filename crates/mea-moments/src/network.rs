use std::collections::BTreeSet;

use mea_core::errors::{ErrorInfo, MeaError};
use mea_sym::{parse_expr, Expr, Symbol};
use serde::{Deserialize, Serialize};

/// Species, propensities and stoichiometry of a chemical reaction network.
///
/// Construction validates that the stoichiometry matrix is `S x R` for `S`
/// species and `R` propensities and that species symbols are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NetworkParts")]
pub struct ReactionNetwork {
    species: Vec<Symbol>,
    propensities: Vec<Expr>,
    stoichiometry: Vec<Vec<i64>>,
}

#[derive(Deserialize)]
struct NetworkParts {
    species: Vec<Symbol>,
    propensities: Vec<Expr>,
    stoichiometry: Vec<Vec<i64>>,
}

impl TryFrom<NetworkParts> for ReactionNetwork {
    type Error = MeaError;

    fn try_from(parts: NetworkParts) -> Result<Self, Self::Error> {
        ReactionNetwork::new(parts.species, parts.propensities, parts.stoichiometry)
    }
}

impl ReactionNetwork {
    /// Validates and builds a network.
    pub fn new(
        species: Vec<Symbol>,
        propensities: Vec<Expr>,
        stoichiometry: Vec<Vec<i64>>,
    ) -> Result<Self, MeaError> {
        if stoichiometry.len() != species.len() {
            return Err(MeaError::Shape(
                ErrorInfo::new(
                    "stoichiometry-rows",
                    "stoichiometry row count must equal the species count",
                )
                .with_context("rows", stoichiometry.len().to_string())
                .with_context("species", species.len().to_string()),
            ));
        }
        for (row_idx, row) in stoichiometry.iter().enumerate() {
            if row.len() != propensities.len() {
                return Err(MeaError::Shape(
                    ErrorInfo::new(
                        "stoichiometry-cols",
                        "stoichiometry column count must equal the propensity count",
                    )
                    .with_context("row", row_idx.to_string())
                    .with_context("cols", row.len().to_string())
                    .with_context("propensities", propensities.len().to_string()),
                ));
            }
        }
        let mut seen = BTreeSet::new();
        for symbol in &species {
            if !seen.insert(symbol) {
                return Err(MeaError::Configuration(
                    ErrorInfo::new("duplicate-species", "species symbols must be unique")
                        .with_context("species", symbol.name()),
                ));
            }
        }
        Ok(Self {
            species,
            propensities,
            stoichiometry,
        })
    }

    /// Species symbols in order.
    pub fn species(&self) -> &[Symbol] {
        &self.species
    }

    /// Propensity expressions in reaction order.
    pub fn propensities(&self) -> &[Expr] {
        &self.propensities
    }

    /// Stoichiometry rows, one per species.
    pub fn stoichiometry(&self) -> &[Vec<i64>] {
        &self.stoichiometry
    }

    /// Net change of `species` per firing of `reaction`; zero out of range.
    pub fn change(&self, species: usize, reaction: usize) -> i64 {
        self.stoichiometry
            .get(species)
            .and_then(|row| row.get(reaction))
            .copied()
            .unwrap_or(0)
    }

    /// Number of species `S`.
    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    /// Number of reactions `R`.
    pub fn reaction_count(&self) -> usize {
        self.propensities.len()
    }

    /// Species symbols as expressions.
    pub fn species_exprs(&self) -> Vec<Expr> {
        self.species.iter().map(Symbol::to_expr).collect()
    }

    /// Symbols appearing in propensities that are not species (rate constants).
    pub fn parameters(&self) -> BTreeSet<Symbol> {
        let species: BTreeSet<&Symbol> = self.species.iter().collect();
        self.propensities
            .iter()
            .flat_map(Expr::free_symbols)
            .filter(|symbol| !species.contains(symbol))
            .collect()
    }

    /// Reaction drift `Σ_r S_{s,r} a_r` of one species.
    pub fn drift(&self, species: usize) -> Expr {
        Expr::sum(
            self.propensities
                .iter()
                .enumerate()
                .filter(|(reaction, _)| self.change(species, *reaction) != 0)
                .map(|(reaction, propensity)| {
                    Expr::int(self.change(species, reaction)) * propensity
                }),
        )
    }
}

/// File representation of a reaction network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Short model name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Species names.
    pub species: Vec<String>,
    /// Propensity expressions in infix notation.
    pub propensities: Vec<String>,
    /// Stoichiometry rows, one per species.
    pub stoichiometry: Vec<Vec<i64>>,
}

impl ModelConfig {
    /// Parses the propensities and validates the network.
    pub fn to_network(&self) -> Result<ReactionNetwork, MeaError> {
        let species = self.species.iter().map(|name| Symbol::new(name.as_str())).collect();
        let propensities = self
            .propensities
            .iter()
            .enumerate()
            .map(|(reaction, text)| {
                parse_expr(text).map_err(|err| err.with_context("reaction", reaction.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        ReactionNetwork::new(species, propensities, self.stoichiometry.clone())
    }

    /// Describes an existing network.
    pub fn from_network(
        name: impl Into<String>,
        description: Option<String>,
        network: &ReactionNetwork,
    ) -> Self {
        Self {
            name: Some(name.into()),
            description,
            species: network
                .species()
                .iter()
                .map(|symbol| symbol.name().to_string())
                .collect(),
            propensities: network
                .propensities()
                .iter()
                .map(ToString::to_string)
                .collect(),
            stoichiometry: network.stoichiometry().to_vec(),
        }
    }
}
