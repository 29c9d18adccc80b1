use std::collections::BTreeMap;

use mea_core::errors::{ErrorInfo, MeaError};
use mea_core::provenance::{DerivationProvenance, SchemaVersion};
use mea_sym::{Expr, ExprMatrix};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::central::derive_central_with;
use crate::counter::Counter;
use crate::hash::{hash_counters, hash_equations, hash_network};
use crate::mean_odes::derive_mean_odes;
use crate::moment::Descriptor;
use crate::network::ReactionNetwork;
use crate::params::DeriveOpts;

/// Summary of a moment system derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationReport {
    /// Schema of the serialised system.
    pub schema: SchemaVersion,
    /// Number of species.
    pub species_count: usize,
    /// Number of reactions.
    pub reaction_count: usize,
    /// Size of the raw counter.
    pub raw_moments: usize,
    /// Size of the central counter, including the order-zero entry.
    pub central_moments: usize,
    /// Number of derived equations (means plus central moments).
    pub equations: usize,
    /// Total additive terms across all derived entries.
    pub total_terms: usize,
    /// Input hashes and tool versions.
    pub provenance: DerivationProvenance,
    /// Content hash of the derived equations.
    pub system_hash: String,
}

/// Mean and central-moment equations derived for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MomentSystem {
    /// Reaction network the system was derived from.
    pub network: ReactionNetwork,
    /// Raw moments of orders `0..=max_order`.
    pub raw_counter: Counter,
    /// Central moments of order zero and `2..=max_order`.
    pub central_counter: Counter,
    /// Mean derivative matrix, one row per species.
    pub mean_derivatives: ExprMatrix,
    /// Central derivative matrix, one row per central moment of order two or more.
    pub central_derivatives: ExprMatrix,
    /// Equation labels: means first, then central moments.
    pub descriptors: Vec<Descriptor>,
    /// Covariance-matrix labels for the second-order central moments.
    pub variance_terms: Vec<Descriptor>,
    /// Derivation summary.
    pub report: DerivationReport,
}

impl MomentSystem {
    /// Derives the mean and central-moment equations of `network` up to `max_order`.
    #[instrument(skip(network, opts), fields(species = network.species_count()))]
    pub fn build(
        network: &ReactionNetwork,
        max_order: u32,
        opts: &DeriveOpts,
    ) -> Result<Self, MeaError> {
        let opts = opts.sanitised();
        if max_order == 0 {
            return Err(MeaError::Configuration(
                ErrorInfo::new("max-order", "moment systems need at least the means")
                    .with_context("max_order", "0"),
            ));
        }
        if max_order > opts.max_order_guard {
            return Err(MeaError::Configuration(
                ErrorInfo::new("order-guard", "requested order exceeds the configured guard")
                    .with_context("max_order", max_order.to_string())
                    .with_context("guard", opts.max_order_guard.to_string()),
            ));
        }

        let raw_counter = Counter::raw(network.species(), max_order);
        let central_counter = Counter::central(network.species_count(), max_order);
        let mean_derivatives = derive_mean_odes(network, &central_counter)?;
        let central_derivatives = derive_central_with(
            &central_counter,
            &raw_counter,
            &mean_derivatives,
            network,
            &opts,
        )?;

        let mut descriptors: Vec<Descriptor> = raw_counter
            .of_order(1)
            .map(|moment| Descriptor::RawMoment {
                moment: moment.clone(),
            })
            .collect();
        // Means appear in species order, matching the mean matrix rows.
        descriptors.sort_by_key(|descriptor| {
            descriptor
                .n_vector()
                .and_then(|index| index.unit_species())
                .unwrap_or(usize::MAX)
        });
        descriptors.extend(
            central_counter
                .iter()
                .filter(|moment| moment.order() >= 2)
                .map(|moment| Descriptor::CentralMoment {
                    moment: moment.clone(),
                }),
        );
        let variance_terms = central_counter
            .of_order(2)
            .filter_map(Descriptor::variance_term)
            .collect();

        let mut tool_versions = BTreeMap::new();
        tool_versions.insert(
            "mea-moments".to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        );
        let provenance = DerivationProvenance {
            network_hash: hash_network(network)?,
            counter_hash: hash_counters(&central_counter, &raw_counter)?,
            max_order,
            tool_versions,
        };
        let total_terms = mean_derivatives
            .iter_rows()
            .chain(central_derivatives.iter_rows())
            .flatten()
            .map(Expr::term_count)
            .sum();
        let mut report = DerivationReport {
            schema: SchemaVersion::default(),
            species_count: network.species_count(),
            reaction_count: network.reaction_count(),
            raw_moments: raw_counter.len(),
            central_moments: central_counter.len(),
            equations: descriptors.len(),
            total_terms,
            provenance,
            system_hash: String::new(),
        };
        report.system_hash = hash_equations(&descriptors, &mean_derivatives, &central_derivatives)?;
        info!(
            equations = report.equations,
            total_terms = report.total_terms,
            "moment system assembled"
        );

        Ok(Self {
            network: network.clone(),
            raw_counter,
            central_counter,
            mean_derivatives,
            central_derivatives,
            descriptors,
            variance_terms,
            report,
        })
    }

    /// Right-hand sides of all equations in descriptor order.
    ///
    /// Each row of the derivative matrices is contracted with the central
    /// moment symbols; the order-zero column stands for the constant one.
    pub fn right_hand_sides(&self) -> Vec<Expr> {
        let weights: Vec<Expr> = self
            .central_counter
            .iter()
            .map(|moment| {
                if moment.order() == 0 {
                    Expr::one()
                } else {
                    moment.expr()
                }
            })
            .collect();
        self.mean_derivatives
            .iter_rows()
            .chain(self.central_derivatives.iter_rows())
            .map(|row| {
                Expr::sum(
                    row.iter()
                        .zip(&weights)
                        .map(|(entry, weight)| entry * weight),
                )
                .simplify()
            })
            .collect()
    }
}
