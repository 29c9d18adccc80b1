//! Central-moment derivation engine.
//!
//! A central moment expands into raw moments and powers of the means,
//!
//! `CM_k = Σ_{j ≤ k} C(k, j) (-1)^{|k - j|} Raw(j) Π_s mean_s^{k_s - j_s}`,
//!
//! so its time derivative follows from the product rule once the derivatives
//! of `Raw(j)` and of the mean powers are known. Every derivative is carried as
//! a row of Taylor coefficients aligned with the central counter, which keeps
//! the output in the same column layout as the mean derivative matrix.

use std::collections::{BTreeMap, BTreeSet};

use mea_core::errors::{ErrorInfo, MeaError};
use mea_sym::{Expr, ExprMatrix, Symbol};
use tracing::{debug, info, instrument, trace};

use crate::counter::Counter;
use crate::moment::Moment;
use crate::multi_index::{multinomial, sign, MultiIndex};
use crate::network::ReactionNetwork;
use crate::params::DeriveOpts;
use crate::taylor::raw_moment_row;

/// Derives `d CM_k / dt` for every central moment of order two or more.
///
/// `raw_derivatives` holds one row per species (the mean equations, in species
/// order) and one column per entry of `central`. Raw moments of order two or
/// more are differentiated directly from the reaction network. The order-zero
/// central entry only labels the leading column and produces no row; the
/// output has one row per central moment of order two or more.
pub fn derive_central_moment_odes(
    central: &Counter,
    raw: &Counter,
    raw_derivatives: &ExprMatrix,
    species: &[Symbol],
    propensities: &[Expr],
    stoichiometry: &[Vec<i64>],
) -> Result<ExprMatrix, MeaError> {
    let network = ReactionNetwork::new(
        species.to_vec(),
        propensities.to_vec(),
        stoichiometry.to_vec(),
    )?;
    derive_central_with(central, raw, raw_derivatives, &network, &DeriveOpts::default())
}

/// [`derive_central_moment_odes`] over a validated network with explicit options.
#[instrument(
    skip_all,
    fields(species = network.species_count(), central = central.len(), raw = raw.len())
)]
pub fn derive_central_with(
    central: &Counter,
    raw: &Counter,
    raw_derivatives: &ExprMatrix,
    network: &ReactionNetwork,
    opts: &DeriveOpts,
) -> Result<ExprMatrix, MeaError> {
    let opts = opts.sanitised();
    validate_inputs(central, raw, raw_derivatives, network, &opts)?;

    let means = mean_symbols(raw, network.species_count())?;
    let mut engine = Engine {
        central,
        raw,
        raw_derivatives,
        network,
        means,
        opts: &opts,
        raw_rows: BTreeMap::new(),
    };

    let mut entries = Vec::new();
    let mut row_count = 0usize;
    for moment in central.iter().filter(|moment| moment.order() >= 2) {
        entries.extend(engine.central_row(moment)?);
        row_count += 1;
    }
    let matrix = ExprMatrix::new(row_count, central.len(), entries)?;
    if opts.validate_closure {
        check_closure(&matrix, central, raw, network)?;
    }
    info!(
        rows = matrix.rows(),
        cols = matrix.cols(),
        "derived central moment equations"
    );
    Ok(matrix)
}

fn central_label(moment: &Moment) -> String {
    moment.n_vector.to_string()
}

fn validate_inputs(
    central: &Counter,
    raw: &Counter,
    raw_derivatives: &ExprMatrix,
    network: &ReactionNetwork,
    opts: &DeriveOpts,
) -> Result<(), MeaError> {
    let species = network.species_count();
    for (name, counter) in [("central", central), ("raw", raw)] {
        if counter.dim() != species {
            return Err(MeaError::Shape(
                ErrorInfo::new(
                    "counter-dimension",
                    format!("{name} counter dimension must equal the species count"),
                )
                .with_context("counter", name)
                .with_context("dimension", counter.dim().to_string())
                .with_context("species", species.to_string()),
            ));
        }
    }
    if raw_derivatives.rows() != species {
        return Err(MeaError::Shape(
            ErrorInfo::new(
                "raw-derivative-rows",
                "raw derivative matrix needs one row per species mean",
            )
            .with_context("rows", raw_derivatives.rows().to_string())
            .with_context("species", species.to_string()),
        ));
    }
    if raw_derivatives.cols() != central.len() {
        return Err(MeaError::Shape(
            ErrorInfo::new(
                "raw-derivative-cols",
                "raw derivative matrix needs one column per central counter entry",
            )
            .with_context("cols", raw_derivatives.cols().to_string())
            .with_context("central", central.len().to_string()),
        ));
    }

    for moment in central.iter() {
        if moment.order() == 1 {
            return Err(MeaError::DegenerateMoment(
                ErrorInfo::new(
                    "first-order-central",
                    "first-order central moments vanish and cannot be derived",
                )
                .with_context("central", central_label(moment))
                .with_hint("remove first-order entries from the central counter"),
            ));
        }
        if moment.order() > opts.max_order_guard {
            return Err(MeaError::Configuration(
                ErrorInfo::new("order-guard", "central moment order exceeds the configured guard")
                    .with_context("central", central_label(moment))
                    .with_context("guard", opts.max_order_guard.to_string()),
            ));
        }
        if moment.order() < 2 {
            continue;
        }
        for j in moment.n_vector.sub_indices() {
            if j.order() >= 1 && raw.lookup(&j).is_none() {
                return Err(missing_raw(moment, &j));
            }
        }
    }
    Ok(())
}

fn missing_raw(moment: &Moment, j: &MultiIndex) -> MeaError {
    MeaError::Configuration(
        ErrorInfo::new(
            "missing-raw-moment",
            "sub-index required by a central moment is absent from the raw counter",
        )
        .with_context("central", central_label(moment))
        .with_context("sub_index", j.to_string())
        .with_hint("extend the raw counter to the order of the central counter"),
    )
}

fn mean_symbols(raw: &Counter, species: usize) -> Result<Vec<Expr>, MeaError> {
    (0..species)
        .map(|idx| {
            let unit = MultiIndex::unit(species, idx);
            raw.lookup(&unit).map(Moment::expr).ok_or_else(|| {
                MeaError::Configuration(
                    ErrorInfo::new("missing-mean", "raw counter lacks a first-order moment")
                        .with_context("sub_index", unit.to_string()),
                )
            })
        })
        .collect()
}

fn check_closure(
    matrix: &ExprMatrix,
    central: &Counter,
    raw: &Counter,
    network: &ReactionNetwork,
) -> Result<(), MeaError> {
    let allowed: BTreeSet<&Symbol> = raw
        .iter()
        .map(|moment| &moment.symbol)
        .chain(network.species())
        .collect();
    let forbidden: BTreeSet<&Symbol> = central
        .iter()
        .map(|moment| &moment.symbol)
        .filter(|symbol| !allowed.contains(symbol))
        .collect();
    for (row_idx, row) in matrix.iter_rows().enumerate() {
        for (col_idx, entry) in row.iter().enumerate() {
            if let Some(symbol) = entry
                .free_symbols()
                .into_iter()
                .find(|symbol| forbidden.contains(symbol))
            {
                return Err(MeaError::Symbolic(
                    ErrorInfo::new(
                        "closure-violated",
                        "central moment symbol appears in a derived equation",
                    )
                    .with_context("row", row_idx.to_string())
                    .with_context("col", col_idx.to_string())
                    .with_context("symbol", symbol.name()),
                ));
            }
        }
    }
    Ok(())
}

struct Engine<'a> {
    central: &'a Counter,
    raw: &'a Counter,
    raw_derivatives: &'a ExprMatrix,
    network: &'a ReactionNetwork,
    means: Vec<Expr>,
    opts: &'a DeriveOpts,
    raw_rows: BTreeMap<MultiIndex, Vec<Expr>>,
}

impl Engine<'_> {
    fn central_row(&mut self, moment: &Moment) -> Result<Vec<Expr>, MeaError> {
        let k = &moment.n_vector;
        let sub_indices = k.sub_indices();
        debug!(
            central = %k,
            symbol = %moment.symbol,
            sub_indices = sub_indices.len(),
            "deriving central moment"
        );

        let cols = self.central.len();
        let mut row = vec![Expr::zero(); cols];
        for j in &sub_indices {
            let contribution = self
                .sub_term(k, j)
                .map_err(|err| {
                    err.with_context("central", k.to_string())
                        .with_context("sub_index", j.to_string())
                })?;
            trace!(central = %k, sub_index = %j, "accumulating sub-term");
            for (slot, term) in row.iter_mut().zip(contribution) {
                if term.is_zero() {
                    continue;
                }
                let sum = &*slot + term;
                *slot = if self.opts.simplify_each_term {
                    sum.simplify()
                } else {
                    sum
                };
            }
        }
        row.into_iter()
            .map(|entry| {
                entry
                    .try_simplify()
                    .map_err(|err| err.with_context("central", k.to_string()))
            })
            .collect()
    }

    /// Weighted derivative row of `C(k, j) (-1)^{|k-j|} Raw(j) MeanPow(k - j)`.
    fn sub_term(&mut self, k: &MultiIndex, j: &MultiIndex) -> Result<Vec<Expr>, MeaError> {
        let cols = self.central.len();
        let rest = k.checked_sub(j).ok_or_else(|| {
            MeaError::Symbolic(ErrorInfo::new(
                "sub-index-not-dominated",
                "sub-index exceeds the central multi-index",
            ))
        })?;
        let weight = Expr::number((multinomial(k, j) * sign(k, j)).into());

        let raw_term = if j.order() == 0 {
            Expr::one()
        } else {
            self.raw
                .lookup(j)
                .map(Moment::expr)
                .ok_or_else(|| {
                    MeaError::Configuration(ErrorInfo::new(
                        "missing-raw-moment",
                        "sub-index required by a central moment is absent from the raw counter",
                    ))
                })?
        };
        let mean_power = self.mean_power(&rest);

        let raw_row = self.raw_derivative_row(j)?;
        let mean_power_row = self.mean_power_row(&rest)?;

        (0..cols)
            .map(|col| {
                let from_raw = &mean_power * &raw_row[col];
                let from_means = &raw_term * &mean_power_row[col];
                Expr::product([weight.clone(), from_raw + from_means])
                    .try_simplify()
                    .map_err(|err| err.with_context("col", col.to_string()))
            })
            .collect()
    }

    fn mean_power(&self, exponents: &MultiIndex) -> Expr {
        Expr::product(
            self.means
                .iter()
                .zip(exponents.as_slice())
                .map(|(mean, exponent)| mean.pow(i64::from(*exponent))),
        )
    }

    /// Derivative row of `Raw(j)`: zero for the constant, a mean row for first
    /// order, the network Taylor row otherwise.
    fn raw_derivative_row(&mut self, j: &MultiIndex) -> Result<Vec<Expr>, MeaError> {
        let cols = self.central.len();
        if j.order() == 0 {
            return Ok(vec![Expr::zero(); cols]);
        }
        if let Some(species) = j.unit_species() {
            return self.mean_row(species);
        }
        if let Some(row) = self.raw_rows.get(j) {
            return Ok(row.clone());
        }
        let row = raw_moment_row(self.network, j, self.central)?;
        self.raw_rows.insert(j.clone(), row.clone());
        Ok(row)
    }

    fn mean_row(&self, species: usize) -> Result<Vec<Expr>, MeaError> {
        self.raw_derivatives
            .row(species)
            .map(<[Expr]>::to_vec)
            .ok_or_else(|| {
                MeaError::Shape(
                    ErrorInfo::new("raw-derivative-rows", "missing mean row")
                        .with_context("species", species.to_string()),
                )
            })
    }

    /// Chain rule: `Σ_s m_s · mean^{m - e_s} · d mean_s / dt`.
    fn mean_power_row(&self, exponents: &MultiIndex) -> Result<Vec<Expr>, MeaError> {
        let cols = self.central.len();
        let mut row = vec![Expr::zero(); cols];
        for (species, &exponent) in exponents.as_slice().iter().enumerate() {
            if exponent == 0 {
                continue;
            }
            let mut lowered = exponents.as_slice().to_vec();
            lowered[species] -= 1;
            let partial =
                Expr::int(i64::from(exponent)) * self.mean_power(&MultiIndex::new(lowered));
            let mean_row = self.mean_row(species)?;
            for (slot, rate) in row.iter_mut().zip(&mean_row) {
                if rate.is_zero() {
                    continue;
                }
                *slot = &*slot + &partial * rate;
            }
        }
        Ok(row)
    }
}
