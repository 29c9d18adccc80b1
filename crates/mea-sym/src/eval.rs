//! Exact evaluation and algebraic equivalence.

use std::collections::BTreeMap;

use mea_core::errors::{ErrorInfo, MeaError};
use mea_core::rng::RngHandle;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

use crate::expr::{rational_pow, Expr, ExprKind, Symbol};

fn default_samples() -> usize {
    6
}

fn default_seed() -> u64 {
    0x4D45_415F_5345_4544
}

/// Options controlling the sampled part of [`Expr::equivalent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquivalenceOpts {
    /// Number of rational sample points evaluated when the canonical forms differ.
    #[serde(default = "default_samples")]
    pub samples: usize,
    /// Master seed for the sample points.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for EquivalenceOpts {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            seed: default_seed(),
        }
    }
}

impl EquivalenceOpts {
    /// Returns a copy that evaluates at least one sample point.
    pub fn sanitised(&self) -> Self {
        Self {
            samples: self.samples.max(1),
            seed: self.seed,
        }
    }
}

/// Symbol bindings used by [`Expr::evaluate`].
pub type Bindings = BTreeMap<Symbol, BigRational>;

// Denominators are distinct primes so sample coordinates rarely coincide.
const SAMPLE_DENOMINATORS: [u64; 8] = [7, 11, 13, 17, 19, 23, 29, 31];
const SAMPLE_NUMERATOR_MAX: u64 = 997;

impl Expr {
    /// Evaluates the expression exactly under `bindings`.
    pub fn evaluate(&self, bindings: &Bindings) -> Result<BigRational, MeaError> {
        match self.kind() {
            ExprKind::Number(value) => Ok(value.clone()),
            ExprKind::Symbol(symbol) => bindings.get(symbol).cloned().ok_or_else(|| {
                MeaError::Symbolic(
                    ErrorInfo::new("unbound-symbol", format!("no value bound for '{symbol}'"))
                        .with_context("symbol", symbol.name()),
                )
            }),
            ExprKind::Add(operands) => {
                let mut acc = BigRational::zero();
                for operand in operands {
                    acc += operand.evaluate(bindings)?;
                }
                Ok(acc)
            }
            ExprKind::Mul(operands) => {
                let mut acc = BigRational::one();
                for operand in operands {
                    acc *= operand.evaluate(bindings)?;
                    if acc.is_zero() {
                        break;
                    }
                }
                Ok(acc)
            }
            ExprKind::Pow(base, exponent) => {
                let value = base.evaluate(bindings)?;
                if value.is_zero() && *exponent < 0 {
                    return Err(MeaError::Symbolic(
                        ErrorInfo::new("division-by-zero", "denominator evaluates to zero")
                            .with_context("denominator", base.to_string()),
                    ));
                }
                Ok(rational_pow(&value, *exponent))
            }
        }
    }

    /// Decides whether two expressions are algebraically equal.
    ///
    /// The canonical forms are compared first. When they differ, the
    /// difference is evaluated exactly at deterministic pseudo-random rational
    /// points; the expressions are equivalent when every point at which the
    /// difference is defined yields zero. Points hitting a pole are skipped,
    /// and at least one defined point is required.
    pub fn equivalent(&self, other: &Expr, opts: &EquivalenceOpts) -> bool {
        let opts = opts.sanitised();
        let difference = (self - other).simplify();
        if difference.is_zero() {
            return true;
        }
        let symbols = difference.free_symbols();
        if symbols.is_empty() {
            return false;
        }

        let mut defined_points = 0usize;
        for sample in 0..opts.samples {
            let mut rng = RngHandle::substream(opts.seed, sample as u64);
            let bindings: Bindings = symbols
                .iter()
                .enumerate()
                .map(|(idx, symbol)| {
                    let denominator = SAMPLE_DENOMINATORS[idx % SAMPLE_DENOMINATORS.len()];
                    let (numer, denom) = rng.sample_ratio(SAMPLE_NUMERATOR_MAX, denominator);
                    (
                        symbol.clone(),
                        BigRational::new(BigInt::from(numer), BigInt::from(denom)),
                    )
                })
                .collect();
            match difference.evaluate(&bindings) {
                Ok(value) if value.is_zero() => defined_points += 1,
                Ok(_) => return false,
                Err(_) => continue,
            }
        }
        defined_points > 0
    }
}
