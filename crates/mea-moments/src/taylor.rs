//! Taylor coefficients of reaction-network expectations.
//!
//! The expectation of a smooth function `f(X)` expanded around the means is
//! `Σ_n f^{(n)}(mean) / n! · CM_n`, so the coefficient multiplying the central
//! moment `CM_n` is `(1/n!) ∂^n f / ∂y^n` evaluated at the species symbols.

use mea_core::errors::MeaError;
use mea_sym::{Expr, Symbol};
use num_rational::BigRational;

use crate::counter::Counter;
use crate::multi_index::MultiIndex;
use crate::network::ReactionNetwork;

/// Taylor coefficients of `f`, one per central-counter entry.
///
/// Fails with a symbolic error when a coefficient divides by zero.
pub fn taylor_row(f: &Expr, species: &[Symbol], central: &Counter) -> Result<Vec<Expr>, MeaError> {
    central
        .iter()
        .map(|moment| {
            let derivative = f.diff_multi(species, moment.n_vector.as_slice());
            if derivative.is_zero() {
                return Ok(derivative);
            }
            let scale = BigRational::from_integer(moment.n_vector.factorial()).recip();
            (Expr::number(scale) * derivative)
                .try_simplify()
                .map_err(|err| err.with_context("taylor_index", moment.n_vector.to_string()))
        })
        .collect()
}

/// Generator of the raw moment `j`:
/// `Σ_r a_r(y) · (Π_s (y_s + S_{s,r})^{j_s} - Π_s y_s^{j_s})`.
pub fn raw_moment_generator(network: &ReactionNetwork, j: &MultiIndex) -> Result<Expr, MeaError> {
    let species = network.species_exprs();
    let before = Expr::product(
        species
            .iter()
            .zip(j.as_slice())
            .map(|(symbol, exponent)| symbol.pow(i64::from(*exponent))),
    );
    let terms = network
        .propensities()
        .iter()
        .enumerate()
        .map(|(reaction, propensity)| {
            let after = Expr::product(species.iter().zip(j.as_slice()).enumerate().map(
                |(idx, (symbol, exponent))| {
                    let shifted = symbol + Expr::int(network.change(idx, reaction));
                    shifted.pow(i64::from(*exponent))
                },
            ));
            propensity * (after - &before)
        });
    Expr::sum(terms).try_simplify()
}

/// Taylor row of the time derivative of raw moment `j`.
pub fn raw_moment_row(
    network: &ReactionNetwork,
    j: &MultiIndex,
    central: &Counter,
) -> Result<Vec<Expr>, MeaError> {
    taylor_row(&raw_moment_generator(network, j)?, network.species(), central)
}

/// Taylor row of the mean of `species`.
pub fn mean_row(
    network: &ReactionNetwork,
    species: usize,
    central: &Counter,
) -> Result<Vec<Expr>, MeaError> {
    taylor_row(&network.drift(species).try_simplify()?, network.species(), central)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mea_sym::parse_expr;

    fn birth() -> ReactionNetwork {
        ReactionNetwork::new(
            vec![Symbol::new("y_0")],
            vec![parse_expr("k_0").expect("parse")],
            vec![vec![1]],
        )
        .expect("network")
    }

    #[test]
    fn second_raw_moment_of_birth_process() {
        let generator =
            raw_moment_generator(&birth(), &MultiIndex::new(vec![2])).expect("generator");
        assert_eq!(generator, parse_expr("2*k_0*y_0 + k_0").expect("parse").simplify());
    }

    #[test]
    fn coefficients_divide_by_factorials() {
        let central = Counter::central(1, 3);
        let f = parse_expr("y_0**3").expect("parse");
        let row = taylor_row(&f, &[Symbol::new("y_0")], &central).expect("row");
        let expected = ["y_0**3", "3*y_0", "1"];
        for (entry, text) in row.iter().zip(expected) {
            assert_eq!(entry, &parse_expr(text).expect("parse").simplify());
        }
    }

    #[test]
    fn vanishing_denominators_fail() {
        let network = ReactionNetwork::new(
            vec![Symbol::new("y_0")],
            vec![parse_expr("k_0/(y_0 - y_0)").expect("parse")],
            vec![vec![1]],
        )
        .expect("network");
        let err = mean_row(&network, 0, &Counter::central(1, 2)).unwrap_err();
        assert_eq!(err.info().code, "division-by-zero");
    }
}
