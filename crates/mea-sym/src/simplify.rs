//! Canonical expanded form.
//!
//! Expressions are normalised into a sum of monomials with exact rational
//! coefficients. A monomial maps atoms to non-zero integer exponents, where an
//! atom is either a symbol or a multi-term sum that only ever occurs with a
//! negative exponent (a denominator). Denominator sums are stripped of their
//! common monomial content and scaled to a unit leading coefficient, so the
//! same denominator always maps to the same atom.

use std::collections::BTreeMap;

use mea_core::errors::{ErrorInfo, MeaError};
use num_rational::BigRational;
use num_traits::{One, Zero};

use crate::expr::{rational_pow, Expr, ExprKind};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
struct Monomial(BTreeMap<Expr, i64>);

impl Monomial {
    fn atom(atom: Expr, exponent: i64) -> Self {
        let mut powers = BTreeMap::new();
        if exponent != 0 {
            powers.insert(atom, exponent);
        }
        Monomial(powers)
    }

    fn mul(&self, other: &Monomial) -> Monomial {
        let mut powers = self.0.clone();
        for (atom, exponent) in &other.0 {
            let entry = powers.entry(atom.clone()).or_insert(0);
            *entry += exponent;
            if *entry == 0 {
                powers.remove(atom);
            }
        }
        Monomial(powers)
    }

    fn pow(&self, exponent: i64) -> Monomial {
        if exponent == 0 {
            return Monomial::default();
        }
        Monomial(
            self.0
                .iter()
                .map(|(atom, power)| (atom.clone(), power * exponent))
                .collect(),
        )
    }

    fn exponent_of(&self, atom: &Expr) -> i64 {
        self.0.get(atom).copied().unwrap_or(0)
    }

    fn to_expr(&self, coefficient: &BigRational) -> Expr {
        let factors = std::iter::once(Expr::number(coefficient.clone())).chain(
            self.0
                .iter()
                .map(|(atom, exponent)| atom.pow(*exponent)),
        );
        Expr::product(factors)
    }
}

#[derive(Debug, Clone, Default)]
struct Poly(BTreeMap<Monomial, BigRational>);

impl Poly {
    fn constant(value: BigRational) -> Poly {
        let mut poly = Poly::default();
        poly.add_term(Monomial::default(), value);
        poly
    }

    fn term(monomial: Monomial, coefficient: BigRational) -> Poly {
        let mut poly = Poly::default();
        poly.add_term(monomial, coefficient);
        poly
    }

    fn add_term(&mut self, monomial: Monomial, coefficient: BigRational) {
        if coefficient.is_zero() {
            return;
        }
        let entry = self
            .0
            .entry(monomial.clone())
            .or_insert_with(BigRational::zero);
        *entry += coefficient;
        if entry.is_zero() {
            self.0.remove(&monomial);
        }
    }

    fn add_assign(&mut self, other: Poly) {
        for (monomial, coefficient) in other.0 {
            self.add_term(monomial, coefficient);
        }
    }

    fn mul(&self, other: &Poly) -> Poly {
        let mut out = Poly::default();
        for (lhs_mono, lhs_coeff) in &self.0 {
            for (rhs_mono, rhs_coeff) in &other.0 {
                out.add_term(lhs_mono.mul(rhs_mono), lhs_coeff * rhs_coeff);
            }
        }
        out
    }

    fn pow(&self, exponent: u64) -> Poly {
        let mut acc = Poly::constant(BigRational::one());
        for _ in 0..exponent {
            acc = acc.mul(self);
        }
        acc
    }

    fn single_term(&self) -> Option<(&Monomial, &BigRational)> {
        if self.0.len() == 1 {
            self.0.iter().next()
        } else {
            None
        }
    }

    fn map_monomials(&self, factor: &Monomial, scale: &BigRational) -> Poly {
        let mut out = Poly::default();
        for (monomial, coefficient) in &self.0 {
            out.add_term(monomial.mul(factor), coefficient * scale);
        }
        out
    }

    /// True when some monomial carries an identically zero denominator.
    fn divides_by_zero(&self) -> bool {
        self.0.keys().any(|monomial| {
            monomial
                .0
                .keys()
                .any(|atom| atom.is_zero() || has_zero_divisor(atom))
        })
    }

    fn to_expr(&self) -> Expr {
        Expr::sum(
            self.0
                .iter()
                .map(|(monomial, coefficient)| monomial.to_expr(coefficient)),
        )
    }

    // Inverting a denominator atom yields a positive power of a sum, which
    // must be expanded to stay canonical.
    fn expand_sum_atoms(self) -> Poly {
        let mut out = Poly::default();
        for (monomial, coefficient) in self.0 {
            let mut kept = Monomial::default();
            let mut factor = Poly::constant(coefficient);
            for (atom, exponent) in monomial.0 {
                if exponent > 0 && matches!(atom.kind(), ExprKind::Add(_)) {
                    factor = factor.mul(&to_poly(&atom).pow(exponent as u64));
                } else {
                    kept = kept.mul(&Monomial::atom(atom, exponent));
                }
            }
            out.add_assign(factor.map_monomials(&kept, &BigRational::one()));
        }
        out
    }

    /// Integer power with a possibly negative exponent.
    fn powi(&self, exponent: i64) -> Poly {
        if exponent >= 0 {
            return self.pow(exponent as u64);
        }
        if self.0.is_empty() {
            return Poly::term(Monomial::atom(Expr::zero(), exponent), BigRational::one());
        }
        if let Some((monomial, coefficient)) = self.single_term() {
            return Poly::term(monomial.pow(exponent), rational_pow(coefficient, exponent))
                .expand_sum_atoms();
        }

        // Pull out the common monomial content so x*y + x and y + 1 share an atom.
        let atoms: Vec<Expr> = self
            .0
            .keys()
            .flat_map(|monomial| monomial.0.keys().cloned())
            .collect();
        let mut content = Monomial::default();
        for atom in atoms {
            let lowest = self
                .0
                .keys()
                .map(|monomial| monomial.exponent_of(&atom))
                .min()
                .unwrap_or(0);
            if lowest != 0 && content.exponent_of(&atom) == 0 {
                content = content.mul(&Monomial::atom(atom, lowest));
            }
        }
        let reduced = self.map_monomials(&content.pow(-1), &BigRational::one());

        let leading = reduced
            .0
            .values()
            .next_back()
            .cloned()
            .unwrap_or_else(BigRational::one);
        let monic = reduced.map_monomials(&Monomial::default(), &leading.recip());
        let atom = monic.to_expr();

        Poly::term(
            content.pow(exponent).mul(&Monomial::atom(atom, exponent)),
            rational_pow(&leading, exponent),
        )
    }
}

fn to_poly(expr: &Expr) -> Poly {
    match expr.kind() {
        ExprKind::Number(value) => Poly::constant(value.clone()),
        ExprKind::Symbol(_) => Poly::term(Monomial::atom(expr.clone(), 1), BigRational::one()),
        ExprKind::Add(operands) => {
            let mut out = Poly::default();
            for operand in operands {
                out.add_assign(to_poly(operand));
            }
            out
        }
        ExprKind::Mul(operands) => operands
            .iter()
            .fold(Poly::constant(BigRational::one()), |acc, operand| {
                acc.mul(&to_poly(operand))
            }),
        // A negative power of a product inverts each factor on its own, so
        // every sum factor becomes its own denominator atom.
        ExprKind::Pow(base, exponent) if *exponent < 0 => match base.kind() {
            ExprKind::Mul(operands) => operands
                .iter()
                .fold(Poly::constant(BigRational::one()), |acc, operand| {
                    acc.mul(&to_poly(&operand.pow(*exponent)))
                }),
            _ => to_poly(base).powi(*exponent),
        },
        ExprKind::Pow(base, exponent) => to_poly(base).powi(*exponent),
    }
}

fn has_zero_divisor(expr: &Expr) -> bool {
    match expr.kind() {
        ExprKind::Number(_) | ExprKind::Symbol(_) => false,
        ExprKind::Add(operands) | ExprKind::Mul(operands) => operands.iter().any(has_zero_divisor),
        ExprKind::Pow(base, exponent) => {
            (*exponent < 0 && base.is_zero()) || has_zero_divisor(base)
        }
    }
}

impl Expr {
    /// Returns the canonical expanded form of the expression.
    ///
    /// The result is mathematically equal to the input wherever the input is
    /// defined. Structurally equal outputs imply equal inputs; the converse
    /// does not hold for rational functions whose denominators could cancel,
    /// see [`Expr::equivalent`] for a complete test.
    pub fn simplify(&self) -> Expr {
        to_poly(self).to_expr()
    }

    /// [`Expr::simplify`] that fails when a denominator simplifies to zero.
    ///
    /// The infallible form keeps such a denominator as the atom `0**-n`.
    pub fn try_simplify(&self) -> Result<Expr, MeaError> {
        let poly = to_poly(self);
        if poly.divides_by_zero() {
            return Err(MeaError::Symbolic(
                ErrorInfo::new(
                    "division-by-zero",
                    "denominator simplifies to zero",
                )
                .with_context("expression", self.to_string()),
            ));
        }
        Ok(poly.to_expr())
    }

    /// Number of additive terms in the canonical form.
    pub fn term_count(&self) -> usize {
        to_poly(self).0.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_expr;

    fn simplified(text: &str) -> Expr {
        parse_expr(text).expect("parse").simplify()
    }

    #[test]
    fn like_terms_collect() {
        assert_eq!(simplified("x + x + 2*x"), simplified("4*x"));
        assert!(simplified("x*y - y*x").is_zero());
    }

    #[test]
    fn products_expand() {
        assert_eq!(simplified("(x + 1)**2"), simplified("x**2 + 2*x + 1"));
        assert_eq!(simplified("(a - b)*(a + b)"), simplified("a**2 - b**2"));
    }

    #[test]
    fn denominators_are_normalised() {
        assert_eq!(simplified("1/(c_6 + y_0)"), simplified("2/(2*y_0 + 2*c_6)"));
        assert_eq!(
            simplified("1/(-y_0 - y_1 + 301)"),
            simplified("-1/(y_0 + y_1 - 301)")
        );
        assert_eq!(simplified("1/(x*y + x)"), simplified("x**-1/(y + 1)"));
        assert_eq!(simplified("1/(1/(x + 1))"), simplified("x + 1"));
    }

    #[test]
    fn product_denominators_split_into_factors() {
        assert_eq!(
            simplified("x/((x + 1)*(y + 1))"),
            simplified("x/(x + 1)/(y + 1)")
        );
        assert_eq!(simplified("1/(2*x*(y + 1))**2"), simplified("x**-2/(4*(y + 1)**2)"));
    }

    #[test]
    fn zero_denominators_are_reported() {
        let err = parse_expr("c_0/(y_0 - y_0)")
            .expect("parse")
            .try_simplify()
            .unwrap_err();
        assert!(matches!(err, MeaError::Symbolic(_)));
        assert_eq!(err.info().code, "division-by-zero");
        assert!(parse_expr("1/(x + 1/(y - y))").expect("parse").try_simplify().is_err());
        assert_eq!(
            parse_expr("x/(x + 1)").expect("parse").try_simplify().expect("defined"),
            simplified("x/(x + 1)")
        );
    }

    #[test]
    fn simplify_is_idempotent() {
        let once = simplified("c_2*y_0*y_2/(c_6 + y_0)**2 - c_2*y_2/(c_6 + y_0) + (y_0 - 3)**3");
        assert_eq!(once.simplify(), once);
    }
}
