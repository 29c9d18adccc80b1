//! Symbolic differentiation.

use crate::expr::{Expr, ExprKind, Symbol};

impl Expr {
    /// Partial derivative with respect to `symbol`.
    ///
    /// The result is built with the folding constructors but not expanded;
    /// call [`Expr::simplify`] for the canonical form.
    pub fn diff(&self, symbol: &Symbol) -> Expr {
        if !self.contains_symbol(symbol) {
            return Expr::zero();
        }
        match self.kind() {
            ExprKind::Number(_) => Expr::zero(),
            ExprKind::Symbol(own) => {
                if own == symbol {
                    Expr::one()
                } else {
                    Expr::zero()
                }
            }
            ExprKind::Add(operands) => Expr::sum(operands.iter().map(|term| term.diff(symbol))),
            ExprKind::Mul(operands) => {
                let mut terms = Vec::with_capacity(operands.len());
                for (idx, factor) in operands.iter().enumerate() {
                    let derivative = factor.diff(symbol);
                    if derivative.is_zero() {
                        continue;
                    }
                    let others = operands
                        .iter()
                        .enumerate()
                        .filter(|(other, _)| *other != idx)
                        .map(|(_, other)| other.clone());
                    terms.push(Expr::product(others.chain(std::iter::once(derivative))));
                }
                Expr::sum(terms)
            }
            ExprKind::Pow(base, exponent) => {
                let inner = base.diff(symbol);
                Expr::product([Expr::int(*exponent), base.pow(exponent - 1), inner])
            }
        }
    }

    /// Mixed partial derivative `∂^{orders} / ∂symbols^{orders}`.
    ///
    /// Each single derivative is simplified before the next one is taken so
    /// intermediate trees stay in expanded form.
    pub fn diff_multi(&self, symbols: &[Symbol], orders: &[u32]) -> Expr {
        let mut current = self.clone();
        for (symbol, order) in symbols.iter().zip(orders) {
            for _ in 0..*order {
                if current.is_zero() {
                    return current;
                }
                current = current.diff(symbol).simplify();
            }
        }
        current
    }
}
