use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::Arc;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Named symbol appearing in expressions (species, rate constants, moments).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a symbol with the provided name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the symbol name.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Wraps the symbol into an expression.
    pub fn to_expr(&self) -> Expr {
        Expr::from_kind(ExprKind::Symbol(self.clone()))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Symbol(name)
    }
}

/// Node variants of an expression tree.
///
/// `Add` and `Mul` hold at least two operands once built through the
/// constructors on [`Expr`]; `Pow` exponents are non-zero integers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExprKind {
    /// Exact rational constant.
    Number(BigRational),
    /// Free symbol.
    Symbol(Symbol),
    /// Sum of operands.
    Add(Vec<Expr>),
    /// Product of operands.
    Mul(Vec<Expr>),
    /// Integer power of a base expression. Negative exponents encode division.
    Pow(Expr, i64),
}

/// Immutable expression value with shared sub-structure.
///
/// Cloning is a reference count bump; equality, ordering and hashing are
/// structural.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Expr(Arc<ExprKind>);

impl Expr {
    pub(crate) fn from_kind(kind: ExprKind) -> Self {
        Expr(Arc::new(kind))
    }

    /// Returns the node variant.
    pub fn kind(&self) -> &ExprKind {
        &self.0
    }

    /// Integer constant.
    pub fn int(value: i64) -> Self {
        Self::number(BigRational::from_integer(BigInt::from(value)))
    }

    /// Rational constant `numer / denom`.
    ///
    /// A zero denominator yields the unevaluated `numer * 0**-1`, which fails
    /// at evaluation time rather than here.
    pub fn rational(numer: i64, denom: i64) -> Self {
        if denom == 0 {
            return Expr::int(numer) * Expr::zero().pow(-1);
        }
        Self::number(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
    }

    /// Wraps an exact rational.
    pub fn number(value: BigRational) -> Self {
        Self::from_kind(ExprKind::Number(value))
    }

    /// The constant zero.
    pub fn zero() -> Self {
        Self::number(BigRational::zero())
    }

    /// The constant one.
    pub fn one() -> Self {
        Self::number(BigRational::one())
    }

    /// Symbol expression by name.
    pub fn symbol(name: impl Into<String>) -> Self {
        Symbol::new(name).to_expr()
    }

    /// Returns the constant value if this is a number.
    pub fn as_number(&self) -> Option<&BigRational> {
        match self.kind() {
            ExprKind::Number(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the symbol if this is a bare symbol.
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self.kind() {
            ExprKind::Symbol(symbol) => Some(symbol),
            _ => None,
        }
    }

    /// True for the constant zero.
    pub fn is_zero(&self) -> bool {
        self.as_number().map(Zero::is_zero).unwrap_or(false)
    }

    /// True for the constant one.
    pub fn is_one(&self) -> bool {
        self.as_number().map(One::is_one).unwrap_or(false)
    }

    /// Builds a flattened sum, folding numeric operands and dropping zeros.
    pub fn sum<I>(terms: I) -> Self
    where
        I: IntoIterator<Item = Expr>,
    {
        let mut constant = BigRational::zero();
        let mut operands = Vec::new();
        for term in terms {
            match term.kind() {
                ExprKind::Number(value) => constant += value,
                ExprKind::Add(inner) => {
                    for operand in inner {
                        match operand.kind() {
                            ExprKind::Number(value) => constant += value,
                            _ => operands.push(operand.clone()),
                        }
                    }
                }
                _ => operands.push(term),
            }
        }
        if !constant.is_zero() {
            operands.push(Expr::number(constant));
        }
        match operands.len() {
            0 => Expr::zero(),
            1 => operands.pop().unwrap_or_else(Expr::zero),
            _ => Expr::from_kind(ExprKind::Add(operands)),
        }
    }

    /// Builds a flattened product, folding numeric operands.
    ///
    /// A zero factor collapses the product to zero.
    pub fn product<I>(factors: I) -> Self
    where
        I: IntoIterator<Item = Expr>,
    {
        let mut constant = BigRational::one();
        let mut operands = Vec::new();
        for factor in factors {
            match factor.kind() {
                ExprKind::Number(value) => constant *= value,
                ExprKind::Mul(inner) => {
                    for operand in inner {
                        match operand.kind() {
                            ExprKind::Number(value) => constant *= value,
                            _ => operands.push(operand.clone()),
                        }
                    }
                }
                _ => operands.push(factor),
            }
        }
        if constant.is_zero() {
            return Expr::zero();
        }
        if !constant.is_one() {
            operands.insert(0, Expr::number(constant));
        }
        match operands.len() {
            0 => Expr::one(),
            1 => operands.pop().unwrap_or_else(Expr::one),
            _ => Expr::from_kind(ExprKind::Mul(operands)),
        }
    }

    /// Raises the expression to an integer power.
    pub fn pow(&self, exponent: i64) -> Self {
        if exponent == 0 {
            return Expr::one();
        }
        if exponent == 1 {
            return self.clone();
        }
        match self.kind() {
            ExprKind::Number(value) if !value.is_zero() => {
                Expr::number(rational_pow(value, exponent))
            }
            ExprKind::Number(_) if exponent > 0 => Expr::zero(),
            ExprKind::Pow(base, inner) => match inner.checked_mul(exponent) {
                Some(combined) => base.pow(combined),
                None => Expr::from_kind(ExprKind::Pow(self.clone(), exponent)),
            },
            _ => Expr::from_kind(ExprKind::Pow(self.clone(), exponent)),
        }
    }

    /// Multiplicative inverse, `self**-1`.
    pub fn recip(&self) -> Self {
        self.pow(-1)
    }

    /// Collects the free symbols of the expression.
    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut BTreeSet<Symbol>) {
        match self.kind() {
            ExprKind::Number(_) => {}
            ExprKind::Symbol(symbol) => {
                out.insert(symbol.clone());
            }
            ExprKind::Add(operands) | ExprKind::Mul(operands) => {
                for operand in operands {
                    operand.collect_symbols(out);
                }
            }
            ExprKind::Pow(base, _) => base.collect_symbols(out),
        }
    }

    /// True when `symbol` occurs anywhere in the expression.
    pub fn contains_symbol(&self, symbol: &Symbol) -> bool {
        match self.kind() {
            ExprKind::Number(_) => false,
            ExprKind::Symbol(own) => own == symbol,
            ExprKind::Add(operands) | ExprKind::Mul(operands) => {
                operands.iter().any(|operand| operand.contains_symbol(symbol))
            }
            ExprKind::Pow(base, _) => base.contains_symbol(symbol),
        }
    }

    /// Replaces symbols according to `map`; unmapped symbols are kept.
    pub fn substitute(&self, map: &BTreeMap<Symbol, Expr>) -> Expr {
        match self.kind() {
            ExprKind::Number(_) => self.clone(),
            ExprKind::Symbol(symbol) => map.get(symbol).cloned().unwrap_or_else(|| self.clone()),
            ExprKind::Add(operands) => {
                Expr::sum(operands.iter().map(|operand| operand.substitute(map)))
            }
            ExprKind::Mul(operands) => {
                Expr::product(operands.iter().map(|operand| operand.substitute(map)))
            }
            ExprKind::Pow(base, exponent) => base.substitute(map).pow(*exponent),
        }
    }

    /// Number of nodes in the tree, counting shared nodes once per use.
    pub fn node_count(&self) -> usize {
        match self.kind() {
            ExprKind::Number(_) | ExprKind::Symbol(_) => 1,
            ExprKind::Add(operands) | ExprKind::Mul(operands) => {
                1 + operands.iter().map(Expr::node_count).sum::<usize>()
            }
            ExprKind::Pow(base, _) => 1 + base.node_count(),
        }
    }

    /// True when the numeric sign of the leading coefficient is negative.
    pub(crate) fn is_negative_term(&self) -> bool {
        match self.kind() {
            ExprKind::Number(value) => value.is_negative(),
            ExprKind::Mul(operands) => operands
                .first()
                .and_then(Expr::as_number)
                .map(Signed::is_negative)
                .unwrap_or(false),
            _ => false,
        }
    }
}

pub(crate) fn rational_pow(value: &BigRational, exponent: i64) -> BigRational {
    let magnitude = exponent.unsigned_abs();
    let mut acc = BigRational::one();
    let mut base = value.clone();
    let mut remaining = magnitude;
    while remaining > 0 {
        if remaining & 1 == 1 {
            acc *= &base;
        }
        remaining >>= 1;
        if remaining > 0 {
            base = &base * &base;
        }
    }
    if exponent < 0 {
        acc.recip()
    } else {
        acc
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr({self})")
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::int(value)
    }
}

impl From<Symbol> for Expr {
    fn from(symbol: Symbol) -> Self {
        symbol.to_expr()
    }
}

impl From<&Symbol> for Expr {
    fn from(symbol: &Symbol) -> Self {
        symbol.to_expr()
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Expr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        crate::parse::parse_expr(&text).map_err(serde::de::Error::custom)
    }
}

macro_rules! binary_op {
    ($trait:ident, $method:ident, $body:expr) => {
        impl $trait<Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                let f: fn(Expr, Expr) -> Expr = $body;
                f(self, rhs)
            }
        }

        impl $trait<&Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                let f: fn(Expr, Expr) -> Expr = $body;
                f(self.clone(), rhs.clone())
            }
        }

        impl $trait<&Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                let f: fn(Expr, Expr) -> Expr = $body;
                f(self, rhs.clone())
            }
        }

        impl $trait<Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                let f: fn(Expr, Expr) -> Expr = $body;
                f(self.clone(), rhs)
            }
        }
    };
}

binary_op!(Add, add, |lhs, rhs| Expr::sum([lhs, rhs]));
binary_op!(Sub, sub, |lhs, rhs| Expr::sum([lhs, -rhs]));
binary_op!(Mul, mul, |lhs, rhs| Expr::product([lhs, rhs]));
binary_op!(Div, div, |lhs, rhs| Expr::product([lhs, rhs.recip()]));

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::product([Expr::int(-1), self])
    }
}

impl Neg for &Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        -self.clone()
    }
}

impl std::iter::Sum for Expr {
    fn sum<I: Iterator<Item = Expr>>(iter: I) -> Self {
        Expr::sum(iter)
    }
}

impl std::iter::Product for Expr {
    fn product<I: Iterator<Item = Expr>>(iter: I) -> Self {
        Expr::product(iter)
    }
}
