use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigInt;
use num_traits::One;
use serde::{Deserialize, Serialize};

/// Vector of per-species exponents indexing a moment.
///
/// Multi-indices are totally ordered by moment order first and then
/// lexicographically over the exponents; counters rely on this ordering to fix
/// row and column alignment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MultiIndex(Vec<u32>);

impl MultiIndex {
    /// Wraps an exponent vector.
    pub fn new(exponents: Vec<u32>) -> Self {
        Self(exponents)
    }

    /// The all-zero multi-index of dimension `dim`.
    pub fn zeros(dim: usize) -> Self {
        Self(vec![0; dim])
    }

    /// The unit multi-index selecting `species` (a first-order moment).
    pub fn unit(dim: usize, species: usize) -> Self {
        let mut exponents = vec![0; dim];
        if let Some(slot) = exponents.get_mut(species) {
            *slot = 1;
        }
        Self(exponents)
    }

    /// Number of species the multi-index ranges over.
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    /// Moment order, the sum of all exponents.
    pub fn order(&self) -> u32 {
        self.0.iter().sum()
    }

    /// Exponents as a slice.
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// Exponent for `species`, zero when out of range.
    pub fn get(&self, species: usize) -> u32 {
        self.0.get(species).copied().unwrap_or(0)
    }

    /// True when every exponent is at least the matching exponent of `other`.
    pub fn dominates(&self, other: &MultiIndex) -> bool {
        self.dim() == other.dim() && self.0.iter().zip(&other.0).all(|(lhs, rhs)| lhs >= rhs)
    }

    /// Componentwise difference, `None` unless `self` dominates `other`.
    pub fn checked_sub(&self, other: &MultiIndex) -> Option<MultiIndex> {
        if !self.dominates(other) {
            return None;
        }
        Some(Self(
            self.0.iter().zip(&other.0).map(|(lhs, rhs)| lhs - rhs).collect(),
        ))
    }

    /// Index of the single non-zero exponent of a first-order multi-index.
    pub fn unit_species(&self) -> Option<usize> {
        if self.order() != 1 {
            return None;
        }
        self.0.iter().position(|exponent| *exponent == 1)
    }

    /// Every multi-index dominated by `self`, in canonical order.
    ///
    /// This is the Cartesian product of the ranges `0..=k_s`, so its length is
    /// `Π_s (k_s + 1)`.
    pub fn sub_indices(&self) -> Vec<MultiIndex> {
        let mut out = vec![Vec::with_capacity(self.dim())];
        for &bound in &self.0 {
            out = out
                .into_iter()
                .flat_map(|prefix| {
                    (0..=bound).map(move |exponent| {
                        let mut next = prefix.clone();
                        next.push(exponent);
                        next
                    })
                })
                .collect();
        }
        let mut indices: Vec<MultiIndex> = out.into_iter().map(MultiIndex).collect();
        indices.sort();
        indices
    }

    /// All multi-indices of dimension `dim` with exactly `order`, ascending.
    pub fn of_order(dim: usize, order: u32) -> Vec<MultiIndex> {
        fn fill(slot: usize, remaining: u32, current: &mut Vec<u32>, out: &mut Vec<MultiIndex>) {
            if slot + 1 == current.len() {
                current[slot] = remaining;
                out.push(MultiIndex(current.clone()));
                return;
            }
            for exponent in 0..=remaining {
                current[slot] = exponent;
                fill(slot + 1, remaining - exponent, current, out);
            }
        }

        if dim == 0 {
            return if order == 0 {
                vec![MultiIndex(Vec::new())]
            } else {
                Vec::new()
            };
        }
        let mut out = Vec::new();
        fill(0, order, &mut vec![0; dim], &mut out);
        out
    }

    /// `Π_s k_s!`.
    pub fn factorial(&self) -> BigInt {
        self.0
            .iter()
            .map(|exponent| factorial(*exponent))
            .fold(BigInt::one(), |acc, value| acc * value)
    }

    /// Reorders exponents so that species `s` moves to `permutation[s]`.
    ///
    /// Returns `None` when `permutation` is not a permutation of `0..dim`.
    pub fn permuted(&self, permutation: &[usize]) -> Option<MultiIndex> {
        if permutation.len() != self.dim() {
            return None;
        }
        let mut out = vec![0; self.dim()];
        let mut seen = vec![false; self.dim()];
        for (source, &target) in permutation.iter().enumerate() {
            if target >= self.dim() || seen[target] {
                return None;
            }
            seen[target] = true;
            out[target] = self.0[source];
        }
        Some(MultiIndex(out))
    }
}

impl Ord for MultiIndex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order()
            .cmp(&other.order())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for MultiIndex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for MultiIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (idx, exponent) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{exponent}")?;
        }
        write!(f, "]")
    }
}

impl From<Vec<u32>> for MultiIndex {
    fn from(exponents: Vec<u32>) -> Self {
        Self(exponents)
    }
}

/// `n!` as a big integer.
pub fn factorial(n: u32) -> BigInt {
    (2..=n).fold(BigInt::one(), |acc, value| acc * BigInt::from(value))
}

/// Scalar binomial coefficient `C(n, k)`; zero when `k > n`.
pub fn binomial(n: u32, k: u32) -> BigInt {
    if k > n {
        return BigInt::from(0);
    }
    let k = k.min(n - k);
    let mut acc = BigInt::one();
    for step in 0..k {
        acc = acc * BigInt::from(n - step) / BigInt::from(step + 1);
    }
    acc
}

/// Multinomial weight `Π_s C(k_s, j_s)` of sub-index `j` under `k`.
pub fn multinomial(k: &MultiIndex, j: &MultiIndex) -> BigInt {
    k.0.iter()
        .zip(&j.0)
        .map(|(&outer, &inner)| binomial(outer, inner))
        .fold(BigInt::one(), |acc, value| acc * value)
}

/// Binomial sign `(-1)^{Σ_s (k_s - j_s)}` as `±1`.
pub fn sign(k: &MultiIndex, j: &MultiIndex) -> i64 {
    let gap: u64 = k
        .0
        .iter()
        .zip(&j.0)
        .map(|(&outer, &inner)| u64::from(outer.saturating_sub(inner)))
        .sum();
    if gap % 2 == 0 {
        1
    } else {
        -1
    }
}
