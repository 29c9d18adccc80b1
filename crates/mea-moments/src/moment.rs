use std::hash::{Hash, Hasher};

use mea_sym::{Expr, Symbol};
use serde::{Deserialize, Serialize};

use crate::multi_index::MultiIndex;

/// One tracked moment: a multi-index and the symbol standing for it.
///
/// Equality and hashing only look at the multi-index, so a moment can be used
/// as a lookup key regardless of how it was named.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Moment {
    /// Per-species exponents.
    pub n_vector: MultiIndex,
    /// Symbol used for this moment in generated expressions.
    pub symbol: Symbol,
}

impl Moment {
    /// Creates a moment descriptor.
    pub fn new(n_vector: impl Into<MultiIndex>, symbol: impl Into<Symbol>) -> Self {
        Self {
            n_vector: n_vector.into(),
            symbol: symbol.into(),
        }
    }

    /// Moment order, derived from the multi-index.
    pub fn order(&self) -> u32 {
        self.n_vector.order()
    }

    /// The moment symbol as an expression.
    pub fn expr(&self) -> Expr {
        self.symbol.to_expr()
    }
}

impl PartialEq for Moment {
    fn eq(&self, other: &Self) -> bool {
        self.n_vector == other.n_vector
    }
}

impl Eq for Moment {}

impl Hash for Moment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.n_vector.hash(state);
    }
}

/// Label attached to one equation of a moment system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Descriptor {
    /// A raw moment `E[Π_s X_s^{n_s}]`; first-order raw moments are the means.
    RawMoment {
        /// Described moment.
        moment: Moment,
    },
    /// A central moment `E[Π_s (X_s - mean_s)^{n_s}]`.
    CentralMoment {
        /// Described moment.
        moment: Moment,
    },
    /// Entry `(i, j)` of the covariance matrix, backed by a second-order
    /// central moment.
    VarianceTerm {
        /// Species pair, `i <= j`.
        position: (usize, usize),
        /// Symbol of the backing central moment.
        symbol: Symbol,
    },
}

impl Descriptor {
    /// Symbol the descriptor stands for.
    pub fn symbol(&self) -> &Symbol {
        match self {
            Descriptor::RawMoment { moment } | Descriptor::CentralMoment { moment } => {
                &moment.symbol
            }
            Descriptor::VarianceTerm { symbol, .. } => symbol,
        }
    }

    /// Multi-index of the described moment, if it carries one.
    pub fn n_vector(&self) -> Option<&MultiIndex> {
        match self {
            Descriptor::RawMoment { moment } | Descriptor::CentralMoment { moment } => {
                Some(&moment.n_vector)
            }
            Descriptor::VarianceTerm { .. } => None,
        }
    }

    /// Builds the covariance-matrix label for a second-order central moment.
    ///
    /// Returns `None` for central moments of any other order.
    pub fn variance_term(moment: &Moment) -> Option<Descriptor> {
        if moment.order() != 2 {
            return None;
        }
        let exponents = moment.n_vector.as_slice();
        let mut species = exponents
            .iter()
            .enumerate()
            .flat_map(|(idx, exponent)| std::iter::repeat(idx).take(*exponent as usize));
        let first = species.next()?;
        let second = species.next()?;
        Some(Descriptor::VarianceTerm {
            position: (first, second),
            symbol: moment.symbol.clone(),
        })
    }
}
