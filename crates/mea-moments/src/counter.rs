use std::collections::BTreeMap;

use mea_core::errors::{ErrorInfo, MeaError};
use mea_sym::Symbol;
use serde::{Deserialize, Serialize};

use crate::moment::Moment;
use crate::multi_index::MultiIndex;

/// Ordered basis of moments sharing one dimensionality.
///
/// Generated counters list moments in canonical multi-index order (see
/// [`MultiIndex`]), so positions are reproducible from the multi-indices
/// alone. Counters built from an explicit list keep that list's order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "CounterParts", into = "CounterParts")]
pub struct Counter {
    dim: usize,
    moments: Vec<Moment>,
    positions: BTreeMap<MultiIndex, usize>,
}

// Moments compare by multi-index only, so counters also compare symbols.
impl PartialEq for Counter {
    fn eq(&self, other: &Self) -> bool {
        self.dim == other.dim
            && self.moments.len() == other.moments.len()
            && self
                .moments
                .iter()
                .zip(&other.moments)
                .all(|(lhs, rhs)| lhs == rhs && lhs.symbol == rhs.symbol)
    }
}

impl Eq for Counter {}

#[derive(Serialize, Deserialize)]
struct CounterParts {
    dim: usize,
    moments: Vec<Moment>,
}

impl TryFrom<CounterParts> for Counter {
    type Error = MeaError;

    fn try_from(parts: CounterParts) -> Result<Self, Self::Error> {
        Counter::from_moments(parts.dim, parts.moments)
    }
}

impl From<Counter> for CounterParts {
    fn from(counter: Counter) -> Self {
        CounterParts {
            dim: counter.dim,
            moments: counter.moments,
        }
    }
}

/// Default raw-moment symbol: species name for means, `x_<exponents>` otherwise.
pub fn raw_symbol(species: &[Symbol], index: &MultiIndex) -> Symbol {
    if let Some(symbol) = index.unit_species().and_then(|idx| species.get(idx)) {
        return symbol.clone();
    }
    let digits: Vec<String> = index.as_slice().iter().map(u32::to_string).collect();
    let separator = if index.as_slice().iter().any(|exponent| *exponent > 9) {
        "_"
    } else {
        ""
    };
    Symbol::new(format!("x_{}", digits.join(separator)))
}

/// Default central-moment symbol: `yx<position>`.
pub fn central_symbol(position: usize) -> Symbol {
    Symbol::new(format!("yx{position}"))
}

impl Counter {
    /// Builds a counter from explicit moments, keeping the caller's order.
    ///
    /// Positions follow the list as given, so derivative matrices whose
    /// columns were laid out against the same list stay aligned. Every moment
    /// must have dimension `dim` and multi-indices must be unique.
    pub fn from_moments(dim: usize, moments: Vec<Moment>) -> Result<Self, MeaError> {
        for moment in &moments {
            if moment.n_vector.dim() != dim {
                return Err(MeaError::Shape(
                    ErrorInfo::new(
                        "moment-dimension",
                        format!("moment has dimension {}, expected {dim}", moment.n_vector.dim()),
                    )
                    .with_context("moment", moment.n_vector.to_string())
                    .with_context("symbol", moment.symbol.name()),
                ));
            }
        }
        let mut positions = BTreeMap::new();
        for (position, moment) in moments.iter().enumerate() {
            if positions.insert(moment.n_vector.clone(), position).is_some() {
                return Err(MeaError::Configuration(
                    ErrorInfo::new("duplicate-moment", "multi-index listed more than once")
                        .with_context("moment", moment.n_vector.to_string()),
                ));
            }
        }
        Ok(Self {
            dim,
            moments,
            positions,
        })
    }

    /// Builds a counter from explicit moments sorted into canonical order.
    pub fn canonical(dim: usize, mut moments: Vec<Moment>) -> Result<Self, MeaError> {
        moments.sort_by(|lhs, rhs| lhs.n_vector.cmp(&rhs.n_vector));
        Self::from_moments(dim, moments)
    }

    /// True when the moments are listed in canonical multi-index order.
    pub fn is_canonical(&self) -> bool {
        self.moments
            .windows(2)
            .all(|pair| pair[0].n_vector < pair[1].n_vector)
    }

    /// Generates every multi-index of the given orders and names it with `namer`.
    ///
    /// `namer` receives the final position of the moment and its multi-index.
    pub fn generate<I, F>(dim: usize, orders: I, mut namer: F) -> Self
    where
        I: IntoIterator<Item = u32>,
        F: FnMut(usize, &MultiIndex) -> Symbol,
    {
        let mut orders: Vec<u32> = orders.into_iter().collect();
        orders.sort_unstable();
        orders.dedup();
        let indices: Vec<MultiIndex> = orders
            .into_iter()
            .flat_map(|order| MultiIndex::of_order(dim, order))
            .collect();
        let moments: Vec<Moment> = indices
            .into_iter()
            .enumerate()
            .map(|(position, index)| {
                let symbol = namer(position, &index);
                Moment {
                    n_vector: index,
                    symbol,
                }
            })
            .collect();
        let positions = moments
            .iter()
            .enumerate()
            .map(|(position, moment)| (moment.n_vector.clone(), position))
            .collect();
        Self {
            dim,
            moments,
            positions,
        }
    }

    /// Raw-moment counter over orders `0..=max_order` with default names.
    pub fn raw(species: &[Symbol], max_order: u32) -> Self {
        Self::generate(species.len(), 0..=max_order, |_, index| {
            raw_symbol(species, index)
        })
    }

    /// Central-moment counter: order zero plus orders `2..=max_order`.
    ///
    /// First-order central moments vanish identically and are never tracked.
    pub fn central(dim: usize, max_order: u32) -> Self {
        Self::generate(
            dim,
            std::iter::once(0).chain(2..=max_order),
            |position, _| central_symbol(position),
        )
    }

    /// Number of species each multi-index ranges over.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of moments.
    pub fn len(&self) -> usize {
        self.moments.len()
    }

    /// True when the counter holds no moments.
    pub fn is_empty(&self) -> bool {
        self.moments.is_empty()
    }

    /// Moments in counter order.
    pub fn moments(&self) -> &[Moment] {
        &self.moments
    }

    /// Iterates over moments in counter order.
    pub fn iter(&self) -> std::slice::Iter<'_, Moment> {
        self.moments.iter()
    }

    /// Moment at `position`.
    pub fn get(&self, position: usize) -> Option<&Moment> {
        self.moments.get(position)
    }

    /// Position of the moment with multi-index `index`.
    pub fn position(&self, index: &MultiIndex) -> Option<usize> {
        self.positions.get(index).copied()
    }

    /// Moment with multi-index `index`.
    pub fn lookup(&self, index: &MultiIndex) -> Option<&Moment> {
        self.position(index).and_then(|position| self.moments.get(position))
    }

    /// Highest order present, zero for an empty counter.
    pub fn max_order(&self) -> u32 {
        self.moments.iter().map(Moment::order).max().unwrap_or(0)
    }

    /// Moments of exactly `order`.
    pub fn of_order(&self, order: u32) -> impl Iterator<Item = &Moment> + '_ {
        self.moments
            .iter()
            .filter(move |moment| moment.order() == order)
    }

    /// Symbols in counter order.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.moments
            .iter()
            .map(|moment| moment.symbol.clone())
            .collect()
    }
}

impl<'a> IntoIterator for &'a Counter {
    type Item = &'a Moment;
    type IntoIter = std::slice::Iter<'a, Moment>;

    fn into_iter(self) -> Self::IntoIter {
        self.moments.iter()
    }
}
