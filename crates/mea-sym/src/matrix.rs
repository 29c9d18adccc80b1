//! Dense matrices of expressions.

use mea_core::errors::{ErrorInfo, MeaError};
use serde::{Deserialize, Serialize};

use crate::eval::EquivalenceOpts;
use crate::expr::Expr;
use crate::parse::parse_expr;

/// Row-major matrix of expressions.
///
/// Serialises as a list of rows, each a list of expression strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Expr>>", into = "Vec<Vec<Expr>>")]
pub struct ExprMatrix {
    rows: usize,
    cols: usize,
    entries: Vec<Expr>,
}

fn shape_error(code: &str, message: impl Into<String>) -> MeaError {
    MeaError::Shape(ErrorInfo::new(code, message))
}

impl ExprMatrix {
    /// Builds a matrix from row-major entries.
    pub fn new(rows: usize, cols: usize, entries: Vec<Expr>) -> Result<Self, MeaError> {
        if rows.checked_mul(cols) != Some(entries.len()) {
            return Err(shape_error(
                "entry-count",
                format!("{rows}x{cols} matrix needs {} entries", rows * cols),
            )
            .with_context("entries", entries.len().to_string()));
        }
        Ok(Self {
            rows,
            cols,
            entries,
        })
    }

    /// Matrix filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            entries: vec![Expr::zero(); rows * cols],
        }
    }

    /// Builds a matrix from explicit rows; all rows must have equal length.
    ///
    /// An empty row list gives a `0x0` matrix.
    pub fn from_rows(rows: Vec<Vec<Expr>>) -> Result<Self, MeaError> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        let row_count = rows.len();
        let mut entries = Vec::with_capacity(row_count * cols);
        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(shape_error("ragged-rows", "matrix rows differ in length")
                    .with_context("row", idx.to_string())
                    .with_context("expected", cols.to_string())
                    .with_context("found", row.len().to_string()));
            }
            entries.extend(row);
        }
        Ok(Self {
            rows: row_count,
            cols,
            entries,
        })
    }

    /// Parses every cell of a string table.
    pub fn parse_rows<R, S>(rows: R) -> Result<Self, MeaError>
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = Vec::new();
        for (row_idx, row) in rows.into_iter().enumerate() {
            let mut out = Vec::new();
            for (col_idx, cell) in row.into_iter().enumerate() {
                let expr = parse_expr(cell.as_ref()).map_err(|err| {
                    err.with_context("row", row_idx.to_string())
                        .with_context("col", col_idx.to_string())
                })?;
                out.push(expr);
            }
            parsed.push(out);
        }
        Self::from_rows(parsed)
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Entry at `(row, col)`, or `None` when out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<&Expr> {
        if row < self.rows && col < self.cols {
            self.entries.get(row * self.cols + col)
        } else {
            None
        }
    }

    /// Row slice, or `None` when out of range.
    pub fn row(&self, row: usize) -> Option<&[Expr]> {
        if row < self.rows {
            Some(&self.entries[row * self.cols..(row + 1) * self.cols])
        } else {
            None
        }
    }

    /// Iterates over rows.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Expr]> + '_ {
        (0..self.rows).map(move |row| &self.entries[row * self.cols..(row + 1) * self.cols])
    }

    /// Applies `f` to every entry.
    pub fn map<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&Expr) -> Expr,
    {
        Self {
            rows: self.rows,
            cols: self.cols,
            entries: self.entries.iter().map(|entry| f(entry)).collect(),
        }
    }

    /// Applies a fallible `f` to every entry.
    pub fn try_map<F, E>(&self, f: F) -> Result<Self, E>
    where
        F: FnMut(&Expr) -> Result<Expr, E>,
    {
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            entries: self.entries.iter().map(f).collect::<Result<_, _>>()?,
        })
    }

    /// Canonical form of every entry.
    pub fn simplify(&self) -> Self {
        self.map(Expr::simplify)
    }

    /// Entry-wise algebraic equivalence; shapes must match.
    pub fn equivalent(&self, other: &ExprMatrix, opts: &EquivalenceOpts) -> bool {
        self.shape() == other.shape()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(lhs, rhs)| lhs.equivalent(rhs, opts))
    }

    /// Positions `(row, col)` whose entries are not equivalent.
    pub fn mismatches(&self, other: &ExprMatrix, opts: &EquivalenceOpts) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for row in 0..self.rows.min(other.rows) {
            for col in 0..self.cols.min(other.cols) {
                if let (Some(lhs), Some(rhs)) = (self.get(row, col), other.get(row, col)) {
                    if !lhs.equivalent(rhs, opts) {
                        out.push((row, col));
                    }
                }
            }
        }
        out
    }

    /// Rows as owned vectors.
    pub fn to_rows(&self) -> Vec<Vec<Expr>> {
        self.iter_rows().map(<[Expr]>::to_vec).collect()
    }
}

impl TryFrom<Vec<Vec<Expr>>> for ExprMatrix {
    type Error = MeaError;

    fn try_from(rows: Vec<Vec<Expr>>) -> Result<Self, Self::Error> {
        ExprMatrix::from_rows(rows)
    }
}

impl From<ExprMatrix> for Vec<Vec<Expr>> {
    fn from(matrix: ExprMatrix) -> Self {
        matrix.to_rows()
    }
}
