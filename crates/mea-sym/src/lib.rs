#![deny(missing_docs)]
#![doc = "Exact rational-function expression algebra: parsing, canonical simplification, differentiation, evaluation and equivalence checks."]

mod diff;
mod display;
/// Exact evaluation and algebraic equivalence checks.
pub mod eval;
/// Expression trees and constructors.
pub mod expr;
/// Shape-checked matrices of expressions.
pub mod matrix;
/// Infix expression parser.
pub mod parse;
mod simplify;

pub use eval::{Bindings, EquivalenceOpts};
pub use expr::{Expr, ExprKind, Symbol};
pub use matrix::ExprMatrix;
pub use parse::{parse_expr, parse_simplified};
