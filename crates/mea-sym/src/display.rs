//! Infix rendering.
//!
//! Output is accepted by [`crate::parse_expr`] and reads like conventional
//! computer-algebra output: `c_2*y_0/(c_6 + y_0) - y_1**2/2`.

use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed};

use crate::expr::{Expr, ExprKind};

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self))
    }
}

impl fmt::Display for ExprKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(&Expr::from_kind(self.clone())))
    }
}

fn render(expr: &Expr) -> String {
    match expr.kind() {
        ExprKind::Number(value) => render_number(value),
        ExprKind::Symbol(symbol) => symbol.name().to_string(),
        ExprKind::Add(terms) => {
            let mut out = String::new();
            for (idx, term) in terms.iter().enumerate() {
                if idx == 0 {
                    out.push_str(&render(term));
                } else if term.is_negative_term() {
                    out.push_str(" - ");
                    out.push_str(&render(&-term));
                } else {
                    out.push_str(" + ");
                    out.push_str(&render(term));
                }
            }
            out
        }
        ExprKind::Mul(factors) => render_product(factors),
        ExprKind::Pow(_, exponent) if *exponent < 0 => render_product(std::slice::from_ref(expr)),
        ExprKind::Pow(base, exponent) => format!("{}**{exponent}", render_base(base)),
    }
}

fn render_number(value: &BigRational) -> String {
    if value.is_integer() {
        value.numer().to_string()
    } else {
        format!("{}/{}", value.numer(), value.denom())
    }
}

fn render_base(base: &Expr) -> String {
    match base.kind() {
        ExprKind::Symbol(symbol) => symbol.name().to_string(),
        ExprKind::Number(value) if value.is_integer() && !value.is_negative() => {
            render_number(value)
        }
        _ => format!("({})", render(base)),
    }
}

// Nested products are grouped so a product landing after `/` divides as a whole.
fn render_factor(factor: &Expr) -> String {
    match factor.kind() {
        ExprKind::Add(_) | ExprKind::Mul(_) => format!("({})", render(factor)),
        ExprKind::Number(value) if value.is_negative() || !value.is_integer() => {
            format!("({})", render(factor))
        }
        _ => render(factor),
    }
}

fn render_product(factors: &[Expr]) -> String {
    let mut coefficient = BigRational::one();
    let mut numerator = Vec::new();
    let mut denominator = Vec::new();
    for factor in factors {
        match factor.kind() {
            ExprKind::Number(value) => coefficient *= value,
            ExprKind::Pow(base, exponent) if *exponent < 0 => {
                denominator.push(base.pow(-exponent));
            }
            _ => numerator.push(factor.clone()),
        }
    }

    let negative = coefficient.is_negative();
    let magnitude = coefficient.abs();
    let mut head: Vec<String> = Vec::new();
    if magnitude.numer() != &BigInt::one() {
        head.push(magnitude.numer().to_string());
    }
    head.extend(numerator.iter().map(render_factor));
    let mut tail: Vec<String> = Vec::new();
    if magnitude.denom() != &BigInt::one() {
        tail.push(magnitude.denom().to_string());
    }
    tail.extend(denominator.iter().map(render_factor));

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if head.is_empty() {
        out.push('1');
    } else {
        out.push_str(&head.join("*"));
    }
    match tail.len() {
        0 => {}
        1 => {
            out.push('/');
            out.push_str(&tail[0]);
        }
        _ => {
            out.push_str("/(");
            out.push_str(&tail.join("*"));
            out.push(')');
        }
    }
    out
}
