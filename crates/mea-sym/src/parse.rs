//! Infix expression parser.
//!
//! Accepts the notation used for propensities and reference matrices:
//! `+ - * /`, `**` (or `^`) with integer exponents, parentheses, integer and
//! decimal literals and identifiers such as `c_0` or `y_12`.

use mea_core::errors::{ErrorInfo, MeaError};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;

use crate::expr::{Expr, ExprKind};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(BigRational),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Power,
    LParen,
    RParen,
}

fn parse_error(code: &str, message: impl Into<String>, input: &str, position: usize) -> MeaError {
    MeaError::Parse(
        ErrorInfo::new(code, message)
            .with_context("input", input)
            .with_context("position", position.to_string()),
    )
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, MeaError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut idx = 0;
    while idx < chars.len() {
        let ch = chars[idx];
        let start = idx;
        match ch {
            c if c.is_whitespace() => {
                idx += 1;
            }
            '+' => {
                tokens.push((Token::Plus, start));
                idx += 1;
            }
            '-' => {
                tokens.push((Token::Minus, start));
                idx += 1;
            }
            '*' => {
                if chars.get(idx + 1) == Some(&'*') {
                    tokens.push((Token::Power, start));
                    idx += 2;
                } else {
                    tokens.push((Token::Star, start));
                    idx += 1;
                }
            }
            '^' => {
                tokens.push((Token::Power, start));
                idx += 1;
            }
            '/' => {
                tokens.push((Token::Slash, start));
                idx += 1;
            }
            '(' => {
                tokens.push((Token::LParen, start));
                idx += 1;
            }
            ')' => {
                tokens.push((Token::RParen, start));
                idx += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                while idx < chars.len() && (chars[idx].is_ascii_digit() || chars[idx] == '.') {
                    idx += 1;
                }
                let literal: String = chars[start..idx].iter().collect();
                let value = parse_decimal(&literal)
                    .ok_or_else(|| parse_error("bad-literal", "malformed number", input, start))?;
                tokens.push((Token::Number(value), start));
            }
            c if c.is_alphabetic() || c == '_' => {
                while idx < chars.len() && (chars[idx].is_alphanumeric() || chars[idx] == '_') {
                    idx += 1;
                }
                let name: String = chars[start..idx].iter().collect();
                tokens.push((Token::Ident(name), start));
            }
            other => {
                return Err(parse_error(
                    "unexpected-character",
                    format!("unexpected character '{other}'"),
                    input,
                    start,
                ));
            }
        }
    }
    Ok(tokens)
}

fn parse_decimal(literal: &str) -> Option<BigRational> {
    let mut parts = literal.splitn(2, '.');
    let whole = parts.next().unwrap_or("");
    let fraction = parts.next();
    if fraction.map(|f| f.contains('.')).unwrap_or(false) {
        return None;
    }
    if whole.is_empty() && fraction.map(str::is_empty).unwrap_or(true) {
        return None;
    }
    let whole_value = if whole.is_empty() {
        BigInt::zero()
    } else {
        whole.parse::<BigInt>().ok()?
    };
    let mut value = BigRational::from_integer(whole_value);
    if let Some(digits) = fraction.filter(|digits| !digits.is_empty()) {
        let numer = digits.parse::<BigInt>().ok()?;
        let denom = num_traits::pow(BigInt::from(10u32), digits.len());
        value += BigRational::new(numer, denom);
    }
    Some(value)
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<(Token, usize)>,
    cursor: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor).map(|(token, _)| token)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.cursor)
            .map(|(_, position)| *position)
            .unwrap_or(self.input.len())
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor).map(|(token, _)| token.clone());
        self.cursor += 1;
        token
    }

    fn expression(&mut self) -> Result<Expr, MeaError> {
        let mut terms = vec![self.term()?];
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.advance();
                    terms.push(self.term()?);
                }
                Some(Token::Minus) => {
                    self.advance();
                    terms.push(-self.term()?);
                }
                _ => break,
            }
        }
        Ok(Expr::sum(terms))
    }

    fn term(&mut self) -> Result<Expr, MeaError> {
        let mut factors = vec![self.unary()?];
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.advance();
                    factors.push(self.unary()?);
                }
                Some(Token::Slash) => {
                    let position = self.position();
                    self.advance();
                    let divisor = self.unary()?;
                    if divisor.is_zero() {
                        return Err(parse_error(
                            "division-by-zero",
                            "literal division by zero",
                            self.input,
                            position,
                        ));
                    }
                    factors.push(divisor.recip());
                }
                _ => break,
            }
        }
        Ok(Expr::product(factors))
    }

    fn unary(&mut self) -> Result<Expr, MeaError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                Ok(-self.unary()?)
            }
            Some(Token::Plus) => {
                self.advance();
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr, MeaError> {
        let base = self.atom()?;
        if self.peek() != Some(&Token::Power) {
            return Ok(base);
        }
        self.advance();
        let position = self.position();
        let exponent = self.unary()?;
        let exponent = match exponent.kind() {
            ExprKind::Number(value) if value.is_integer() => value.to_integer(),
            _ => {
                return Err(parse_error(
                    "unsupported-exponent",
                    format!("only integer exponents are supported, found '{exponent}'"),
                    self.input,
                    position,
                ))
            }
        };
        let exponent = i64::try_from(exponent).map_err(|_| {
            parse_error("unsupported-exponent", "exponent out of range", self.input, position)
        })?;
        if base.is_zero() && exponent < 0 {
            return Err(parse_error(
                "division-by-zero",
                "zero raised to a negative power",
                self.input,
                position,
            ));
        }
        Ok(base.pow(exponent))
    }

    fn atom(&mut self) -> Result<Expr, MeaError> {
        let position = self.position();
        match self.advance() {
            Some(Token::Number(value)) => Ok(Expr::number(value)),
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    return Err(parse_error(
                        "unsupported-function",
                        format!("function calls are not supported ('{name}')"),
                        self.input,
                        position,
                    )
                    .with_context("function", name));
                }
                Ok(Expr::symbol(name))
            }
            Some(Token::LParen) => {
                let inner = self.expression()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(parse_error(
                        "unbalanced-parenthesis",
                        "missing closing parenthesis",
                        self.input,
                        position,
                    )),
                }
            }
            Some(other) => Err(parse_error(
                "unexpected-token",
                format!("unexpected token {other:?}"),
                self.input,
                position,
            )),
            None => Err(parse_error(
                "unexpected-end",
                "expression ended early",
                self.input,
                position,
            )),
        }
    }
}

/// Parses an infix expression.
pub fn parse_expr(input: &str) -> Result<Expr, MeaError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(parse_error("empty-expression", "expression is empty", input, 0));
    }
    let mut parser = Parser {
        input,
        tokens,
        cursor: 0,
    };
    let expr = parser.expression()?;
    if parser.cursor < parser.tokens.len() {
        let position = parser.position();
        return Err(parse_error(
            "trailing-input",
            "unexpected input after expression",
            input,
            position,
        ));
    }
    Ok(expr)
}

/// Parses an expression and returns its canonical form.
pub fn parse_simplified(input: &str) -> Result<Expr, MeaError> {
    Ok(parse_expr(input)?.simplify())
}
