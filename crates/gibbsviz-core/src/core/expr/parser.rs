use super::ast::Expr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExprParseError {
    #[error("Unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { pos: usize, ch: char },
    #[error("Unexpected token '{found}' at position {pos}")]
    UnexpectedToken { pos: usize, found: String },
    #[error("Unexpected end of expression")]
    UnexpectedEnd,
    #[error("Unknown function '{0}'")]
    UnknownFunction(String),
    #[error("Malformed numeric literal at position {0}")]
    BadNumber(usize),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    DoubleStar,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Num(v) => v.to_string(),
            Token::Ident(s) => s.clone(),
            Token::Plus => "+".to_string(),
            Token::Minus => "-".to_string(),
            Token::Star => "*".to_string(),
            Token::Slash => "/".to_string(),
            Token::DoubleStar => "**".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<(usize, Token)>, ExprParseError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push((i, Token::Plus));
                i += 1;
            }
            '-' => {
                tokens.push((i, Token::Minus));
                i += 1;
            }
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push((i, Token::DoubleStar));
                    i += 2;
                } else {
                    tokens.push((i, Token::Star));
                    i += 1;
                }
            }
            '/' => {
                tokens.push((i, Token::Slash));
                i += 1;
            }
            '(' => {
                tokens.push((i, Token::LParen));
                i += 1;
            }
            ')' => {
                tokens.push((i, Token::RParen));
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // Scientific-notation suffix: E or e followed by an optional
                // sign and digits, as in 2.29603E+31 or -5.8927E-08.
                if i < chars.len() && (chars[i] == 'E' || chars[i] == 'e') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        i = j;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ExprParseError::BadNumber(start))?;
                tokens.push((start, Token::Num(value)));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '#')
                {
                    i += 1;
                }
                // FUNCTION references may carry a '#' suffix; the symbol
                // table is keyed without it.
                let ident: String = chars[start..i].iter().collect();
                let ident = ident.trim_end_matches('#');
                tokens.push((start, Token::Ident(ident.to_ascii_uppercase())));
            }
            other => return Err(ExprParseError::UnexpectedChar { pos: i, ch: other }),
        }
    }

    Ok(tokens)
}

/// Parses a TDB arithmetic expression into an [`Expr`].
///
/// Supports `+ - * / **`, parentheses, scientific-notation literals,
/// `LN(x)`/`LOG(x)` (both natural log in TDB usage), `EXP(x)`, and bare
/// symbol references such as `T` or `GHSERFE`.
pub fn parse(input: &str) -> Result<Expr, ExprParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_sum()?;
    if let Some((pos, token)) = parser.peek_full() {
        return Err(ExprParseError::UnexpectedToken {
            pos,
            found: token.describe(),
        });
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn peek_full(&self) -> Option<(usize, Token)> {
        self.tokens.get(self.pos).cloned()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(_, t)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect_rparen(&mut self) -> Result<(), ExprParseError> {
        match self.advance() {
            Some(Token::RParen) => Ok(()),
            Some(other) => Err(ExprParseError::UnexpectedToken {
                pos: self.tokens[self.pos - 1].0,
                found: other.describe(),
            }),
            None => Err(ExprParseError::UnexpectedEnd),
        }
    }

    fn parse_sum(&mut self) -> Result<Expr, ExprParseError> {
        let mut terms = vec![self.parse_term()?];
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.advance();
                    terms.push(self.parse_term()?);
                }
                Some(Token::Minus) => {
                    self.advance();
                    terms.push(Expr::Neg(Box::new(self.parse_term()?)));
                }
                _ => break,
            }
        }
        Ok(collapse(terms, Expr::Sum))
    }

    fn parse_term(&mut self) -> Result<Expr, ExprParseError> {
        let mut factors = vec![self.parse_unary()?];
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.advance();
                    factors.push(self.parse_unary()?);
                }
                Some(Token::Slash) => {
                    self.advance();
                    let divisor = self.parse_unary()?;
                    factors.push(Expr::Pow(Box::new(divisor), Box::new(Expr::Num(-1.0))));
                }
                _ => break,
            }
        }
        Ok(collapse(factors, Expr::Prod))
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprParseError> {
        match self.peek() {
            Some(Token::Plus) => {
                self.advance();
                self.parse_unary()
            }
            Some(Token::Minus) => {
                self.advance();
                Ok(Expr::Neg(Box::new(self.parse_unary()?)))
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Expr, ExprParseError> {
        let base = self.parse_atom()?;
        if let Some(Token::DoubleStar) = self.peek() {
            self.advance();
            // Right-associative; the exponent may carry its own sign.
            let exponent = self.parse_unary()?;
            return Ok(Expr::Pow(Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn parse_atom(&mut self) -> Result<Expr, ExprParseError> {
        match self.advance() {
            Some(Token::Num(v)) => Ok(Expr::Num(v)),
            Some(Token::Ident(name)) => {
                if let Some(Token::LParen) = self.peek() {
                    self.advance();
                    let argument = self.parse_sum()?;
                    self.expect_rparen()?;
                    match name.as_str() {
                        "LN" | "LOG" => Ok(Expr::Ln(Box::new(argument))),
                        "EXP" => Ok(Expr::Exp(Box::new(argument))),
                        _ => Err(ExprParseError::UnknownFunction(name)),
                    }
                } else {
                    Ok(Expr::Var(name))
                }
            }
            Some(Token::LParen) => {
                let inner = self.parse_sum()?;
                self.expect_rparen()?;
                Ok(inner)
            }
            Some(other) => Err(ExprParseError::UnexpectedToken {
                pos: self.tokens[self.pos - 1].0,
                found: other.describe(),
            }),
            None => Err(ExprParseError::UnexpectedEnd),
        }
    }
}

fn collapse(mut parts: Vec<Expr>, wrap: fn(Vec<Expr>) -> Expr) -> Expr {
    if parts.len() == 1 {
        parts.pop().unwrap_or(Expr::Num(0.0))
    } else {
        wrap(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::expr::ast::EvalContext;

    const TOLERANCE: f64 = 1e-9;

    fn eval_at(input: &str, t: f64) -> f64 {
        parse(input)
            .unwrap()
            .eval(&EvalContext::new(t, 101_325.0))
            .unwrap()
    }

    #[test]
    fn parses_plain_numbers_and_signs() {
        assert_eq!(eval_at("42", 300.0), 42.0);
        assert_eq!(eval_at("-42", 300.0), -42.0);
        assert_eq!(eval_at("+42", 300.0), 42.0);
    }

    #[test]
    fn parses_scientific_notation() {
        assert!((eval_at("2.29603E+31", 300.0) - 2.29603e31).abs() < 1e18);
        assert!((eval_at("-5.8927E-08", 300.0) - (-5.8927e-8)).abs() < TOLERANCE);
    }

    #[test]
    fn respects_operator_precedence() {
        assert_eq!(eval_at("2+3*4", 300.0), 14.0);
        assert_eq!(eval_at("(2+3)*4", 300.0), 20.0);
        assert_eq!(eval_at("2*3**2", 300.0), 18.0);
        assert_eq!(eval_at("12/4/3", 300.0), 1.0);
    }

    #[test]
    fn parses_negative_parenthesized_exponents() {
        let value = eval_at("77359*T**(-1)", 500.0);
        assert!((value - 77359.0 / 500.0).abs() < TOLERANCE);
        let value = eval_at("T**(-9)", 2.0);
        assert!((value - 2.0_f64.powi(-9)).abs() < TOLERANCE);
    }

    #[test]
    fn parses_ln_log_and_exp() {
        assert!((eval_at("LN(T)", 500.0) - 500.0_f64.ln()).abs() < TOLERANCE);
        assert!((eval_at("LOG(T)", 500.0) - 500.0_f64.ln()).abs() < TOLERANCE);
        assert!((eval_at("EXP(1)", 300.0) - 1.0_f64.exp()).abs() < TOLERANCE);
    }

    #[test]
    fn evaluates_an_sgte_lattice_stability_term() {
        let input = "+1225.7+124.134*T-23.5143*T*LN(T)-0.00439752*T**2-5.8927E-08*T**3+77359*T**(-1)";
        let t: f64 = 500.0;
        let expected = 1225.7 + 124.134 * t - 23.5143 * t * t.ln() - 0.00439752 * t * t
            - 5.8927e-8 * t * t * t
            + 77359.0 / t;
        assert!((eval_at(input, t) - expected).abs() < 1e-6);
    }

    #[test]
    fn identifiers_are_case_insensitive() {
        assert!((eval_at("ln(t)", 500.0) - 500.0_f64.ln()).abs() < TOLERANCE);
    }

    #[test]
    fn function_reference_suffix_is_dropped() {
        assert_eq!(parse("GHSERFE#").unwrap(), Expr::Var("GHSERFE".to_string()));
    }

    #[test]
    fn rejects_unknown_call_syntax() {
        let result = parse("GHSERFE(T)");
        assert!(matches!(result, Err(ExprParseError::UnknownFunction(_))));
    }

    #[test]
    fn rejects_unexpected_characters() {
        let result = parse("1 @ 2");
        assert!(matches!(
            result,
            Err(ExprParseError::UnexpectedChar { ch: '@', .. })
        ));
    }

    #[test]
    fn rejects_trailing_garbage() {
        let result = parse("1+2)");
        assert!(matches!(
            result,
            Err(ExprParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn rejects_truncated_expressions() {
        assert!(matches!(parse("1+"), Err(ExprParseError::UnexpectedEnd)));
        assert!(matches!(parse("LN(T"), Err(ExprParseError::UnexpectedEnd)));
    }
}
