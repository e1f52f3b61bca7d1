use std::collections::HashMap;
use thiserror::Error;

/// Molar gas constant in J/(mol·K), SGTE convention.
pub const GAS_CONSTANT: f64 = 8.31451;

/// Depth limit for resolving FUNCTION symbols through the database table.
/// Real databases nest a handful of levels; anything deeper is a cycle.
const MAX_RESOLVE_DEPTH: usize = 64;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExprError {
    #[error("Unknown symbol '{0}' in expression")]
    UnknownSymbol(String),
    #[error("Domain error: {op}({arg}) is undefined")]
    Domain { op: &'static str, arg: f64 },
    #[error("Symbol resolution exceeded depth limit at '{0}' (cyclic FUNCTION reference)")]
    RecursionLimit(String),
    #[error("Piecewise expression has no branches")]
    EmptyPiecewise,
}

/// A symbolic temperature expression as written in TDB FUNCTION and
/// PARAMETER statements.
///
/// The only free variables that appear in practice are `T`, `P`, the gas
/// constant `R`, and references to other named database functions.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Var(String),
    Sum(Vec<Expr>),
    Prod(Vec<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Ln(Box<Expr>),
    Exp(Box<Expr>),
}

/// Supplies the state variables and the database symbol table used when
/// evaluating an [`Expr`] numerically.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub temperature: f64,
    pub pressure: f64,
    pub functions: Option<&'a HashMap<String, Piecewise>>,
}

impl<'a> EvalContext<'a> {
    pub fn new(temperature: f64, pressure: f64) -> Self {
        Self {
            temperature,
            pressure,
            functions: None,
        }
    }

    pub fn with_functions(
        temperature: f64,
        pressure: f64,
        functions: &'a HashMap<String, Piecewise>,
    ) -> Self {
        Self {
            temperature,
            pressure,
            functions: Some(functions),
        }
    }
}

impl Expr {
    pub fn eval(&self, ctx: &EvalContext) -> Result<f64, ExprError> {
        self.eval_depth(ctx, 0)
    }

    fn eval_depth(&self, ctx: &EvalContext, depth: usize) -> Result<f64, ExprError> {
        match self {
            Expr::Num(v) => Ok(*v),
            Expr::Var(name) => match name.as_str() {
                "T" => Ok(ctx.temperature),
                "P" => Ok(ctx.pressure),
                "R" => Ok(GAS_CONSTANT),
                _ => {
                    if depth >= MAX_RESOLVE_DEPTH {
                        return Err(ExprError::RecursionLimit(name.clone()));
                    }
                    let piecewise = ctx
                        .functions
                        .and_then(|table| table.get(name))
                        .ok_or_else(|| ExprError::UnknownSymbol(name.clone()))?;
                    piecewise.eval_depth(ctx.temperature, ctx, depth + 1)
                }
            },
            Expr::Sum(terms) => {
                let mut acc = 0.0;
                for term in terms {
                    acc += term.eval_depth(ctx, depth)?;
                }
                Ok(acc)
            }
            Expr::Prod(factors) => {
                let mut acc = 1.0;
                for factor in factors {
                    acc *= factor.eval_depth(ctx, depth)?;
                }
                Ok(acc)
            }
            Expr::Pow(base, exponent) => {
                let b = base.eval_depth(ctx, depth)?;
                let e = exponent.eval_depth(ctx, depth)?;
                if b == 0.0 && e < 0.0 {
                    return Err(ExprError::Domain { op: "pow", arg: b });
                }
                if b < 0.0 && e.fract() != 0.0 {
                    return Err(ExprError::Domain { op: "pow", arg: b });
                }
                Ok(b.powf(e))
            }
            Expr::Neg(inner) => Ok(-inner.eval_depth(ctx, depth)?),
            Expr::Ln(inner) => {
                let v = inner.eval_depth(ctx, depth)?;
                if v <= 0.0 {
                    return Err(ExprError::Domain { op: "ln", arg: v });
                }
                Ok(v.ln())
            }
            Expr::Exp(inner) => Ok(inner.eval_depth(ctx, depth)?.exp()),
        }
    }
}

/// One temperature branch of a piecewise TDB expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub t_lower: f64,
    pub t_upper: f64,
    pub expr: Expr,
}

/// A piecewise temperature expression, as written by TDB `FUNCTION` and
/// `PARAMETER` statements: an ordered, contiguous list of branches.
///
/// Temperatures outside the covered range evaluate the nearest branch, which
/// matches the permissive extrapolation of common assessment tooling.
#[derive(Debug, Clone, PartialEq)]
pub struct Piecewise {
    branches: Vec<Branch>,
}

impl Piecewise {
    pub fn new(branches: Vec<Branch>) -> Result<Self, ExprError> {
        if branches.is_empty() {
            return Err(ExprError::EmptyPiecewise);
        }
        Ok(Self { branches })
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Temperature span covered by the branches.
    pub fn range(&self) -> (f64, f64) {
        (
            self.branches[0].t_lower,
            self.branches[self.branches.len() - 1].t_upper,
        )
    }

    pub fn eval_at(&self, temperature: f64, ctx: &EvalContext) -> Result<f64, ExprError> {
        self.eval_depth(temperature, ctx, 0)
    }

    fn eval_depth(
        &self,
        temperature: f64,
        ctx: &EvalContext,
        depth: usize,
    ) -> Result<f64, ExprError> {
        let branch = self
            .branches
            .iter()
            .find(|b| temperature >= b.t_lower && temperature < b.t_upper)
            .unwrap_or_else(|| {
                if temperature < self.branches[0].t_lower {
                    &self.branches[0]
                } else {
                    &self.branches[self.branches.len() - 1]
                }
            });
        let local = EvalContext {
            temperature,
            pressure: ctx.pressure,
            functions: ctx.functions,
        };
        branch.expr.eval_depth(&local, depth)
    }
}
