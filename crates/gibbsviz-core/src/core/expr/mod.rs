pub mod ast;
pub mod parser;

pub use ast::{Branch, EvalContext, Expr, ExprError, GAS_CONSTANT, Piecewise};
pub use parser::{ExprParseError, parse};
