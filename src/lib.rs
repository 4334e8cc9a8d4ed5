//! Embeddable expression language.
//!
//! An expression is tokenized, parsed into an [`ast::ASTNode`] tree and
//! evaluated against a [`FunctionRegistry`]. Operators desugar to calls on
//! reserved identifiers (`1 + 2` is `__add(1, 2)`), so hosts can override
//! them per argument type with the same overload mechanism as any function.

pub mod ast;
pub mod error;
pub mod functions;
pub mod lexer;
pub mod value;

pub use ast::{evaluate, Evaluator};
pub use error::{EvalError, EvalResult};
pub use functions::{FunctionRegistry, Resolve};
pub use value::{Number, ObjectMap, OpaqueValue, Value};

use ast::Parser;

/// Tokenizes, parses and evaluates `expression` in one go.
pub fn evaluate_expression(expression: &str, registry: &FunctionRegistry) -> EvalResult<Value> {
    let ast = Parser::parse_expression(expression)?;
    evaluate(&ast, registry)
}
