use crate::ast::{ASTNode, LiteralKind, Parser};
use crate::error::EvalResult;
use crate::functions::{FunctionRegistry, Resolve};
use crate::value::{ObjectMap, Value};
use log::{debug, trace};
use lru::LruCache;
use rayon::prelude::*;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

const DEFAULT_CACHE_SIZE: usize = 100;
const TRUE_SPELLINGS: [&str; 3] = ["true", "True", "TRUE"];

/// Evaluates `node` by structural recursion.
///
/// Call arguments are evaluated left to right before the call itself is
/// handed to `resolver`; operators are calls like any other.
pub fn evaluate<R: Resolve + ?Sized>(node: &ASTNode, resolver: &R) -> EvalResult<Value> {
    match node {
        ASTNode::Literal { kind, text } => Ok(evaluate_literal(*kind, text)),

        ASTNode::Array(items) => items
            .iter()
            .map(|item| evaluate(item, resolver))
            .collect::<EvalResult<Vec<_>>>()
            .map(Value::Array),

        ASTNode::Object(entries) => {
            let mut object = ObjectMap::new();
            for (key, value) in entries {
                let key = match evaluate(key, resolver)? {
                    Value::String(key) => key,
                    other => other.to_display_string().unwrap_or_default(),
                };
                let value = evaluate(value, resolver)?;
                object.insert(key, value);
            }
            Ok(Value::Object(object))
        }

        ASTNode::FunctionCall { name, args } => {
            let args = args
                .iter()
                .map(|arg| evaluate(arg, resolver))
                .collect::<EvalResult<Vec<_>>>()?;
            trace!("Calling {} with {:?}", name, args);
            resolver.resolve(name, &args)
        }
    }
}

fn evaluate_literal(kind: LiteralKind, text: &str) -> Value {
    match kind {
        LiteralKind::Integer => match text.parse::<i64>() {
            Ok(n) => Value::Integer(n),
            Err(_) => Value::Float(text.parse::<f64>().unwrap_or(f64::INFINITY)),
        },
        LiteralKind::Float => Value::Float(text.parse::<f64>().unwrap_or_default()),
        LiteralKind::Boolean => Value::Bool(TRUE_SPELLINGS.contains(&text)),
        LiteralKind::String => Value::String(unescape(strip_quotes(text))),
    }
}

fn strip_quotes(text: &str) -> &str {
    let mut chars = text.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}

/// `\X` becomes `X` for any character `X`.
fn unescape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                result.push(escaped);
            }
        } else {
            result.push(c);
        }
    }
    result
}

/// Evaluates expressions against a function registry, caching parsed ASTs.
pub struct Evaluator {
    registry: FunctionRegistry,
    cache: Option<Mutex<LruCache<String, Arc<ASTNode>>>>,
}

impl Evaluator {
    /// Creates an `Evaluator` caching up to 100 parsed expressions.
    pub fn new(registry: FunctionRegistry) -> Self {
        Self::with_cache_size(registry, DEFAULT_CACHE_SIZE)
    }

    /// Creates an `Evaluator` with a given maximum cache size; `0` disables caching.
    pub fn with_cache_size(registry: FunctionRegistry, max_cache_size: usize) -> Self {
        Self {
            registry,
            cache: NonZeroUsize::new(max_cache_size).map(|size| Mutex::new(LruCache::new(size))),
        }
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Parse an expression string into an AST.
    pub fn parse_expression(&self, expression: &str) -> EvalResult<Arc<ASTNode>> {
        let Some(cache) = &self.cache else {
            return Parser::parse_expression(expression).map(Arc::new);
        };

        if let Some(ast) = cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(expression)
        {
            trace!("Cache hit for expression: {}", expression);
            return Ok(Arc::clone(ast));
        }

        let ast = Arc::new(Parser::parse_expression(expression)?);
        cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(expression.to_string(), Arc::clone(&ast));
        Ok(ast)
    }

    /// Evaluates a given expression string.
    ///
    /// # Returns
    ///
    /// * `Ok(Value)` if the evaluation succeeds.
    /// * `Err(EvalError)` from the first failing stage, or from a handler.
    pub fn evaluate_expression(&self, expression: &str) -> EvalResult<Value> {
        debug!("Evaluating expression: {}", expression);
        let ast = self.parse_expression(expression)?;
        self.evaluate_ast(&ast)
    }

    /// Evaluate an already parsed AST.
    pub fn evaluate_ast(&self, ast: &ASTNode) -> EvalResult<Value> {
        evaluate(ast, &self.registry)
    }

    /// Evaluates independent expressions in parallel. Results keep the input order.
    pub fn evaluate_batch<S: AsRef<str> + Sync>(&self, expressions: &[S]) -> Vec<EvalResult<Value>> {
        debug!("Evaluating batch of {} expressions", expressions.len());
        expressions
            .par_iter()
            .map(|expression| self.evaluate_expression(expression.as_ref()))
            .collect()
    }

    pub fn cached_expressions(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| {
            cache.lock().unwrap_or_else(PoisonError::into_inner).len()
        })
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(FunctionRegistry::with_defaults())
    }
}

impl From<FunctionRegistry> for Evaluator {
    fn from(registry: FunctionRegistry) -> Self {
        Self::new(registry)
    }
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("registry", &self.registry)
            .field("cached_expressions", &self.cached_expressions())
            .finish()
    }
}
