use crate::error::{EvalError, EvalResult};
use crate::functions::signature::Signature;
use crate::value::Value;
use log::{debug, trace, warn};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Handler taking the evaluated arguments positionally.
pub type Function = Arc<dyn Fn(&[Value]) -> EvalResult<Value> + Send + Sync>;

/// Handler invoked for identifiers that have no registration.
pub type FallbackFunction = Arc<dyn Fn(&str, &[Value]) -> EvalResult<Value> + Send + Sync>;

/// Identifier reserved for the fallback handler.
pub const FALLBACK_IDENTIFIER: &str = "*";

/// Resolves a call to a value. This is the only dependency of the tree walker.
pub trait Resolve {
    fn resolve(&self, identifier: &str, args: &[Value]) -> EvalResult<Value>;
}

impl<F> Resolve for F
where
    F: Fn(&str, &[Value]) -> EvalResult<Value>,
{
    fn resolve(&self, identifier: &str, args: &[Value]) -> EvalResult<Value> {
        self(identifier, args)
    }
}

#[derive(Clone)]
pub struct Overload {
    pub signature: Signature,
    pub function: Function,
}

#[derive(Clone)]
pub enum Registration {
    /// Called with any arguments, unchecked.
    Single(Function),
    /// Signatures tried in declaration order; the first match is called.
    Overloads(Vec<Overload>),
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Registration::Single(_) => f.write_str("Single"),
            Registration::Overloads(overloads) => f
                .debug_list()
                .entries(overloads.iter().map(|o| o.signature.text()))
                .finish(),
        }
    }
}

/// Table of host functions consulted for every call and operator.
///
/// Built once by the host, then only read during evaluation, so it can be
/// shared between threads.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Registration>,
    fallback: Option<FallbackFunction>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the default operator implementations.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        crate::functions::register_functions(&mut registry);
        registry
    }

    /// Registers a single handler under `name`, replacing any previous entry.
    ///
    /// Registering under `*` sets the fallback handler, which then receives
    /// the arguments of every call to an unregistered identifier.
    pub fn register_function<F>(&mut self, name: &str, function: F) -> &mut Self
    where
        F: Fn(&[Value]) -> EvalResult<Value> + Send + Sync + 'static,
    {
        if name == FALLBACK_IDENTIFIER {
            return self.register_fallback(move |_, args| function(args));
        }
        if let Some(Registration::Overloads(_)) = self.functions.get(name) {
            warn!("Replacing overload set '{}' with a single handler", name);
        }
        self.functions
            .insert(name.to_string(), Registration::Single(Arc::new(function)));
        self
    }

    /// Adds one overload to the set registered under `name`.
    ///
    /// A signature with the same declared text replaces the existing overload
    /// in place; a new one is appended after those already declared. The `*`
    /// fallback takes no signatures.
    pub fn register_overload<F>(
        &mut self,
        name: &str,
        signature: &str,
        function: F,
    ) -> EvalResult<&mut Self>
    where
        F: Fn(&[Value]) -> EvalResult<Value> + Send + Sync + 'static,
    {
        if name == FALLBACK_IDENTIFIER {
            return Err(EvalError::Signature {
                signature: signature.to_string(),
                message: format!("'{}' is the fallback and cannot be overloaded", name),
            });
        }
        let overload = Overload {
            signature: Signature::parse(signature)?,
            function: Arc::new(function),
        };
        self.insert_overload(name, overload);
        Ok(self)
    }

    /// Sets the `*` handler used for unregistered identifiers.
    pub fn register_fallback<F>(&mut self, function: F) -> &mut Self
    where
        F: Fn(&str, &[Value]) -> EvalResult<Value> + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(function));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        if name == FALLBACK_IDENTIFIER {
            return self.fallback.is_some();
        }
        self.functions.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Registration> {
        self.functions.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Merges `other` into `self` without overriding anything `self` already has.
    ///
    /// Names missing from `self` are added. When both sides hold an overload
    /// set, `self` gains only the signatures it lacks, appended after its own.
    /// Typical use is a host registry merging [`FunctionRegistry::with_defaults`]
    /// so that its own overloads are tried first.
    pub fn merge(&mut self, other: FunctionRegistry) -> &mut Self {
        for (name, registration) in other.functions {
            if !self.functions.contains_key(&name) {
                self.functions.insert(name, registration);
                continue;
            }
            match (self.functions.get_mut(&name), registration) {
                (Some(Registration::Overloads(existing)), Registration::Overloads(overloads)) => {
                    for overload in overloads {
                        let known = existing
                            .iter()
                            .any(|o| o.signature.text() == overload.signature.text());
                        if !known {
                            existing.push(overload);
                        }
                    }
                }
                _ => debug!("Keeping existing registration for '{}'", name),
            }
        }
        if self.fallback.is_none() {
            self.fallback = other.fallback;
        }
        self
    }

    pub(crate) fn insert_overload(&mut self, name: &str, overload: Overload) {
        let entry = self
            .functions
            .entry(name.to_string())
            .or_insert_with(|| Registration::Overloads(Vec::new()));

        if let Registration::Single(_) = entry {
            warn!("Replacing single handler '{}' with an overload set", name);
            *entry = Registration::Overloads(Vec::new());
        }

        if let Registration::Overloads(overloads) = entry {
            match overloads
                .iter_mut()
                .find(|existing| existing.signature.text() == overload.signature.text())
            {
                Some(existing) => *existing = overload,
                None => overloads.push(overload),
            }
        }
    }

    /// Resolves `name` against the registered functions and calls it.
    ///
    /// Unknown names go to the fallback handler if one is set. Overload sets
    /// pick the first signature, in declaration order, that accepts `args`.
    pub fn resolve(&self, name: &str, args: &[Value]) -> EvalResult<Value> {
        let registration = match self.functions.get(name) {
            Some(registration) => registration,
            None => {
                return match &self.fallback {
                    Some(fallback) => {
                        debug!("Resolving '{}' through fallback handler", name);
                        fallback(name, args)
                    }
                    None => Err(EvalError::UndefinedFunction {
                        name: name.to_string(),
                    }),
                };
            }
        };

        match registration {
            Registration::Single(function) => {
                debug!("Resolving '{}' to single handler", name);
                function(args)
            }
            Registration::Overloads(overloads) => {
                for overload in overloads {
                    trace!("Trying '{}' signature ({})", name, overload.signature);
                    if overload.signature.matches(args) {
                        debug!("Resolving '{}' to signature ({})", name, overload.signature);
                        return (overload.function)(args);
                    }
                }
                Err(EvalError::Argument {
                    name: name.to_string(),
                    signatures: overloads
                        .iter()
                        .map(|o| o.signature.text().to_string())
                        .collect(),
                })
            }
        }
    }
}

impl Resolve for FunctionRegistry {
    fn resolve(&self, identifier: &str, args: &[Value]) -> EvalResult<Value> {
        FunctionRegistry::resolve(self, identifier, args)
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.functions)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}
