pub mod operators;
pub mod registry;
pub mod signature;

pub use registry::{
    FallbackFunction, Function, FunctionRegistry, Overload, Registration, Resolve,
    FALLBACK_IDENTIFIER,
};
pub use signature::{PrimitiveType, Signature, TypePattern};

/// Loads the default function set into `registry`.
pub fn register_functions(registry: &mut FunctionRegistry) {
    operators::register(registry);
}
