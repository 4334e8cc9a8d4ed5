//! Default implementations of the operator identifiers.
//!
//! Hosts opt in through [`FunctionRegistry::with_defaults`] and may override
//! any of them, or add overloads, with their own registrations.

use crate::error::{EvalError, EvalResult};
use crate::functions::{FunctionRegistry, Overload, PrimitiveType, Signature, TypePattern};
use crate::value::{Number, Value};
use evaluation_macros::evaluation_fn;
use log::trace;
use std::sync::Arc;

const NUMERIC: &[PrimitiveType] = &[PrimitiveType::Numeric];
const SCALAR: &[PrimitiveType] = &[
    PrimitiveType::String,
    PrimitiveType::Numeric,
    PrimitiveType::Bool,
    PrimitiveType::Null,
];
const ANY: &[PrimitiveType] = &[PrimitiveType::Mixed];

pub fn register(registry: &mut FunctionRegistry) {
    let overloads: [(&str, &[&[PrimitiveType]], fn(&[Value]) -> EvalResult<Value>); 13] = [
        ("__add", &[NUMERIC, NUMERIC], add),
        ("__sub", &[NUMERIC, NUMERIC], sub),
        ("__mul", &[NUMERIC, NUMERIC], mul),
        ("__div", &[NUMERIC, NUMERIC], div),
        ("__mod", &[NUMERIC, NUMERIC], modulo),
        ("__concat", &[SCALAR, SCALAR], concat),
        ("__equal", &[ANY, ANY], equal),
        ("__not_equal", &[ANY, ANY], not_equal),
        ("__equal_strict", &[ANY, ANY], equal_strict),
        ("__not_equal_strict", &[ANY, ANY], not_equal_strict),
        ("__and", &[ANY, ANY], and),
        ("__or", &[ANY, ANY], or),
        ("__not", &[ANY], not),
    ];

    for (name, params, function) in overloads {
        let signature = Signature::from_patterns(
            params
                .iter()
                .map(|types| TypePattern::from(types.to_vec()))
                .collect(),
        );
        trace!("Registering default {} ({})", name, signature);
        registry.insert_overload(
            name,
            Overload {
                signature,
                function: Arc::new(function),
            },
        );
    }
}

/// Integer arithmetic when both sides are integers and the result fits,
/// float arithmetic otherwise.
fn arithmetic(
    a: Number,
    b: Number,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Value {
    if let (Number::Int(x), Number::Int(y)) = (a, b) {
        if let Some(result) = int_op(x, y) {
            return Value::Integer(result);
        }
    }
    Value::Float(float_op(a.as_f64(), b.as_f64()))
}

#[evaluation_fn]
fn add(a: Number, b: Number) -> EvalResult<Value> {
    Ok(arithmetic(a, b, i64::checked_add, |x, y| x + y))
}

#[evaluation_fn]
fn sub(a: Number, b: Number) -> EvalResult<Value> {
    Ok(arithmetic(a, b, i64::checked_sub, |x, y| x - y))
}

#[evaluation_fn]
fn mul(a: Number, b: Number) -> EvalResult<Value> {
    Ok(arithmetic(a, b, i64::checked_mul, |x, y| x * y))
}

#[evaluation_fn]
fn div(a: Number, b: Number) -> EvalResult<Value> {
    if b.as_f64() == 0.0 {
        return Err(EvalError::DivisionByZero);
    }
    let exact = |x: i64, y: i64| {
        if x.checked_rem(y)? == 0 {
            x.checked_div(y)
        } else {
            None
        }
    };
    Ok(arithmetic(a, b, exact, |x, y| x / y))
}

#[evaluation_fn]
fn modulo(a: i64, b: i64) -> EvalResult<Value> {
    if b == 0 {
        return Err(EvalError::DivisionByZero);
    }
    Ok(Value::Integer(a.wrapping_rem(b)))
}

#[evaluation_fn]
fn concat(a: String, b: String) -> EvalResult<Value> {
    Ok(Value::String(a + &b))
}

#[evaluation_fn]
fn equal(a: Value, b: Value) -> EvalResult<Value> {
    Ok(Value::Bool(loose_equals(&a, &b)))
}

#[evaluation_fn]
fn not_equal(a: Value, b: Value) -> EvalResult<Value> {
    Ok(Value::Bool(!loose_equals(&a, &b)))
}

#[evaluation_fn]
fn equal_strict(a: Value, b: Value) -> EvalResult<Value> {
    Ok(Value::Bool(a == b))
}

#[evaluation_fn]
fn not_equal_strict(a: Value, b: Value) -> EvalResult<Value> {
    Ok(Value::Bool(a != b))
}

#[evaluation_fn]
fn and(a: bool, b: bool) -> EvalResult<Value> {
    Ok(Value::Bool(a && b))
}

#[evaluation_fn]
fn or(a: bool, b: bool) -> EvalResult<Value> {
    Ok(Value::Bool(a || b))
}

#[evaluation_fn]
fn not(a: bool) -> EvalResult<Value> {
    Ok(Value::Bool(!a))
}

/// Numbers (numeric strings included) compare by value, a bool on either
/// side compares truthiness, anything else compares structurally.
pub fn loose_equals(a: &Value, b: &Value) -> bool {
    if let (Some(x), Some(y)) = (a.to_number(), b.to_number()) {
        return match (x, y) {
            (Number::Int(x), Number::Int(y)) => x == y,
            (x, y) => x.as_f64() == y.as_f64(),
        };
    }
    match (a, b) {
        (Value::Bool(x), other) | (other, Value::Bool(x)) => *x == other.is_truthy(),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| loose_equals(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(key, value)| y.get(key).is_some_and(|other| loose_equals(value, other)))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::Registration;

    fn call(name: &str, args: &[Value]) -> EvalResult<Value> {
        FunctionRegistry::with_defaults().resolve(name, args)
    }

    #[test]
    fn test_integer_arithmetic_stays_integer() {
        assert_eq!(
            call("__add", &[Value::Integer(1), Value::Integer(2)]).unwrap(),
            Value::Integer(3)
        );
        assert_eq!(
            call("__sub", &[Value::Integer(1), Value::Integer(2)]).unwrap(),
            Value::Integer(-1)
        );
        assert_eq!(
            call("__mul", &[Value::Integer(4), Value::Integer(2)]).unwrap(),
            Value::Integer(8)
        );
    }

    #[test]
    fn test_mixed_arithmetic_is_float() {
        assert_eq!(
            call("__add", &[Value::Integer(1), Value::Float(0.5)]).unwrap(),
            Value::Float(1.5)
        );
    }

    #[test]
    fn test_numeric_strings_coerce() {
        assert_eq!(
            call("__add", &[Value::from("1"), Value::Integer(2)]).unwrap(),
            Value::Integer(3)
        );
    }

    #[test]
    fn test_overflow_promotes_to_float() {
        assert_eq!(
            call("__add", &[Value::Integer(i64::MAX), Value::Integer(1)]).unwrap(),
            Value::Float(i64::MAX as f64 + 1.0)
        );
    }

    #[test]
    fn test_division() {
        assert_eq!(
            call("__div", &[Value::Integer(4), Value::Integer(2)]).unwrap(),
            Value::Integer(2)
        );
        assert_eq!(
            call("__div", &[Value::Integer(1), Value::Integer(2)]).unwrap(),
            Value::Float(0.5)
        );
        assert!(matches!(
            call("__div", &[Value::Integer(1), Value::Integer(0)]),
            Err(EvalError::DivisionByZero)
        ));
    }

    #[test]
    fn test_modulo() {
        assert_eq!(
            call("__mod", &[Value::Integer(7), Value::Integer(3)]).unwrap(),
            Value::Integer(1)
        );
        assert_eq!(
            call("__mod", &[Value::Float(7.9), Value::Integer(3)]).unwrap(),
            Value::Integer(1)
        );
        assert!(matches!(
            call("__mod", &[Value::Integer(7), Value::Integer(0)]),
            Err(EvalError::DivisionByZero)
        ));
    }

    #[test]
    fn test_non_numeric_operands_are_rejected() {
        assert!(matches!(
            call("__add", &[Value::Integer(1), Value::Bool(true)]),
            Err(EvalError::Argument { .. })
        ));
    }

    #[test]
    fn test_concat() {
        assert_eq!(
            call("__concat", &[Value::from("a"), Value::Integer(1)]).unwrap(),
            Value::from("a1")
        );
        assert!(matches!(
            call("__concat", &[Value::from("a"), Value::Array(vec![])]),
            Err(EvalError::Argument { .. })
        ));
    }

    #[test]
    fn test_loose_and_strict_equality() {
        assert!(loose_equals(&Value::Integer(1), &Value::Float(1.0)));
        assert!(loose_equals(&Value::from("1"), &Value::Integer(1)));
        assert!(loose_equals(&Value::Bool(true), &Value::from("abc")));
        assert!(!loose_equals(&Value::from("a"), &Value::from("b")));

        assert_eq!(
            call("__equal_strict", &[Value::Integer(1), Value::Float(1.0)]).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            call("__not_equal_strict", &[Value::Integer(1), Value::Float(1.0)]).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_logic_uses_truthiness() {
        assert_eq!(
            call("__and", &[Value::Integer(1), Value::from("x")]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            call("__or", &[Value::Null, Value::from("0")]).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(call("__not", &[Value::Null]).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_default_signatures() {
        let registry = FunctionRegistry::with_defaults();
        let texts = |name: &str| match registry.get(name) {
            Some(Registration::Overloads(overloads)) => overloads
                .iter()
                .map(|o| o.signature.text().to_string())
                .collect::<Vec<_>>(),
            other => panic!("unexpected registration {other:?}"),
        };
        assert_eq!(texts("__add"), vec!["numeric,numeric"]);
        assert_eq!(
            texts("__concat"),
            vec!["string|numeric|bool|null,string|numeric|bool|null"]
        );
        assert_eq!(texts("__not"), vec!["mixed"]);
    }

    #[test]
    fn test_generated_adapter_checks_arity() {
        assert!(matches!(
            add(&[Value::Integer(1)]),
            Err(EvalError::Arity { expected: 2, found: 1, .. })
        ));
        assert!(matches!(
            add(&[Value::Integer(1), Value::from("x")]),
            Err(EvalError::ArgumentType { position: 2, .. })
        ));
    }
}
