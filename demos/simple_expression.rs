use evaluation_macros::evaluation_fn;
use evaluation_rs::{EvalError, EvalResult, Evaluator, FunctionRegistry, Value};
use log::debug;

#[evaluation_fn]
fn square(a: f64) -> EvalResult<Value> {
    Ok(Value::Float(a * a))
}

#[evaluation_fn]
fn repeat(text: String, times: i64) -> EvalResult<Value> {
    Ok(Value::String(text.repeat(times.max(0) as usize)))
}

#[evaluation_fn]
fn join(items: Vec<Value>, separator: String) -> EvalResult<Value> {
    let parts: Vec<_> = items
        .iter()
        .filter_map(Value::to_display_string)
        .collect();
    Ok(Value::String(parts.join(&separator)))
}

fn main() -> Result<(), EvalError> {
    pretty_env_logger::init();

    let mut registry = FunctionRegistry::new();
    registry.register_function("square", square);
    registry
        .register_overload("repeat", "string,integer", repeat)?
        .register_overload("repeat", "numeric,integer", |args| {
            repeat(&[Value::from(args[0].to_display_string().unwrap_or_default()), args[1].clone()])
        })?;
    registry.register_overload("join", "array,string", join)?;
    // Strings concatenate with `+`. The defaults merged below rank after it.
    registry.register_overload("__add", "string,string", |args| {
        let joined = args
            .iter()
            .filter_map(Value::as_str)
            .collect::<String>();
        Ok(Value::String(joined))
    })?;
    registry.merge(FunctionRegistry::with_defaults());
    debug!("registered: {:?}", registry.names().collect::<Vec<_>>());

    let evaluator = Evaluator::new(registry);
    for expression in [
        "square(3) + 1",
        "repeat('ab', 3)",
        "repeat(7, 2)",
        "join([1, 'two', 3.5], ', ')",
        "'foo' + 'bar'",
        "'1' + '2'",
        "{'ok': !(1 == 2), 'items': [1, 2 * 3]}",
        "repeat(true, 2)",
    ] {
        match evaluator.evaluate_expression(expression) {
            Ok(result) => println!("{} => {}", expression, result),
            Err(err) => println!("{} => error: {}", expression, err),
        }
    }

    Ok(())
}
