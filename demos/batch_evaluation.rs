use evaluation_rs::{Evaluator, FunctionRegistry, Value};

fn main() {
    pretty_env_logger::init();

    let mut registry = FunctionRegistry::with_defaults();
    registry.register_function("max", |args| {
        let max = args
            .iter()
            .filter_map(Value::as_f64)
            .fold(f64::NEG_INFINITY, f64::max);
        Ok(Value::Float(max))
    });

    let expressions: Vec<String> = (0..8)
        .map(|i| format!("max({}, {} * 2) - {} % 3", i, i, i))
        .collect();

    let evaluator = Evaluator::new(registry);
    for (i, result) in evaluator.evaluate_batch(&expressions).iter().enumerate() {
        println!("Result {}: {:?}", i, result);
    }
}
