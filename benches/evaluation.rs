use criterion::{black_box, criterion_group, criterion_main, Criterion};
use evalexpr::*;
use evaluation_rs::ast::Parser;
use evaluation_rs::{evaluate, Evaluator, FunctionRegistry, Value};

/// Benchmark simple arithmetic expressions
fn benchmark_simple_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("Simple arithmetic Expression Evaluation");

    let evaluator = Evaluator::default();
    let uncached = Evaluator::with_cache_size(FunctionRegistry::with_defaults(), 0);

    let expr = "2 + 3";
    let parsed = Parser::parse_expression(expr).unwrap();
    let precompiled_evalexpr = build_operator_tree::<DefaultNumericTypes>(expr).unwrap();

    group.bench_function("cached_arithmetic", |b| {
        b.iter(|| evaluator.evaluate_expression(black_box(expr)))
    });

    group.bench_function("uncached_arithmetic", |b| {
        b.iter(|| uncached.evaluate_expression(black_box(expr)))
    });

    group.bench_function("pre_parsed_arithmetic", |b| {
        b.iter(|| evaluator.evaluate_ast(black_box(&parsed)))
    });

    group.bench_function("native_rust_arithmetic", |b| {
        b.iter(|| black_box(2 + 3))
    });

    group.bench_function("evalexpr_arithmetic", |b| {
        b.iter(|| evalexpr::eval(black_box(expr)).unwrap())
    });

    group.bench_function("precompiled_evalexpr_arithmetic", |b| {
        b.iter(|| precompiled_evalexpr.eval().unwrap())
    });
}

/// Benchmark complex arithmetic expressions
fn benchmark_complex_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("Complex arithmetic Expression Evaluation");

    let evaluator = Evaluator::default();

    let expr = "(10 + 20) * 3 / (4 - 1) + 5";
    let parsed = Parser::parse_expression(expr).unwrap();
    let precompiled_evalexpr = build_operator_tree::<DefaultNumericTypes>(expr).unwrap();

    group.bench_function("cached_complex_arithmetic", |b| {
        b.iter(|| evaluator.evaluate_expression(black_box(expr)))
    });

    group.bench_function("pre_parsed_complex_arithmetic", |b| {
        b.iter(|| evaluator.evaluate_ast(black_box(&parsed)))
    });

    group.bench_function("native_rust_complex_arithmetic", |b| {
        b.iter(|| black_box((10 + 20) * 3 / (4 - 1) + 5))
    });

    group.bench_function("evalexpr_complex_arithmetic", |b| {
        b.iter(|| evalexpr::eval(black_box(expr)).unwrap())
    });

    group.bench_function("precompiled_evalexpr_complex_arithmetic", |b| {
        b.iter(|| precompiled_evalexpr.eval().unwrap())
    });
}

/// Benchmark logical expressions
fn benchmark_logic_expressions(c: &mut Criterion) {
    let mut group = c.benchmark_group("Logic Expression Evaluation");
    let evaluator = Evaluator::default();

    let expr = "true && false || true";
    let parsed = Parser::parse_expression(expr).unwrap();
    let precompiled_evalexpr = build_operator_tree::<DefaultNumericTypes>(expr).unwrap();

    group.bench_function("cached_logic_expression", |b| {
        b.iter(|| evaluator.evaluate_expression(black_box(expr)))
    });

    group.bench_function("pre_parsed_logic_expression", |b| {
        b.iter(|| evaluator.evaluate_ast(black_box(&parsed)))
    });

    group.bench_function("evalexpr_logic_expression", |b| {
        b.iter(|| evalexpr::eval(black_box(expr)).unwrap())
    });

    group.bench_function("precompiled_evalexpr_logic_expression", |b| {
        b.iter(|| precompiled_evalexpr.eval().unwrap())
    });
}

/// Benchmark overload resolution
fn benchmark_overload_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("Overload Resolution");

    let mut registry = FunctionRegistry::new();
    for signature in ["bool,bool", "string,string", "array,array", "numeric,numeric"] {
        registry
            .register_overload("pick", signature, |args| Ok(args[0].clone()))
            .unwrap();
    }
    let last_signature = Parser::parse_expression("pick(1, 2)").unwrap();
    let first_signature = Parser::parse_expression("pick(true, false)").unwrap();

    group.bench_function("first_signature", |b| {
        b.iter(|| evaluate(black_box(&first_signature), &registry))
    });

    group.bench_function("last_signature", |b| {
        b.iter(|| evaluate(black_box(&last_signature), &registry))
    });
}

/// Benchmark function calls
fn benchmark_function_calls(c: &mut Criterion) {
    let mut group = c.benchmark_group("Function Call Evaluation");
    let mut registry = FunctionRegistry::with_defaults();

    registry.register_function("square", |args| match args {
        [Value::Integer(x)] => Ok(Value::Integer(x * x)),
        _ => Err(evaluation_rs::EvalError::host("Invalid arguments")),
    });
    let evaluator = Evaluator::new(registry);

    let expr = "square(4)";
    let parsed = Parser::parse_expression(expr).unwrap();

    group.bench_function("cached_function_call", |b| {
        b.iter(|| evaluator.evaluate_expression(black_box(expr)))
    });

    group.bench_function("pre_parsed_function_call", |b| {
        b.iter(|| evaluator.evaluate_ast(black_box(&parsed)))
    });

    group.bench_function("native_rust_function_call", |b| {
        b.iter(|| black_box(4 * 4))
    });
}

/// Grouping benchmarks
criterion_group!(
    benches,
    benchmark_simple_arithmetic,
    benchmark_complex_arithmetic,
    benchmark_logic_expressions,
    benchmark_overload_resolution,
    benchmark_function_calls,
);
criterion_main!(benches);
