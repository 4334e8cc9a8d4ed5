use evaluation_rs::ast::Parser;
use evaluation_rs::{evaluate, EvalResult, Evaluator, Value};

fn main() {
    pretty_env_logger::init();

    let evaluator = Evaluator::default();

    let expression = "(20 + 10) * 10 == 300 && !closed()";
    let ast = Parser::parse_expression(expression).expect("Failed to parse");
    println!("AST for {:?}: {} nodes", expression, ast.node_count());

    // Any closure can resolve calls, not only a registry.
    let trace_calls = |name: &str, args: &[Value]| -> EvalResult<Value> {
        println!("call {}({:?})", name, args);
        match name {
            "closed" => Ok(Value::Bool(false)),
            _ => evaluator.registry().resolve(name, args),
        }
    };

    match evaluate(&ast, &trace_calls) {
        Ok(result) => println!("Result: {}", result),
        Err(err) => println!("Error: {}", err),
    }
}
