mod evaluator;
mod parser;

pub use evaluator::*;
pub use parser::{ExpressionParser as Parser, MAX_DEPTH};

/// Kind of a literal; the raw text is converted at evaluation time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Integer,
    Float,
    String,
    Boolean,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ASTNode {
    Literal {
        kind: LiteralKind,
        text: String,
    },
    Array(Vec<ASTNode>),
    /// Entries in source order. Keys are always string literals.
    Object(Vec<(ASTNode, ASTNode)>),
    /// Explicit call or a desugared operator.
    FunctionCall {
        name: String,
        args: Vec<ASTNode>,
    },
}

impl ASTNode {
    pub fn literal(kind: LiteralKind, text: impl Into<String>) -> Self {
        ASTNode::Literal {
            kind,
            text: text.into(),
        }
    }

    pub fn call(name: impl Into<String>, args: Vec<ASTNode>) -> Self {
        ASTNode::FunctionCall {
            name: name.into(),
            args,
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + match self {
            ASTNode::Literal { .. } => 0,
            ASTNode::Array(items) => items.iter().map(ASTNode::node_count).sum(),
            ASTNode::Object(entries) => entries
                .iter()
                .map(|(k, v)| k.node_count() + v.node_count())
                .sum(),
            ASTNode::FunctionCall { args, .. } => args.iter().map(ASTNode::node_count).sum(),
        }
    }
}

/// Operators of the expression language. Each one is evaluated by calling
/// the function registered under its reserved identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Or,
    And,
    StrictEqual,
    StrictNotEqual,
    Equal,
    NotEqual,
    Add,
    Subtract,
    Concat,
    Multiply,
    Divide,
    Modulo,
    Not,
}

impl Operator {
    pub fn function_name(&self) -> &'static str {
        match self {
            Operator::Or => "__or",
            Operator::And => "__and",
            Operator::StrictEqual => "__equal_strict",
            Operator::StrictNotEqual => "__not_equal_strict",
            Operator::Equal => "__equal",
            Operator::NotEqual => "__not_equal",
            Operator::Add => "__add",
            Operator::Subtract => "__sub",
            Operator::Concat => "__concat",
            Operator::Multiply => "__mul",
            Operator::Divide => "__div",
            Operator::Modulo => "__mod",
            Operator::Not => "__not",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Or => "||",
            Operator::And => "&&",
            Operator::StrictEqual => "===",
            Operator::StrictNotEqual => "!==",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Concat => ".",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Modulo => "%",
            Operator::Not => "!",
        }
    }
}

impl TryFrom<&str> for Operator {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "||" => Ok(Operator::Or),
            "&&" => Ok(Operator::And),
            "===" => Ok(Operator::StrictEqual),
            "!==" => Ok(Operator::StrictNotEqual),
            "==" => Ok(Operator::Equal),
            "!=" => Ok(Operator::NotEqual),
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Subtract),
            "." => Ok(Operator::Concat),
            "*" => Ok(Operator::Multiply),
            "/" => Ok(Operator::Divide),
            "%" => Ok(Operator::Modulo),
            "!" => Ok(Operator::Not),
            _ => Err(format!("Unknown operator: {}", value)),
        }
    }
}
