use crate::error::{EvalError, EvalResult};
use crate::value::Value;
use std::fmt;
use std::str::FromStr;

/// Primitive type names usable in a signature.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Integer, float, or a string holding a number.
    Numeric,
    Integer,
    Float,
    String,
    Bool,
    Array,
    /// Object maps and opaque host values.
    Object,
    Null,
    /// Anything.
    Mixed,
}

impl PrimitiveType {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            PrimitiveType::Numeric => value.is_numeric(),
            PrimitiveType::Integer => matches!(value, Value::Integer(_)),
            PrimitiveType::Float => matches!(value, Value::Float(_)),
            PrimitiveType::String => matches!(value, Value::String(_)),
            PrimitiveType::Bool => matches!(value, Value::Bool(_)),
            PrimitiveType::Array => matches!(value, Value::Array(_)),
            PrimitiveType::Object => matches!(value, Value::Object(_) | Value::Opaque(_)),
            PrimitiveType::Null => matches!(value, Value::Null),
            PrimitiveType::Mixed => true,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveType::Numeric => "numeric",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Float => "float",
            PrimitiveType::String => "string",
            PrimitiveType::Bool => "bool",
            PrimitiveType::Array => "array",
            PrimitiveType::Object => "object",
            PrimitiveType::Null => "null",
            PrimitiveType::Mixed => "mixed",
        }
    }
}

impl FromStr for PrimitiveType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "numeric" => Ok(PrimitiveType::Numeric),
            "integer" => Ok(PrimitiveType::Integer),
            "float" => Ok(PrimitiveType::Float),
            "string" => Ok(PrimitiveType::String),
            "bool" => Ok(PrimitiveType::Bool),
            "array" => Ok(PrimitiveType::Array),
            "object" => Ok(PrimitiveType::Object),
            "null" => Ok(PrimitiveType::Null),
            "mixed" => Ok(PrimitiveType::Mixed),
            other => Err(format!("unknown type '{}'", other)),
        }
    }
}

/// Union of primitive types accepted at one parameter position, e.g. `string|null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypePattern(Vec<PrimitiveType>);

impl TypePattern {
    pub fn accepts(&self, value: &Value) -> bool {
        self.0.iter().any(|ty| ty.accepts(value))
    }

    pub fn types(&self) -> &[PrimitiveType] {
        &self.0
    }
}

impl From<Vec<PrimitiveType>> for TypePattern {
    fn from(types: Vec<PrimitiveType>) -> Self {
        TypePattern(types)
    }
}

impl FromStr for TypePattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split('|')
            .map(PrimitiveType::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(TypePattern)
    }
}

impl fmt::Display for TypePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.0.iter().map(PrimitiveType::name).collect();
        write!(f, "{}", names.join("|"))
    }
}

/// Ordered parameter patterns of one overload, e.g. `numeric,string|null`.
///
/// The declared text is kept as written; it identifies the overload inside
/// its set and is what diagnostics report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    text: String,
    params: Vec<TypePattern>,
}

impl Signature {
    pub fn parse(text: &str) -> EvalResult<Self> {
        let params = if text.trim().is_empty() {
            Vec::new()
        } else {
            text.split(',')
                .map(TypePattern::from_str)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|message| EvalError::Signature {
                    signature: text.to_string(),
                    message,
                })?
        };

        Ok(Self {
            text: text.to_string(),
            params,
        })
    }

    /// Builds a signature from already typed patterns. The text is the
    /// canonical `a|b,c` rendering.
    pub fn from_patterns(params: Vec<TypePattern>) -> Self {
        let text = params
            .iter()
            .map(TypePattern::to_string)
            .collect::<Vec<_>>()
            .join(",");
        Self { text, params }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &[TypePattern] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Same parameter count, and every argument accepted by its pattern.
    pub fn matches(&self, args: &[Value]) -> bool {
        self.params.len() == args.len()
            && self
                .params
                .iter()
                .zip(args)
                .all(|(pattern, arg)| pattern.accepts(arg))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
