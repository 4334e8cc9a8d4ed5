use thiserror::Error;

/// Errors raised while tokenizing, parsing, resolving or evaluating an expression.
///
/// Every error aborts the whole evaluation. Errors returned by host handlers
/// are passed through to the caller untouched.
#[derive(Error, Debug)]
pub enum EvalError {
    /// No lexical rule matched at `offset` (in bytes).
    #[error("unexpected input at offset {offset}: {fragment:?}")]
    Lexical { offset: usize, fragment: String },

    /// Grammar violation; `position` is the index of the offending token.
    #[error("syntax error at token {position}: {message}")]
    Syntax { position: usize, message: String },

    /// Call to an unregistered identifier with no fallback handler.
    #[error("function '{name}' is not defined")]
    UndefinedFunction { name: String },

    /// No declared signature of an overload set fits the arguments.
    #[error("function '{name}' arguments do not match ({})", .signatures.join(") or ("))]
    Argument {
        name: String,
        signatures: Vec<String>,
    },

    /// Malformed signature string given at registration time.
    #[error("invalid signature '{signature}': {message}")]
    Signature { signature: String, message: String },

    #[error("function '{function}' expects {expected} arguments, got {found}")]
    Arity {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("function '{function}' argument {position} must be {expected}")]
    ArgumentType {
        function: String,
        position: usize,
        expected: &'static str,
    },

    #[error("division by zero")]
    DivisionByZero,

    /// Error raised by host handler code.
    #[error("{0}")]
    Host(Box<dyn std::error::Error + Send + Sync>),
}

impl EvalError {
    pub fn host<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        EvalError::Host(error.into())
    }

    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        EvalError::Syntax {
            position,
            message: message.into(),
        }
    }
}

pub type EvalResult<T> = Result<T, EvalError>;
