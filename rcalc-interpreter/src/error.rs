//! Runtime errors
//!
//! `RuntimeError` is what an operator evaluation can fail with. The
//! dispatcher itself only ever raises `InvalidParam` and `UnknownOperator`;
//! every other variant comes out of an operator body and is passed through
//! untouched.

use miette::Diagnostic;
use rcalc_ops::{DeclarationError, ValueType};
use rcalc_parser::ParseError;
use thiserror::Error;

/// Stable identifiers for runtime failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeErrorKind {
    InvalidParam,
    UnknownOperator,
    DivisionByZero,
    Overflow,
    Domain,
    TypeMismatch,
    ArgumentCount,
    Custom,
}

impl RuntimeErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            RuntimeErrorKind::InvalidParam => "ERR_INVALID_PARAM",
            RuntimeErrorKind::UnknownOperator => "ERR_UNKNOWN_OPERATOR",
            RuntimeErrorKind::DivisionByZero => "ERR_DIVISION_BY_ZERO",
            RuntimeErrorKind::Overflow => "ERR_OVERFLOW",
            RuntimeErrorKind::Domain => "ERR_DOMAIN",
            RuntimeErrorKind::TypeMismatch => "ERR_TYPE_MISMATCH",
            RuntimeErrorKind::ArgumentCount => "ERR_ARGUMENT_COUNT",
            RuntimeErrorKind::Custom => "ERR_CUSTOM",
        }
    }
}

#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("{message}")]
    #[diagnostic(
        code(rcalc::runtime::invalid_param),
        help("Use `rcalc table {operator}` to list the accepted argument types")
    )]
    InvalidParam { operator: String, message: String },

    #[error("Unknown operator '{name}'")]
    #[diagnostic(code(rcalc::runtime::unknown_operator))]
    UnknownOperator { name: String },

    #[error("Division by zero")]
    #[diagnostic(code(rcalc::runtime::division_by_zero))]
    DivisionByZero,

    #[error("Integer overflow")]
    #[diagnostic(
        code(rcalc::runtime::overflow),
        help("Wider integers are available as BigInt")
    )]
    Overflow,

    #[error("{message}")]
    #[diagnostic(code(rcalc::runtime::domain))]
    Domain { message: String },

    #[error("Type mismatch: expected {expected}, found {found}")]
    #[diagnostic(code(rcalc::runtime::type_mismatch))]
    TypeMismatch {
        expected: ValueType,
        found: ValueType,
    },

    #[error("Expected {expected} arguments, found {found}")]
    #[diagnostic(code(rcalc::runtime::argument_count))]
    ArgumentCount { expected: usize, found: usize },

    #[error("{message}")]
    #[diagnostic(code(rcalc::runtime::custom))]
    Custom { message: String },
}

impl RuntimeError {
    pub fn kind(&self) -> RuntimeErrorKind {
        match self {
            RuntimeError::InvalidParam { .. } => RuntimeErrorKind::InvalidParam,
            RuntimeError::UnknownOperator { .. } => RuntimeErrorKind::UnknownOperator,
            RuntimeError::DivisionByZero => RuntimeErrorKind::DivisionByZero,
            RuntimeError::Overflow => RuntimeErrorKind::Overflow,
            RuntimeError::Domain { .. } => RuntimeErrorKind::Domain,
            RuntimeError::TypeMismatch { .. } => RuntimeErrorKind::TypeMismatch,
            RuntimeError::ArgumentCount { .. } => RuntimeErrorKind::ArgumentCount,
            RuntimeError::Custom { .. } => RuntimeErrorKind::Custom,
        }
    }

    pub fn domain(message: impl Into<String>) -> Self {
        RuntimeError::Domain {
            message: message.into(),
        }
    }

    pub fn custom(message: impl Into<String>) -> Self {
        RuntimeError::Custom {
            message: message.into(),
        }
    }
}

/// Anything that can go wrong while evaluating calculator input
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Declaration(#[from] DeclarationError),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
