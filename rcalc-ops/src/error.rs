//! Error types for operator declaration and table construction
//!
//! Every error raised here is fatal to the build of the operator table. Each
//! variant carries the operator name and, where the declaration source knows
//! it, the location of the offending declaration.

use crate::declaration::SourceLocation;
use crate::types::TypeSignature;
use miette::Diagnostic;
use thiserror::Error;

/// Stable identifiers for every failure the declaration layer can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownType,
    UnknownTag,
    ArityMismatch,
    DuplicateSignature,
    ReverseArity,
    MultipleZeroArity,
    ExampleArity,
    BodySignature,
    StackRefMismatch,
    MissingDescription,
    MissingFormatter,
    DuplicateFormatter,
    UnknownOperator,
    NameCollision,
    NotFinalized,
    Sealed,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::UnknownType => "ERR_UNKNOWN_TYPE",
            ErrorKind::UnknownTag => "ERR_UNKNOWN_TAG",
            ErrorKind::ArityMismatch => "ERR_ARITY_MISMATCH",
            ErrorKind::DuplicateSignature => "ERR_DUPLICATE_SIGNATURE",
            ErrorKind::ReverseArity => "ERR_REVERSE_ARITY",
            ErrorKind::MultipleZeroArity => "ERR_MULTIPLE_ZERO_ARITY",
            ErrorKind::ExampleArity => "ERR_EXAMPLE_ARITY",
            ErrorKind::BodySignature => "ERR_BODY_SIGNATURE",
            ErrorKind::StackRefMismatch => "ERR_STACK_REF_MISMATCH",
            ErrorKind::MissingDescription => "ERR_MISSING_DESCRIPTION",
            ErrorKind::MissingFormatter => "ERR_MISSING_FORMATTER",
            ErrorKind::DuplicateFormatter => "ERR_DUPLICATE_FORMATTER",
            ErrorKind::UnknownOperator => "ERR_UNKNOWN_OPERATOR",
            ErrorKind::NameCollision => "ERR_NAME_COLLISION",
            ErrorKind::NotFinalized => "ERR_NOT_FINALIZED",
            ErrorKind::Sealed => "ERR_SEALED",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Build-time declaration errors
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum DeclarationError {
    #[error("Unknown type '{name}'{}", at(.location))]
    #[diagnostic(
        code(rcalc::ops::unknown_type),
        help("Valid types are Int, BigInt, Real, Vec2, Vec3, Vec4, Mat2, Mat3, Mat4 and Unit")
    )]
    UnknownType {
        name: String,
        location: Option<SourceLocation>,
    },

    #[error("Tag `{name}` is unknown{}", at(.location))]
    #[diagnostic(
        code(rcalc::ops::unknown_tag),
        help("Valid tags are reversable, bigint_cast, real_cast, no_expr and stack_ref")
    )]
    UnknownTag {
        name: String,
        location: Option<SourceLocation>,
    },

    #[error(
        "Cannot define {operator} with {found} args, previously defined with {expected}{}",
        at(.location)
    )]
    #[diagnostic(
        code(rcalc::ops::arity_mismatch),
        help("Every implementation of an operator must take the same number of arguments")
    )]
    ArityMismatch {
        operator: String,
        expected: usize,
        found: usize,
        location: Option<SourceLocation>,
    },

    #[error("Cannot redefine {operator} call with types '{signature}'{}", at(.location))]
    #[diagnostic(
        code(rcalc::ops::duplicate_signature),
        help("Each argument-type tuple may be implemented by exactly one declaration")
    )]
    DuplicateSignature {
        operator: String,
        signature: TypeSignature,
        location: Option<SourceLocation>,
        previous: Option<SourceLocation>,
    },

    #[error(
        "Operator {operator} is invalid: 'reversable' tag is only allowed for operators with two parameters, found {arity}{}",
        at(.location)
    )]
    #[diagnostic(code(rcalc::ops::reverse_arity))]
    ReverseArity {
        operator: String,
        arity: usize,
        location: Option<SourceLocation>,
    },

    #[error("Operator {operator} takes no parameters and may only be declared once{}", at(.location))]
    #[diagnostic(code(rcalc::ops::multiple_zero_arity))]
    MultipleZeroArity {
        operator: String,
        location: Option<SourceLocation>,
    },

    #[error(
        "Operator {operator} has an example with {found} arguments, expected {expected}{}",
        at(.location)
    )]
    #[diagnostic(
        code(rcalc::ops::example_arity),
        help("Give one literal per parameter. Examples of stack_ref operators may list extra stack items first")
    )]
    ExampleArity {
        operator: String,
        expected: usize,
        found: usize,
        location: Option<SourceLocation>,
    },

    #[error(
        "Operator {operator} is declared for '{declared}' but its body takes '{body}'{}",
        at(.location)
    )]
    #[diagnostic(
        code(rcalc::ops::body_signature),
        help("Declare the implementation with the parameter types of its body")
    )]
    BodySignature {
        operator: String,
        declared: TypeSignature,
        body: TypeSignature,
        location: Option<SourceLocation>,
    },

    #[error(
        "Operator {operator} {} the 'stack_ref' tag{}",
        stack_ref_problem(.stack_aware),
        at(.location)
    )]
    #[diagnostic(
        code(rcalc::ops::stack_ref_mismatch),
        help("Tag a declaration 'stack_ref' exactly when its body receives the stack")
    )]
    StackRefMismatch {
        operator: String,
        stack_aware: bool,
        location: Option<SourceLocation>,
    },

    #[error("Operator {operator} is missing a description")]
    #[diagnostic(
        code(rcalc::ops::missing_description),
        help("Add a description to at least one declaration of {operator}")
    )]
    MissingDescription { operator: String },

    #[error("Operator {operator} is missing a format function")]
    #[diagnostic(
        code(rcalc::ops::missing_formatter),
        help("Declare exactly one formatter for {operator}")
    )]
    MissingFormatter { operator: String },

    #[error("Cannot redeclare format for operator {operator}{}", at(.location))]
    #[diagnostic(code(rcalc::ops::duplicate_formatter))]
    DuplicateFormatter {
        operator: String,
        location: Option<SourceLocation>,
    },

    #[error("Operator {operator} is unknown{}", at(.location))]
    #[diagnostic(
        code(rcalc::ops::unknown_operator),
        help("Formatters can only be declared for operators that have at least one implementation")
    )]
    UnknownOperator {
        operator: String,
        location: Option<SourceLocation>,
    },

    #[error("Operators {first} and {second} share the lookup name '{canonical}'")]
    #[diagnostic(
        code(rcalc::ops::name_collision),
        help("Operator names are matched case-insensitively with punctuation removed")
    )]
    NameCollision {
        first: String,
        second: String,
        canonical: String,
    },

    #[error("Operator {operator} has not been finalized")]
    #[diagnostic(code(rcalc::ops::not_finalized))]
    NotFinalized { operator: String },

    #[error("Operator {operator} is already finalized and cannot accept new declarations")]
    #[diagnostic(code(rcalc::ops::sealed))]
    Sealed { operator: String },
}

impl DeclarationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeclarationError::UnknownType { .. } => ErrorKind::UnknownType,
            DeclarationError::UnknownTag { .. } => ErrorKind::UnknownTag,
            DeclarationError::ArityMismatch { .. } => ErrorKind::ArityMismatch,
            DeclarationError::DuplicateSignature { .. } => ErrorKind::DuplicateSignature,
            DeclarationError::ReverseArity { .. } => ErrorKind::ReverseArity,
            DeclarationError::MultipleZeroArity { .. } => ErrorKind::MultipleZeroArity,
            DeclarationError::ExampleArity { .. } => ErrorKind::ExampleArity,
            DeclarationError::BodySignature { .. } => ErrorKind::BodySignature,
            DeclarationError::StackRefMismatch { .. } => ErrorKind::StackRefMismatch,
            DeclarationError::MissingDescription { .. } => ErrorKind::MissingDescription,
            DeclarationError::MissingFormatter { .. } => ErrorKind::MissingFormatter,
            DeclarationError::DuplicateFormatter { .. } => ErrorKind::DuplicateFormatter,
            DeclarationError::UnknownOperator { .. } => ErrorKind::UnknownOperator,
            DeclarationError::NameCollision { .. } => ErrorKind::NameCollision,
            DeclarationError::NotFinalized { .. } => ErrorKind::NotFinalized,
            DeclarationError::Sealed { .. } => ErrorKind::Sealed,
        }
    }

    /// Attach a declaration site to errors raised before one was known.
    pub fn with_location(mut self, site: &SourceLocation) -> Self {
        match &mut self {
            DeclarationError::UnknownType { location, .. }
            | DeclarationError::UnknownTag { location, .. }
            | DeclarationError::ArityMismatch { location, .. }
            | DeclarationError::DuplicateSignature { location, .. }
            | DeclarationError::ReverseArity { location, .. }
            | DeclarationError::MultipleZeroArity { location, .. }
            | DeclarationError::ExampleArity { location, .. }
            | DeclarationError::BodySignature { location, .. }
            | DeclarationError::StackRefMismatch { location, .. }
            | DeclarationError::DuplicateFormatter { location, .. }
            | DeclarationError::UnknownOperator { location, .. } => {
                if location.is_none() {
                    *location = Some(site.clone());
                }
            }
            _ => {}
        }
        self
    }
}

fn at(location: &Option<SourceLocation>) -> String {
    match location {
        Some(location) => format!(" (at {location})"),
        None => String::new(),
    }
}

fn stack_ref_problem(stack_aware: &bool) -> &'static str {
    if *stack_aware {
        "has a stack-aware body but is missing"
    } else {
        "has a plain body but carries"
    }
}

pub type Result<T> = std::result::Result<T, DeclarationError>;
