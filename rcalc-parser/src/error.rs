// RCalc Parser Error Handling
// Parse failures reported as miette diagnostics over the input line

use crate::ast::Span;
use crate::parser::Rule;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Syntax error: {message}")]
    #[diagnostic(
        code(rcalc::parse::syntax),
        help("Values are numbers, [vectors], {{[matrix], [rows]}} or _units; operators are names or + - * / ^")
    )]
    Syntax {
        #[source_code]
        src: String,
        #[label("expected {expected}")]
        span: SourceSpan,
        expected: String,
        message: String,
    },

    #[error("Invalid number '{found}'")]
    #[diagnostic(code(rcalc::parse::invalid_number))]
    InvalidNumber {
        #[source_code]
        src: String,
        #[label("not a valid number")]
        span: SourceSpan,
        found: String,
    },

    #[error("Vectors have 2 to 4 components, found {size}")]
    #[diagnostic(code(rcalc::parse::invalid_vector))]
    InvalidVector {
        #[source_code]
        src: String,
        #[label("{size} components")]
        span: SourceSpan,
        size: usize,
    },

    #[error("Matrices are square with 2 to 4 rows, found {rows} rows of {columns}")]
    #[diagnostic(
        code(rcalc::parse::invalid_matrix),
        help("Write a matrix as rows of equal length, e.g. {{[1, 2], [3, 4]}}")
    )]
    InvalidMatrix {
        #[source_code]
        src: String,
        #[label("not a square matrix")]
        span: SourceSpan,
        rows: usize,
        columns: usize,
    },
}

impl ParseError {
    /// Create a parse error from a Pest parsing error
    pub fn from_pest_error(error: pest::error::Error<Rule>, src: &str) -> Self {
        let span = match error.location {
            pest::error::InputLocation::Pos(pos) => SourceSpan::new(pos.into(), 0),
            pest::error::InputLocation::Span((start, end)) => {
                SourceSpan::new(start.into(), end - start)
            }
        };

        let expected = match &error.variant {
            pest::error::ErrorVariant::ParsingError { positives, .. } if !positives.is_empty() => {
                positives
                    .iter()
                    .map(describe_rule)
                    .collect::<Vec<_>>()
                    .join(" or ")
            }
            _ => "a value or an operator".to_string(),
        };

        ParseError::Syntax {
            src: src.to_string(),
            span,
            expected,
            message: error.variant.message().into_owned(),
        }
    }

    pub fn invalid_number(src: &str, span: Span, found: &str) -> Self {
        ParseError::InvalidNumber {
            src: src.to_string(),
            span: span.into(),
            found: found.to_string(),
        }
    }

    pub fn invalid_vector(src: &str, span: Span, size: usize) -> Self {
        ParseError::InvalidVector {
            src: src.to_string(),
            span: span.into(),
            size,
        }
    }

    pub fn invalid_matrix(src: &str, span: Span, rows: usize, columns: usize) -> Self {
        ParseError::InvalidMatrix {
            src: src.to_string(),
            span: span.into(),
            rows,
            columns,
        }
    }

    pub fn span(&self) -> SourceSpan {
        match self {
            ParseError::Syntax { span, .. }
            | ParseError::InvalidNumber { span, .. }
            | ParseError::InvalidVector { span, .. }
            | ParseError::InvalidMatrix { span, .. } => *span,
        }
    }
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

fn describe_rule(rule: &Rule) -> String {
    match rule {
        Rule::integer => "an integer".to_string(),
        Rule::real => "a real number".to_string(),
        Rule::vector => "a vector".to_string(),
        Rule::matrix => "a matrix".to_string(),
        Rule::unit => "a unit".to_string(),
        Rule::literal | Rule::literal_input => "a value".to_string(),
        Rule::identifier | Rule::symbol | Rule::operator => "an operator".to_string(),
        Rule::EOI => "end of input".to_string(),
        other => format!("{:?}", other),
    }
}
