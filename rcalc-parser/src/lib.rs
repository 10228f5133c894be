// RCalc Parser Library
// Pest-based parser for calculator values and RPN input lines

pub mod ast;
pub mod error;
pub mod parser;

pub use ast::*;
pub use error::*;
pub use parser::*;

// Re-export parser rule for manual testing
pub use parser::Rule;

/// Parse a single value literal such as `42`, `[1, 2]` or `_m`
pub fn parse_literal(input: &str) -> Result<Literal, ParseError> {
    parser::RcalcParser::parse_literal(input)
}

/// Parse a whitespace separated line of values and operators
pub fn parse_line(input: &str) -> Result<Line, ParseError> {
    parser::RcalcParser::parse_line(input)
}

// Version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
