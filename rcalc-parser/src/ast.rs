// RCalc Parser AST
// Literal values and the tokens of an RPN input line

use num_bigint::BigInt;
use std::fmt;

/// Byte range of a token within its input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        miette::SourceSpan::new(span.start.into(), span.len())
    }
}

/// A parsed value literal
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Int(i64),
    /// Integer literal outside the `i64` range
    BigInt(BigInt),
    Real(f64),
    /// Two to four components
    Vector(Vec<f64>),
    /// Square, rows of equal length two to four
    Matrix(Vec<Vec<f64>>),
    /// Unit name without the leading underscore
    Unit(String),
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Int(value) => write!(f, "{value}"),
            LiteralValue::BigInt(value) => write!(f, "{value}"),
            LiteralValue::Real(value) => write!(f, "{value}"),
            LiteralValue::Vector(components) => write_row(f, components),
            LiteralValue::Matrix(rows) => {
                f.write_str("{")?;
                for (index, row) in rows.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write_row(f, row)?;
                }
                f.write_str("}")
            }
            LiteralValue::Unit(name) => write!(f, "_{name}"),
        }
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, components: &[f64]) -> fmt::Result {
    f.write_str("[")?;
    for (index, component) in components.iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{component}")?;
    }
    f.write_str("]")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: LiteralValue,
    pub span: Span,
}

/// An operator reference, by name or through a symbol alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorToken {
    /// Operator name with symbol aliases resolved (`+` becomes `Add`)
    pub name: String,
    /// The text as written
    pub text: String,
    pub span: Span,
}

impl OperatorToken {
    pub fn is_symbol(&self) -> bool {
        self.name != self.text
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Literal(Literal),
    Operator(OperatorToken),
}

impl Token {
    pub fn span(&self) -> Span {
        match self {
            Token::Literal(literal) => literal.span,
            Token::Operator(operator) => operator.span,
        }
    }
}

/// One line of calculator input, tokens in evaluation order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Line {
    pub tokens: Vec<Token>,
}

impl Line {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Operator names the symbol aliases stand for
pub fn symbol_alias(symbol: &str) -> Option<&'static str> {
    match symbol {
        "+" => Some("Add"),
        "-" => Some("Sub"),
        "*" => Some("Mul"),
        "/" => Some("Div"),
        "^" => Some("Pow"),
        _ => None,
    }
}
