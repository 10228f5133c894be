// RCalc Parser
// Turns pest pairs into literals and RPN tokens

use crate::ast::*;
use crate::error::*;
use num_bigint::BigInt;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct RcalcParser;

impl RcalcParser {
    /// Parse a single value literal, the whole input must be consumed
    pub fn parse_literal(input: &str) -> ParseResult<Literal> {
        let mut pairs = Self::parse(Rule::literal_input, input)
            .map_err(|error| ParseError::from_pest_error(error, input))?;

        let literal_input = Self::expect_next(&mut pairs, input)?;
        let literal = Self::expect_next(&mut literal_input.into_inner(), input)?;
        Self::parse_literal_pair(literal, input)
    }

    /// Parse a line of whitespace separated values and operators
    pub fn parse_line(input: &str) -> ParseResult<Line> {
        let mut pairs = Self::parse(Rule::line, input)
            .map_err(|error| ParseError::from_pest_error(error, input))?;

        let line = Self::expect_next(&mut pairs, input)?;
        let mut tokens = Vec::new();

        for pair in line.into_inner() {
            match pair.as_rule() {
                Rule::literal => tokens.push(Token::Literal(Self::parse_literal_pair(pair, input)?)),
                Rule::operator => tokens.push(Token::Operator(Self::parse_operator(pair, input)?)),
                Rule::EOI => {}
                _ => unreachable!("Invalid line rule"),
            }
        }

        Ok(Line { tokens })
    }

    fn parse_literal_pair(pair: Pair<Rule>, input: &str) -> ParseResult<Literal> {
        let span = Self::extract_span(&pair);
        let inner = Self::expect_next(&mut pair.into_inner(), input)?;

        let value = match inner.as_rule() {
            Rule::integer => Self::parse_integer(&inner, input)?,
            Rule::real => LiteralValue::Real(Self::parse_real(&inner, input)?),
            Rule::vector => LiteralValue::Vector(Self::parse_vector(inner, input)?),
            Rule::matrix => LiteralValue::Matrix(Self::parse_matrix(inner, input)?),
            Rule::unit => LiteralValue::Unit(inner.as_str()[1..].to_string()),
            _ => unreachable!("Invalid literal rule"),
        };

        Ok(Literal { value, span })
    }

    /// Integers that do not fit an i64 become BigInt
    fn parse_integer(pair: &Pair<Rule>, input: &str) -> ParseResult<LiteralValue> {
        let text = pair.as_str();
        if let Ok(value) = text.parse::<i64>() {
            return Ok(LiteralValue::Int(value));
        }

        text.parse::<BigInt>()
            .map(LiteralValue::BigInt)
            .map_err(|_| ParseError::invalid_number(input, Self::extract_span(pair), text))
    }

    fn parse_real(pair: &Pair<Rule>, input: &str) -> ParseResult<f64> {
        let text = pair.as_str();
        text.parse::<f64>()
            .map_err(|_| ParseError::invalid_number(input, Self::extract_span(pair), text))
    }

    /// Vector components, integers read as reals
    fn parse_components(pair: Pair<Rule>, input: &str) -> ParseResult<Vec<f64>> {
        pair.into_inner()
            .map(|component| Self::parse_real(&component, input))
            .collect()
    }

    fn parse_vector(pair: Pair<Rule>, input: &str) -> ParseResult<Vec<f64>> {
        let span = Self::extract_span(&pair);
        let components = Self::parse_components(pair, input)?;

        if !(2..=4).contains(&components.len()) {
            return Err(ParseError::invalid_vector(input, span, components.len()));
        }
        Ok(components)
    }

    fn parse_matrix(pair: Pair<Rule>, input: &str) -> ParseResult<Vec<Vec<f64>>> {
        let span = Self::extract_span(&pair);
        let rows = pair
            .into_inner()
            .map(|row| Self::parse_components(row, input))
            .collect::<ParseResult<Vec<_>>>()?;

        let size = rows.len();
        if let Some(row) = rows.iter().find(|row| row.len() != size) {
            return Err(ParseError::invalid_matrix(input, span, size, row.len()));
        }
        if !(2..=4).contains(&size) {
            return Err(ParseError::invalid_matrix(input, span, size, size));
        }
        Ok(rows)
    }

    fn parse_operator(pair: Pair<Rule>, input: &str) -> ParseResult<OperatorToken> {
        let span = Self::extract_span(&pair);
        let inner = Self::expect_next(&mut pair.into_inner(), input)?;
        let text = inner.as_str().to_string();

        let name = match inner.as_rule() {
            Rule::identifier => text.clone(),
            Rule::symbol => match symbol_alias(&text) {
                Some(name) => name.to_string(),
                None => unreachable!("Invalid symbol rule"),
            },
            _ => unreachable!("Invalid operator rule"),
        };

        Ok(OperatorToken { name, text, span })
    }

    fn extract_span(pair: &Pair<Rule>) -> Span {
        let span = pair.as_span();
        Span::new(span.start(), span.end())
    }

    fn expect_next<'i>(
        pairs: &mut pest::iterators::Pairs<'i, Rule>,
        input: &str,
    ) -> ParseResult<Pair<'i, Rule>> {
        pairs.next().ok_or_else(|| ParseError::Syntax {
            src: input.to_string(),
            span: Span::new(input.len(), input.len()).into(),
            expected: "a value".to_string(),
            message: "unexpected end of input".to_string(),
        })
    }
}
