// Tests for value literals

use num_bigint::BigInt;
use pretty_assertions::assert_eq;
use rcalc_parser::*;

fn value_of(input: &str) -> LiteralValue {
    parse_literal(input).unwrap().value
}

#[test]
fn test_parse_integers() {
    assert_eq!(value_of("42"), LiteralValue::Int(42));
    assert_eq!(value_of("-7"), LiteralValue::Int(-7));
    assert_eq!(value_of("  0 "), LiteralValue::Int(0));
}

#[test]
fn test_integer_overflow_becomes_bigint() {
    let input = "123456789012345678901234567890";
    assert_eq!(
        value_of(input),
        LiteralValue::BigInt(input.parse::<BigInt>().unwrap())
    );
    assert_eq!(value_of("9223372036854775807"), LiteralValue::Int(i64::MAX));
    assert!(matches!(value_of("9223372036854775808"), LiteralValue::BigInt(_)));
}

#[test]
fn test_parse_reals() {
    assert_eq!(value_of("3.5"), LiteralValue::Real(3.5));
    assert_eq!(value_of("-0.25"), LiteralValue::Real(-0.25));
    assert_eq!(value_of("1e3"), LiteralValue::Real(1000.0));
    assert_eq!(value_of("2.5E-1"), LiteralValue::Real(0.25));
    assert_eq!(value_of(".5"), LiteralValue::Real(0.5));
}

#[test]
fn test_parse_vectors() {
    assert_eq!(value_of("[1, 2]"), LiteralValue::Vector(vec![1.0, 2.0]));
    assert_eq!(
        value_of("[1.5,-2, 3e1, 4]"),
        LiteralValue::Vector(vec![1.5, -2.0, 30.0, 4.0])
    );
}

#[test]
fn test_parse_matrices() {
    assert_eq!(
        value_of("{[1, 2], [3, 4]}"),
        LiteralValue::Matrix(vec![vec![1.0, 2.0], vec![3.0, 4.0]])
    );
    assert_eq!(
        value_of("{[1,0,0],[0,1,0],[0,0,1]}"),
        LiteralValue::Matrix(vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ])
    );
}

#[test]
fn test_parse_units() {
    assert_eq!(value_of("_m"), LiteralValue::Unit("m".to_string()));
    assert_eq!(value_of("_km_h"), LiteralValue::Unit("km_h".to_string()));
}

#[test]
fn test_literal_span_covers_the_value() {
    let literal = parse_literal("  [1, 2]").unwrap();
    assert_eq!(literal.span, Span::new(2, 8));
}

#[test]
fn test_literal_display() {
    assert_eq!(value_of("[1, 2.5]").to_string(), "[1, 2.5]");
    assert_eq!(value_of("{[1, 2], [3, 4]}").to_string(), "{[1, 2], [3, 4]}");
    assert_eq!(value_of("_s").to_string(), "_s");
}
