// Tests for parse diagnostics

use miette::Diagnostic;
use rcalc_parser::*;

fn diagnostic_code(error: &ParseError) -> String {
    error.code().map(|code| code.to_string()).unwrap_or_default()
}

#[test]
fn test_vector_size_is_checked() {
    let error = parse_literal("[1]").unwrap_err();
    assert!(matches!(error, ParseError::InvalidVector { size: 1, .. }));
    assert_eq!(diagnostic_code(&error), "rcalc::parse::invalid_vector");

    let error = parse_literal("[1, 2, 3, 4, 5]").unwrap_err();
    assert!(matches!(error, ParseError::InvalidVector { size: 5, .. }));
}

#[test]
fn test_matrix_must_be_square() {
    let error = parse_literal("{[1, 2, 3], [4, 5, 6]}").unwrap_err();
    assert!(matches!(
        error,
        ParseError::InvalidMatrix {
            rows: 2,
            columns: 3,
            ..
        }
    ));

    let error = parse_literal("{[1, 2]}").unwrap_err();
    assert!(matches!(error, ParseError::InvalidMatrix { rows: 1, .. }));
}

#[test]
fn test_syntax_errors_point_at_the_input() {
    let error = parse_line("1 2 $").unwrap_err();
    assert!(matches!(error, ParseError::Syntax { .. }));
    assert_eq!(diagnostic_code(&error), "rcalc::parse::syntax");
    assert_eq!(error.span().offset(), 4);
    assert!(error.source_code().is_some());
}

#[test]
fn test_literal_rejects_trailing_input() {
    assert!(parse_literal("1 2").is_err());
    assert!(parse_literal("Add").is_err());
    assert!(parse_literal("").is_err());
}

#[test]
fn test_invalid_line_reports_the_failing_vector() {
    let error = parse_line("[1, 2] [3] Add").unwrap_err();
    match error {
        ParseError::InvalidVector { span, size, .. } => {
            assert_eq!(size, 1);
            assert_eq!(span.offset(), 7);
            assert_eq!(span.len(), 3);
        }
        other => panic!("Expected invalid vector, got: {:?}", other),
    }
}
