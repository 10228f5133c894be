//! The standard operator set, evaluated through a session

use super::*;
use crate::{RuntimeError, RuntimeErrorKind, standard_catalog};
use num_bigint::BigInt;
use pretty_assertions::assert_eq;

fn big(digits: &str) -> Value {
    Value::BigInt(digits.parse::<BigInt>().unwrap())
}

fn eval_error(input: &str) -> RuntimeError {
    match session().eval_line(input).unwrap_err() {
        crate::EvalError::Runtime(error) => error,
        other => panic!("expected a runtime error, got {other:?}"),
    }
}

#[test]
fn test_integer_arithmetic() {
    assert_eq!(eval("2 3 +"), Value::Int(5));
    assert_eq!(eval("5 3 -"), Value::Int(2));
    assert_eq!(eval("6 7 *"), Value::Int(42));
    assert_eq!(eval("7 3 Mod"), Value::Int(1));
    assert_eq!(eval("2 10 ^"), Value::Int(1024));
    assert_eq!(eval("5 Neg"), Value::Int(-5));
    assert_eq!(eval("-5 Abs"), Value::Int(5));
}

#[test]
fn test_mixed_arguments_widen_to_real() {
    assert_eq!(eval("1 2.5 +"), Value::Real(3.5));
    assert_eq!(eval("2.5 1 +"), Value::Real(3.5));
    assert_eq!(eval("1.5 4 *"), Value::Real(6.0));
    assert_eq!(eval("7.5 2 Mod"), Value::Real(1.5));
    assert_eq!(eval("4 0.5 ^"), Value::Real(2.0));
}

#[test]
fn test_division_always_produces_a_real() {
    assert_eq!(eval("7 2 /"), Value::Real(3.5));
    assert_eq!(eval("8 2 /"), Value::Real(4.0));
}

#[test]
fn test_bigint_arithmetic() {
    assert_eq!(
        eval("123456789012345678901234567890 1 +"),
        big("123456789012345678901234567891")
    );
    assert_eq!(
        eval("1 123456789012345678901234567890 -"),
        big("-123456789012345678901234567889")
    );
    assert_eq!(
        eval("123456789012345678901234567890 2 *"),
        big("246913578024691357802469135780")
    );
    assert_eq!(
        eval("100000000000000000000 2 ^"),
        big("10000000000000000000000000000000000000000")
    );
    assert_eq!(eval("100000000000000000000 0.5 +"), Value::Real(1e20 + 0.5));
}

#[test]
fn test_bigint_cast_matches_the_widened_call() {
    let session = session();
    let map = session.operators();

    let mut mixed = stack_of(&["5", "123456789012345678901234567890"]);
    let mut widened = RpnStack::new();
    widened.push_value(big("5"));
    widened.push_value(big("123456789012345678901234567890"));

    for operator in ["Add", "Sub", "Mul", "Mod", "Min", "Max"] {
        let mut left = mixed.clone();
        let mut right = widened.clone();
        let derived = map.evaluate(operator, &mut left).unwrap();
        let declared = map.evaluate(operator, &mut right).unwrap();

        assert_ne!(derived, declared, "{operator}");
        assert_eq!(
            left.top().unwrap().value,
            right.top().unwrap().value,
            "{operator}"
        );
    }

    map.evaluate("Add", &mut mixed).unwrap();
    assert_eq!(mixed.top().unwrap().value, big("123456789012345678901234567895"));
}

#[test]
fn test_integer_overflow_is_an_error() {
    let error = eval_error("9223372036854775807 1 +");
    assert_eq!(error, RuntimeError::Overflow);
    assert_eq!(error.kind().code(), "ERR_OVERFLOW");
}

#[test]
fn test_arithmetic_failures() {
    assert_eq!(eval_error("1 0 /"), RuntimeError::DivisionByZero);
    assert_eq!(eval_error("7 0 Mod"), RuntimeError::DivisionByZero);
    assert_eq!(eval_error("-4 Sqrt").kind(), RuntimeErrorKind::Domain);
    assert_eq!(eval_error("2 -1 ^").kind(), RuntimeErrorKind::Domain);
}

#[test]
fn test_min_max() {
    assert_eq!(eval("3 7 Min"), Value::Int(3));
    assert_eq!(eval("3 7 Max"), Value::Int(7));
    assert_eq!(eval("2.5 1 Min"), Value::Real(1.0));
    assert_eq!(eval("123456789012345678901234567890 7 Min"), big("7"));
}

#[test]
fn test_vector_operators() {
    assert_eq!(eval("[1, 2] [3, 4] +"), Value::Vec2([4.0, 6.0]));
    assert_eq!(eval("[1, 2, 3] [1, 1, 1] -"), Value::Vec3([0.0, 1.0, 2.0]));
    assert_eq!(eval("[1, 2] [3, 4] Dot"), Value::Real(11.0));
    assert_eq!(eval("[3, 4] Abs"), Value::Real(5.0));
    assert_eq!(eval("[1, -2] Neg"), Value::Vec2([-1.0, 2.0]));
    assert_eq!(
        eval("[1, 0, 0] [0, 1, 0] Cross"),
        Value::Vec3([0.0, 0.0, 1.0])
    );
    assert_eq!(eval("[2, 4] 2 /"), Value::Vec2([1.0, 2.0]));
}

#[test]
fn test_scaling_works_from_either_side() {
    assert_eq!(eval("[1, 2] 3 *"), Value::Vec2([3.0, 6.0]));
    assert_eq!(eval("3 [1, 2] *"), Value::Vec2([3.0, 6.0]));
    assert_eq!(eval("0.5 [2, 4, 6] *"), Value::Vec3([1.0, 2.0, 3.0]));
    assert_eq!(
        eval("[1, 2, 3, 4] 2 *"),
        Value::Vec4([2.0, 4.0, 6.0, 8.0])
    );
}

#[test]
fn test_matrix_operators() {
    assert_eq!(eval("{[1, 2], [3, 4]} Det"), Value::Real(-2.0));
    assert_eq!(
        eval("{[1, 2], [3, 4]} Transpose"),
        Value::Mat2([[1.0, 3.0], [2.0, 4.0]])
    );
    assert_eq!(
        eval("{[1, 2], [3, 4]} {[5, 6], [7, 8]} *"),
        Value::Mat2([[19.0, 22.0], [43.0, 50.0]])
    );
    assert_eq!(
        eval("{[0, -1], [1, 0]} [3, 4] *"),
        Value::Vec2([-4.0, 3.0])
    );
}

#[test]
fn test_mismatched_vector_sizes_are_rejected() {
    let error = eval_error("[1, 2] [1, 2, 3] +");
    assert_eq!(error.to_string(), "Add op does not recognize Vec2, Vec3");
}

#[test]
fn test_stack_operators() {
    let mut session = session();
    session.eval_line("5 6 Count").unwrap();
    assert_eq!(session.top().unwrap().value, Value::Int(2));

    let mut session = super::session();
    session.eval_line("5 6 2 Pick").unwrap();
    let values: Vec<&Value> = session.stack().items().iter().map(|i| &i.value).collect();
    assert_eq!(values, vec![&Value::Int(5), &Value::Int(6), &Value::Int(5)]);
    assert_eq!(session.top().unwrap().input, "5");
}

#[test]
fn test_pick_out_of_range_keeps_the_stack() {
    let mut session = session();
    session.eval_line("5 6").unwrap();
    let before = session.stack().clone();

    let error = session.eval_line("3 Pick").unwrap_err();

    assert_eq!(
        error.to_string(),
        "Cannot pick item 3 from a stack of 2"
    );
    assert_eq!(session.stack(), &before);
}

#[test]
fn test_constants() {
    assert_eq!(eval("Pi"), Value::Real(std::f64::consts::PI));
    assert_eq!(eval("Pi 2 *"), Value::Real(std::f64::consts::TAU));
}

#[test]
fn test_every_example_evaluates() {
    let session = session();
    let map = session.operators();

    let mut checked = 0;
    for registry in map.operators() {
        for mut stack in map.example_stacks(registry.name()).unwrap() {
            let depth = stack.len();
            map.evaluate(registry.name(), &mut stack)
                .unwrap_or_else(|error| panic!("{} example failed: {error}", registry.name()));
            assert_eq!(stack.len(), depth - registry.arity() + 1);
            checked += 1;
        }
    }
    assert!(checked > 30, "only {checked} examples ran");
}

#[test]
fn test_every_operator_is_described_and_categorised() {
    let mut catalog = standard_catalog().unwrap();
    catalog.finalize().unwrap();

    for registry in catalog.operators() {
        assert!(registry.description().is_some(), "{}", registry.name());
        assert!(registry.category().is_some(), "{}", registry.name());
        assert!(registry.formatter().is_some(), "{}", registry.name());
    }

    let names: Vec<Option<&str>> = catalog
        .categories()
        .iter()
        .map(|category| category.name.as_deref())
        .collect();
    assert_eq!(
        names,
        vec![
            None,
            Some("Arithmetic"),
            Some("Constants"),
            Some("Matrix"),
            Some("Stack"),
            Some("Vector"),
        ]
    );
}

#[test]
fn test_declarations_point_at_their_own_lines() {
    let catalog = standard_catalog().unwrap();
    let mut formatter_lines = Vec::new();

    for registry in catalog.operators() {
        let mut lines: Vec<usize> = registry
            .declarations()
            .iter()
            .map(|declaration| {
                let location = declaration.location.as_ref().unwrap();
                assert!(location.file.ends_with("builtins.rs"), "{location}");
                location.line
            })
            .collect();
        let declared = lines.len();
        lines.sort_unstable();
        lines.dedup();
        assert_eq!(lines.len(), declared, "{} shares a declaration line", registry.name());

        let formatter = registry.formatter().unwrap();
        formatter_lines.push(formatter.location.as_ref().unwrap().line);
    }

    let operators = formatter_lines.len();
    formatter_lines.sort_unstable();
    formatter_lines.dedup();
    assert_eq!(formatter_lines.len(), operators);
}
