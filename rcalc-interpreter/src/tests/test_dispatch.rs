use super::*;
use crate::{
    Catalog, Dispatcher, OpBody, OpFormatter, OperatorMap, RuntimeError, RuntimeErrorKind,
    StackItem,
};
use pretty_assertions::assert_eq;
use rcalc_ops::{Capture, ErrorKind, SourceLocation, Tag, ValueType};

/// `Add` over `(Int, Int)` and `(Real, Real)` only, without any casts
fn strict_add() -> OperatorMap {
    let mut catalog = Catalog::new();
    catalog
        .declare(
            OpBody::binary(|a: i64, b: i64| Ok(a + b))
                .declare("Add")
                .describe("Adds two values")
                .example(["1", "2"]),
        )
        .unwrap();
    catalog
        .declare(OpBody::binary(|a: f64, b: f64| Ok(a + b)).declare("Add"))
        .unwrap();
    catalog
        .declare_formatter(OpFormatter::infix("+").declare("Add", 2))
        .unwrap();
    OperatorMap::new(catalog, LookupStrategy::Ordered).unwrap()
}

fn failing_div() -> OperatorMap {
    let mut catalog = Catalog::new();
    catalog
        .declare(
            OpBody::binary(|a: f64, b: f64| {
                if b == 0.0 {
                    return Err(RuntimeError::DivisionByZero);
                }
                Ok(a / b)
            })
            .declare("Div")
            .tag(Tag::RealCast)
            .describe("Divides")
            .example(["1", "2"]),
        )
        .unwrap();
    catalog
        .declare_formatter(OpFormatter::infix("/").declare("Div", 2))
        .unwrap();
    OperatorMap::new(catalog, LookupStrategy::Ordered).unwrap()
}

#[test]
fn test_unrecognized_types_leave_the_stack_untouched() {
    let map = strict_add();
    let mut stack = stack_of(&["[1, 2]", "[3, 4]"]);
    let before = stack.clone();

    let error = map.evaluate("Add", &mut stack).unwrap_err();

    assert_eq!(error.kind(), RuntimeErrorKind::InvalidParam);
    assert_eq!(error.kind().code(), "ERR_INVALID_PARAM");
    assert_eq!(error.to_string(), "Add op does not recognize Vec2, Vec2");
    assert_eq!(stack, before);
}

#[test]
fn test_too_few_arguments_are_reported() {
    let map = strict_add();
    let mut stack = stack_of(&["1"]);
    let before = stack.clone();

    let error = map.evaluate("Add", &mut stack).unwrap_err();

    assert_eq!(error.to_string(), "Add op requires 2 parameters");
    assert_eq!(stack, before);

    let mut empty = RpnStack::new();
    let error = map.evaluate("Add", &mut empty).unwrap_err();
    assert_eq!(error.kind(), RuntimeErrorKind::InvalidParam);
}

#[test]
fn test_mixed_types_need_a_cast_tag() {
    let map = strict_add();
    let mut stack = stack_of(&["1", "2.5"]);

    let error = map.evaluate("Add", &mut stack).unwrap_err();
    assert_eq!(error.to_string(), "Add op does not recognize Int, Real");
}

#[test]
fn test_dispatch_returns_the_table_index() {
    let map = strict_add();
    let dispatcher = map.dispatcher("add").unwrap();
    assert_eq!(dispatcher.name(), "Add");

    let mut ints = stack_of(&["1", "2"]);
    assert_eq!(dispatcher.evaluate(&mut ints).unwrap(), 0);
    assert_eq!(ints.top().unwrap().value, Value::Int(3));

    let mut reals = stack_of(&["1.5", "2.5"]);
    assert_eq!(dispatcher.evaluate(&mut reals).unwrap(), 1);
    assert_eq!(reals.top().unwrap().value, Value::Real(4.0));
}

#[test]
fn test_failing_body_restores_its_arguments() {
    let map = failing_div();
    let mut stack = stack_of(&["7", "1", "0"]);
    let before = stack.clone();

    let error = map.evaluate("Div", &mut stack).unwrap_err();

    assert_eq!(error, RuntimeError::DivisionByZero);
    assert_eq!(stack, before);
    assert_eq!(stack.len(), 3);
}

#[test]
fn test_coerced_arguments_reach_the_body() {
    let map = failing_div();
    let mut stack = stack_of(&["7", "2"]);

    let index = map.evaluate("Div", &mut stack).unwrap();
    let registry = map.operator("Div").unwrap();
    let entry = registry.table().unwrap().get(index).unwrap();

    assert_eq!(entry.signature.types(), &[ValueType::Int, ValueType::Int]);
    assert_eq!(entry.permutation.provenance_label(), "[real cast]");
    assert_eq!(stack.len(), 1);
    assert_eq!(stack.top().unwrap().value, Value::Real(3.5));
}

#[test]
fn test_result_item_records_the_expression() {
    let map = strict_add();
    let mut stack = stack_of(&["1", "2"]);
    map.evaluate("Add", &mut stack).unwrap();

    assert_eq!(
        stack.top().unwrap(),
        &StackItem {
            input: "1 + 2".to_string(),
            output: "3".to_string(),
            value: Value::Int(3),
            input_is_expression: true,
        }
    );
}

#[test]
fn test_stack_aware_bodies_see_the_remaining_stack() {
    let mut catalog = Catalog::new();
    catalog
        .declare(
            OpBody::stack_unary(|stack, offset: i64| {
                Ok(i64::try_from(stack.len()).unwrap_or(i64::MAX) + offset)
            })
            .declare("Depth")
            .describe("Stack depth plus an offset")
            .example(["1"]),
        )
        .unwrap();
    catalog
        .declare_formatter(OpFormatter::call("depth").declare("Depth", 1))
        .unwrap();
    let map = OperatorMap::new(catalog, LookupStrategy::Ordered).unwrap();

    let registry = map.operator("Depth").unwrap();
    assert!(registry.formatter().is_some());
    assert!(registry.table().unwrap().get(0).unwrap().permutation.stack_ref);

    let mut stack = stack_of(&["5", "6", "10"]);
    map.evaluate("Depth", &mut stack).unwrap();
    assert_eq!(stack.top().unwrap().value, Value::Int(12));
    assert_eq!(stack.top().unwrap().input, "depth(10)");
}

#[test]
fn test_dispatcher_requires_a_finalized_registry() {
    let mut registry = crate::Registry::new("Add");
    registry
        .declare(
            OpBody::binary(|a: i64, b: i64| Ok(a + b))
                .declare("Add")
                .describe("Adds"),
        )
        .unwrap();
    assert!(Dispatcher::new(&registry).is_err());
}

#[test]
fn test_stack_ref_tag_on_a_plain_body_is_rejected() {
    let mut catalog = Catalog::new();
    let error = catalog
        .declare(
            OpBody::binary(|a: i64, b: i64| Ok(a + b))
                .declare("Add")
                .tag(Tag::StackRef)
                .describe("Adds"),
        )
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::StackRefMismatch);
    assert!(error.to_string().contains("plain body"));
}

#[test]
fn test_captured_types_must_match_the_body() {
    let mut capture = Capture::new("Add", OpBody::binary(|a: i64, b: i64| Ok(a + b)));
    capture.param_types = vec!["Real".to_string(), "Real".to_string()];
    capture.description = Some("Adds".to_string());
    capture.location = Some(SourceLocation::new("ops.rs", 4));

    let mut catalog = Catalog::new();
    let error = catalog.declare(capture.resolve().unwrap()).unwrap_err();

    assert_eq!(error.kind(), ErrorKind::BodySignature);
    assert_eq!(
        error.to_string(),
        "Operator Add is declared for 'Real, Real' but its body takes 'Int, Int' (at ops.rs:4)"
    );
}

#[test]
fn test_unknown_operator() {
    let map = strict_add();
    let mut stack = stack_of(&["1", "2"]);
    let error = map.evaluate("Frobnicate", &mut stack).unwrap_err();
    assert_eq!(
        error,
        RuntimeError::UnknownOperator {
            name: "Frobnicate".to_string()
        }
    );
    assert_eq!(error.kind().code(), "ERR_UNKNOWN_OPERATOR");
    assert_eq!(stack.len(), 2);
}
