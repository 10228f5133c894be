use super::*;
use crate::{Capture, ErrorKind, SourceLocation, Tag, TypeSignature};
use pretty_assertions::assert_eq;

#[test]
fn test_add_with_real_cast_covers_mixed_arguments() {
    let registry = finalized(
        "Add",
        vec![
            call("Add", [Int, Int], "add_int"),
            call("Add", [Real, Real], "add_real").tag(Tag::RealCast),
        ],
    );

    assert_eq!(
        signatures(&registry),
        vec![
            vec![Int, Int],
            vec![Int, BigInt],
            vec![Int, Real],
            vec![BigInt, Int],
            vec![BigInt, BigInt],
            vec![BigInt, Real],
            vec![Real, Int],
            vec![Real, BigInt],
            vec![Real, Real],
        ]
    );

    let table = registry.table().unwrap();
    let int_int = table.lookup(&[Int, Int]).unwrap();
    assert_eq!(int_int.index, 0);
    assert_eq!(int_int.permutation.declaration, 0);
    assert!(int_int.permutation.is_identity());

    let int_real = table.lookup(&[Int, Real]).unwrap();
    assert_eq!(int_real.index, 2);
    assert_eq!(int_real.permutation.declaration, 1);
    assert_eq!(int_real.permutation.plan[0].coercion.to_string(), "Int>Real");
    assert!(int_real.permutation.plan[1].coercion.is_identity());

    assert!(table.lookup(&[Vec2, Int]).is_none());
}

#[test]
fn test_signatures_are_unique_and_sorted() {
    let registry = finalized(
        "Mul",
        vec![
            call("Mul", [Real, Real], "mul_real").tag(Tag::RealCast),
            call("Mul", [Vec2, Real], "scale").tags([Tag::Reversible, Tag::RealCast]),
            call("Mul", [BigInt, BigInt], "mul_bigint").tag(Tag::BigIntCast),
        ],
    );

    let all = signatures(&registry);
    let mut sorted = all.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(all, sorted);
}

#[test]
fn test_reversible_declaration_covers_swapped_arguments() {
    let registry = finalized(
        "Mul",
        vec![call("Mul", [Vec2, Real], "scale").tag(Tag::Reversible)],
    );

    let table = registry.table().unwrap();
    let forward = table.lookup(&[Vec2, Real]).unwrap();
    let swapped = table.lookup(&[Real, Vec2]).unwrap();
    assert_eq!(forward.permutation.declaration, swapped.permutation.declaration);
    assert!(swapped.permutation.is_reversed());
    assert_eq!(swapped.permutation.provenance_label(), "[reversed]");
}

#[test]
fn test_reversal_never_overwrites_a_declaration() {
    let registry = finalized(
        "Sub",
        vec![
            call("Sub", [Int, Real], "int_minus_real").tag(Tag::Reversible),
            call("Sub", [Real, Int], "real_minus_int"),
        ],
    );

    let table = registry.table().unwrap();
    assert_eq!(table.len(), 2);
    let entry = table.lookup(&[Real, Int]).unwrap();
    assert_eq!(entry.permutation.declaration, 1);
    assert!(entry.permutation.is_identity());
}

#[test]
fn test_first_declaration_wins_a_derived_signature() {
    let real_first = finalized(
        "Max",
        vec![
            call("Max", [Real, Real], "max_real").tag(Tag::RealCast),
            call("Max", [BigInt, BigInt], "max_bigint").tag(Tag::BigIntCast),
        ],
    );
    let entry = real_first.table().unwrap().lookup(&[Int, BigInt]).unwrap();
    assert_eq!(entry.permutation.declaration, 0);

    let bigint_first = finalized(
        "Max",
        vec![
            call("Max", [BigInt, BigInt], "max_bigint").tag(Tag::BigIntCast),
            call("Max", [Real, Real], "max_real").tag(Tag::RealCast),
        ],
    );
    let entry = bigint_first.table().unwrap().lookup(&[Int, BigInt]).unwrap();
    assert_eq!(entry.permutation.declaration, 0);
    assert_eq!(entry.permutation.plan[0].target, BigInt);

    // the declared BigInt pair is never taken over by the real cast
    let entry = real_first.table().unwrap().lookup(&[BigInt, BigInt]).unwrap();
    assert_eq!(entry.permutation.declaration, 1);
    assert!(entry.permutation.is_identity());
}

#[test]
fn test_no_expr_operator_has_single_silent_entry() {
    let registry = finalized(
        "Neg",
        vec![call("Neg", [Vec2], "neg_vec2").tag(Tag::NoExpr)],
    );

    let table = registry.table().unwrap();
    assert_eq!(table.len(), 1);
    let entry = table.lookup(&[Vec2]).unwrap();
    assert!(!entry.permutation.echo_expression);
}

#[test]
fn test_finalize_is_idempotent() {
    let mut registry = finalized(
        "Add",
        vec![
            call("Add", [Int, Int], "add_int"),
            call("Add", [Real, Real], "add_real").tag(Tag::RealCast),
            call("Add", [Vec2, Real], "shift").tags([Tag::Reversible, Tag::RealCast]),
        ],
    );

    let first = registry.table().unwrap().clone();
    let second = registry.finalize().unwrap().clone();
    assert_eq!(first, second);

    for entry in first.iter() {
        let found = second.lookup(entry.signature.types()).unwrap();
        assert_eq!(found.index, entry.index);
    }
}

#[test]
fn test_duplicate_signature_is_rejected() {
    let mut registry = TestRegistry::new("Sub");
    registry
        .declare(call("Sub", [Int, Int], "first").at(SourceLocation::new("ops.rs", 10)))
        .unwrap();

    let error = registry
        .declare(call("Sub", [Int, Int], "second").at(SourceLocation::new("ops.rs", 20)))
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::DuplicateSignature);
    assert_eq!(error.kind().code(), "ERR_DUPLICATE_SIGNATURE");
    assert_eq!(
        error.to_string(),
        "Cannot redefine Sub call with types 'Int, Int' (at ops.rs:20)"
    );
    match error {
        crate::DeclarationError::DuplicateSignature { previous, .. } => {
            assert_eq!(previous, Some(SourceLocation::new("ops.rs", 10)));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_arity_mismatch_is_rejected() {
    let mut registry = TestRegistry::new("Pow");
    registry.declare(call("Pow", [Real, Real], "pow")).unwrap();

    let error = registry.declare(call("Pow", [Real], "square")).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::ArityMismatch);
    assert_eq!(
        error.to_string(),
        "Cannot define Pow with 1 args, previously defined with 2"
    );

    let error = registry.declare_formatter(formatter("Pow", 3)).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::ArityMismatch);
}

#[test]
fn test_reverse_tag_requires_two_parameters() {
    let mut registry = TestRegistry::new("Neg");
    let error = registry
        .declare(call("Neg", [Int], "neg").tag(Tag::Reversible))
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::ReverseArity);
    assert_eq!(registry.manual_count(), 0);
}

#[test]
fn test_zero_arity_operator_is_declared_once() {
    let mut registry = TestRegistry::new("Pi");
    registry
        .declare(CallDeclaration::new("Pi", TypeSignature::default(), "pi").describe("Pi"))
        .unwrap();

    let error = registry
        .declare(CallDeclaration::new("Pi", TypeSignature::default(), "tau"))
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::MultipleZeroArity);

    registry.declare_formatter(formatter("Pi", 0)).unwrap();
    let table = registry.finalize().unwrap();
    assert_eq!(table.len(), 1);
    assert!(table.lookup(&[]).is_some());
}

#[test]
fn test_finalize_requires_description_then_formatter() {
    let mut registry = TestRegistry::new("Abs");
    registry
        .declare(CallDeclaration::new("Abs", [Int], "abs"))
        .unwrap();
    assert_eq!(
        registry.finalize().unwrap_err().kind(),
        ErrorKind::MissingDescription
    );

    let mut registry = TestRegistry::new("Abs");
    registry.declare(call("Abs", [Int], "abs")).unwrap();
    assert_eq!(
        registry.finalize().unwrap_err().kind(),
        ErrorKind::MissingFormatter
    );
}

#[test]
fn test_description_comes_from_any_declaration() {
    let mut registry = TestRegistry::new("Abs");
    registry
        .declare(CallDeclaration::new("Abs", [Int], "abs_int"))
        .unwrap();
    registry
        .declare(
            CallDeclaration::new("Abs", [Real], "abs_real")
                .describe("Absolute value")
                .category("Arithmetic"),
        )
        .unwrap();
    registry.declare_formatter(formatter("Abs", 1)).unwrap();

    registry.finalize().unwrap();
    assert_eq!(registry.description(), Some("Absolute value"));
    assert_eq!(registry.category(), Some("Arithmetic"));
}

#[test]
fn test_formatter_is_declared_once() {
    let mut registry = TestRegistry::new("Abs");
    registry.declare(call("Abs", [Int], "abs")).unwrap();
    registry.declare_formatter(formatter("Abs", 1)).unwrap();

    let error = registry.declare_formatter(formatter("Abs", 1)).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::DuplicateFormatter);
}

#[test]
fn test_finalized_registry_is_sealed() {
    let mut registry = finalized("Abs", vec![call("Abs", [Int], "abs")]);

    let error = registry.declare(call("Abs", [Real], "abs_real")).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Sealed);
    assert_eq!(registry.manual_count(), 1);
}

#[test]
fn test_table_is_unavailable_before_finalize() {
    let mut registry = TestRegistry::new("Abs");
    registry.declare(call("Abs", [Int], "abs")).unwrap();

    assert_eq!(registry.table().unwrap_err().kind(), ErrorKind::NotFinalized);
    assert_eq!(registry.total_count(), 1);
}

#[test]
fn test_declaration_for_another_operator_is_rejected() {
    let mut registry = TestRegistry::new("Abs");
    let error = registry.declare(call("Neg", [Int], "neg")).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::UnknownOperator);
}

#[test]
fn test_capture_resolves_names_and_tags() {
    let mut capture = Capture::new("Add", "add_real");
    capture.param_types = vec!["Real".to_string(), "Real".to_string()];
    capture.tags = vec!["reversable".to_string(), " real_cast".to_string()];
    capture.description = Some("Add two numbers".to_string());

    let declaration = capture.resolve().unwrap();
    assert_eq!(declaration.params, TypeSignature::from([Real, Real]));
    assert!(declaration.has_tag(Tag::Reversible));
    assert!(declaration.has_tag(Tag::RealCast));
    assert!(!declaration.has_tag(Tag::NoExpr));
}

#[test]
fn test_capture_rejects_unknown_names() {
    let mut capture = Capture::new("Add", "add");
    capture.param_types = vec!["Int".to_string(), "Complex".to_string()];
    capture.location = Some(SourceLocation::new("ops.rs", 7));
    let error = capture.resolve().unwrap_err();
    assert_eq!(error.kind(), ErrorKind::UnknownType);
    assert_eq!(error.to_string(), "Unknown type 'Complex' (at ops.rs:7)");

    let mut capture = Capture::new("Add", "add");
    capture.param_types = vec!["Int".to_string(), "Int".to_string()];
    capture.tags = vec!["commutative".to_string()];
    let error = capture.resolve().unwrap_err();
    assert_eq!(error.kind(), ErrorKind::UnknownTag);
    assert_eq!(error.kind().code(), "ERR_UNKNOWN_TAG");

    let mut capture = Capture::new("Neg", "neg");
    capture.param_types = vec!["Int".to_string()];
    capture.tags = vec!["reversable".to_string()];
    assert_eq!(capture.resolve().unwrap_err().kind(), ErrorKind::ReverseArity);
}

#[test]
fn test_examples_must_match_the_arity() {
    let mut registry = TestRegistry::new("Add");
    let error = registry
        .declare(
            call("Add", [Int, Int], "add")
                .example(["1", "2"])
                .example(["3"])
                .at(SourceLocation::new("ops.rs", 12)),
        )
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::ExampleArity);
    assert_eq!(
        error.to_string(),
        "Operator Add has an example with 1 arguments, expected 2 (at ops.rs:12)"
    );
    assert_eq!(registry.manual_count(), 0);
}

#[test]
fn test_stack_ref_examples_may_carry_stack_context() {
    let mut registry = TestRegistry::new("Pick");
    registry
        .declare(
            call("Pick", [Int], "pick")
                .tag(Tag::StackRef)
                .example(["5", "6", "2"]),
        )
        .unwrap();

    let mut registry = TestRegistry::new("Pick");
    let error = registry
        .declare(call("Pick", [Int], "pick").tag(Tag::StackRef).example(Vec::<&str>::new()))
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::ExampleArity);
}

/// A body that knows its own parameter types and stack use
#[derive(Debug, Clone, PartialEq)]
struct TypedBody {
    params: TypeSignature,
    stack_aware: bool,
}

impl crate::Implementation for TypedBody {
    fn signature(&self) -> Option<&TypeSignature> {
        Some(&self.params)
    }

    fn stack_aware(&self) -> Option<bool> {
        Some(self.stack_aware)
    }
}

fn typed<const N: usize>(params: [ValueType; N], stack_aware: bool) -> TypedBody {
    TypedBody {
        params: TypeSignature::from(params),
        stack_aware,
    }
}

#[test]
fn test_declared_types_must_match_the_body() {
    let mut registry = OperatorRegistry::<TypedBody, ()>::new("Add");
    registry
        .declare(CallDeclaration::new("Add", [Int, Int], typed([Int, Int], false)))
        .unwrap();

    let mut capture = Capture::new("Add", typed([Int, Int], false));
    capture.param_types = vec!["Real".to_string(), "Real".to_string()];
    capture.location = Some(SourceLocation::new("ops.rs", 30));
    let error = registry.declare(capture.resolve().unwrap()).unwrap_err();

    assert_eq!(error.kind(), ErrorKind::BodySignature);
    assert_eq!(error.kind().code(), "ERR_BODY_SIGNATURE");
    assert_eq!(
        error.to_string(),
        "Operator Add is declared for 'Real, Real' but its body takes 'Int, Int' (at ops.rs:30)"
    );
    assert_eq!(registry.manual_count(), 1);
}

#[test]
fn test_stack_ref_tag_must_match_the_body() {
    let mut registry = OperatorRegistry::<TypedBody, ()>::new("Pick");

    let error = registry
        .declare(CallDeclaration::new("Pick", [Int], typed([Int], true)))
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::StackRefMismatch);

    let error = registry
        .declare(CallDeclaration::new("Pick", [Int], typed([Int], false)).tag(Tag::StackRef))
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::StackRefMismatch);
    assert_eq!(
        error.to_string(),
        "Operator Pick has a plain body but carries the 'stack_ref' tag"
    );

    registry
        .declare(CallDeclaration::new("Pick", [Int], typed([Int], true)).tag(Tag::StackRef))
        .unwrap();
}
