//! Unit tests for declaration, expansion and table construction

mod test_registry;

use crate::{CallDeclaration, FormatterDeclaration, OperatorRegistry, ValueType};

pub(crate) use ValueType::{BigInt, Int, Real, Vec2, Vec3};

pub(crate) type TestRegistry = OperatorRegistry<&'static str, ()>;
pub(crate) type TestDeclaration = CallDeclaration<&'static str>;

pub(crate) fn call<const N: usize>(
    operator: &str,
    params: [ValueType; N],
    body: &'static str,
) -> TestDeclaration {
    CallDeclaration::new(operator, params, body).describe(format!("{operator} test operator"))
}

pub(crate) fn formatter(operator: &str, arity: usize) -> FormatterDeclaration<()> {
    FormatterDeclaration::new(operator, arity, ())
}

/// Declare everything, attach a formatter and finalize
pub(crate) fn finalized(operator: &str, declarations: Vec<TestDeclaration>) -> TestRegistry {
    let mut registry = TestRegistry::new(operator);
    let arity = declarations.first().map_or(0, |d| d.arity());
    for declaration in declarations {
        registry.declare(declaration).unwrap();
    }
    registry.declare_formatter(formatter(operator, arity)).unwrap();
    registry.finalize().unwrap();
    registry
}

pub(crate) fn signatures(registry: &TestRegistry) -> Vec<Vec<ValueType>> {
    registry
        .table()
        .unwrap()
        .signatures()
        .map(|signature| signature.types().to_vec())
        .collect()
}
