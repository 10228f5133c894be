//! Applying argument coercions before a body is called

use crate::error::{Result, RuntimeError};
use crate::value::Value;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use rcalc_ops::{Coercion, CoercionEdge, ValueType};

/// Carry `value` across `coercion`. Fails when the value is not of the
/// edge's source type.
pub fn apply(value: Value, coercion: &Coercion) -> Result<Value> {
    match coercion {
        Coercion::Identity => Ok(value),
        Coercion::Edge(edge) => apply_edge(value, edge),
    }
}

fn apply_edge(value: Value, edge: &CoercionEdge) -> Result<Value> {
    if value.value_type() != edge.from {
        return Err(RuntimeError::TypeMismatch {
            expected: edge.from,
            found: value.value_type(),
        });
    }

    match (value, edge.to) {
        (Value::Int(int), ValueType::BigInt) => Ok(Value::BigInt(BigInt::from(int))),
        (Value::Int(int), ValueType::Real) => Ok(Value::Real(int as f64)),
        (Value::BigInt(big), ValueType::Real) => big
            .to_f64()
            .map(Value::Real)
            .ok_or(RuntimeError::Overflow),
        (value, _) => Err(RuntimeError::TypeMismatch {
            expected: edge.from,
            found: value.value_type(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcalc_ops::lattice::coercion;

    fn edge(from: ValueType, to: ValueType) -> Coercion {
        Coercion::Edge(coercion(from, to).unwrap())
    }

    #[test]
    fn test_int_widens_to_bigint_and_real() {
        assert_eq!(
            apply(Value::Int(-5), &edge(ValueType::Int, ValueType::BigInt)).unwrap(),
            Value::BigInt(BigInt::from(-5))
        );
        assert_eq!(
            apply(Value::Int(3), &edge(ValueType::Int, ValueType::Real)).unwrap(),
            Value::Real(3.0)
        );
    }

    #[test]
    fn test_bigint_converts_to_real() {
        let big: BigInt = "100000000000000000000".parse().unwrap();
        assert_eq!(
            apply(Value::BigInt(big), &edge(ValueType::BigInt, ValueType::Real)).unwrap(),
            Value::Real(1e20)
        );
    }

    #[test]
    fn test_identity_keeps_the_value() {
        let value = Value::Vec2([1.0, 2.0]);
        assert_eq!(apply(value.clone(), &Coercion::Identity).unwrap(), value);
    }

    #[test]
    fn test_wrong_source_type_is_a_mismatch() {
        let error = apply(Value::Real(1.5), &edge(ValueType::Int, ValueType::BigInt)).unwrap_err();
        assert_eq!(
            error,
            RuntimeError::TypeMismatch {
                expected: ValueType::Int,
                found: ValueType::Real,
            }
        );
    }
}
