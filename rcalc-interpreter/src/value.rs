//! Runtime value representation
//!
//! One variant per `ValueType`. Vectors and matrices are fixed-size arrays of
//! `f64`, BigInt is arbitrary precision.

use crate::error::{Result, RuntimeError};
use num_bigint::BigInt;
use rcalc_ops::ValueType;
use rcalc_parser::LiteralValue;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    BigInt(BigInt),
    Real(f64),
    Vec2([f64; 2]),
    Vec3([f64; 3]),
    Vec4([f64; 4]),
    Mat2([[f64; 2]; 2]),
    Mat3([[f64; 3]; 3]),
    Mat4([[f64; 4]; 4]),
    /// Unit name without the leading underscore
    Unit(String),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Int(_) => ValueType::Int,
            Value::BigInt(_) => ValueType::BigInt,
            Value::Real(_) => ValueType::Real,
            Value::Vec2(_) => ValueType::Vec2,
            Value::Vec3(_) => ValueType::Vec3,
            Value::Vec4(_) => ValueType::Vec4,
            Value::Mat2(_) => ValueType::Mat2,
            Value::Mat3(_) => ValueType::Mat3,
            Value::Mat4(_) => ValueType::Mat4,
            Value::Unit(_) => ValueType::Unit,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.value_type().name()
    }

    /// Parse a value literal
    pub fn parse(input: &str) -> std::result::Result<Self, crate::EvalError> {
        let literal = rcalc_parser::parse_literal(input)?;
        Ok(Value::try_from(literal.value)?)
    }
}

impl TryFrom<LiteralValue> for Value {
    type Error = RuntimeError;

    fn try_from(literal: LiteralValue) -> Result<Self> {
        match literal {
            LiteralValue::Int(value) => Ok(Value::Int(value)),
            LiteralValue::BigInt(value) => Ok(Value::BigInt(value)),
            LiteralValue::Real(value) => Ok(Value::Real(value)),
            LiteralValue::Unit(name) => Ok(Value::Unit(name)),
            LiteralValue::Vector(components) => match components.len() {
                2 => Ok(Value::Vec2(array(&components)?)),
                3 => Ok(Value::Vec3(array(&components)?)),
                4 => Ok(Value::Vec4(array(&components)?)),
                size => Err(RuntimeError::domain(format!(
                    "Vectors have 2 to 4 components, found {size}"
                ))),
            },
            LiteralValue::Matrix(rows) => match rows.len() {
                2 => Ok(Value::Mat2(matrix(&rows)?)),
                3 => Ok(Value::Mat3(matrix(&rows)?)),
                4 => Ok(Value::Mat4(matrix(&rows)?)),
                size => Err(RuntimeError::domain(format!(
                    "Matrices have 2 to 4 rows, found {size}"
                ))),
            },
        }
    }
}

fn array<const N: usize>(components: &[f64]) -> Result<[f64; N]> {
    components.try_into().map_err(|_| RuntimeError::ArgumentCount {
        expected: N,
        found: components.len(),
    })
}

fn matrix<const N: usize>(rows: &[Vec<f64>]) -> Result<[[f64; N]; N]> {
    let rows = rows
        .iter()
        .map(|row| array::<N>(row))
        .collect::<Result<Vec<_>>>()?;
    array_of_rows(rows)
}

fn array_of_rows<const N: usize>(rows: Vec<[f64; N]>) -> Result<[[f64; N]; N]> {
    let found = rows.len();
    rows.try_into()
        .map_err(|_| RuntimeError::ArgumentCount { expected: N, found })
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{value}"),
            Value::BigInt(value) => write!(f, "{value}"),
            Value::Real(value) => write!(f, "{value}"),
            Value::Vec2(v) => write_row(f, v),
            Value::Vec3(v) => write_row(f, v),
            Value::Vec4(v) => write_row(f, v),
            Value::Mat2(m) => write_matrix(f, m),
            Value::Mat3(m) => write_matrix(f, m),
            Value::Mat4(m) => write_matrix(f, m),
            Value::Unit(name) => write!(f, "_{name}"),
        }
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, row: &[f64]) -> fmt::Result {
    f.write_str("[")?;
    for (index, component) in row.iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{component}")?;
    }
    f.write_str("]")
}

fn write_matrix<const N: usize>(f: &mut fmt::Formatter<'_>, rows: &[[f64; N]; N]) -> fmt::Result {
    f.write_str("{")?;
    for (index, row) in rows.iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        write_row(f, row)?;
    }
    f.write_str("}")
}
