//! Value types and type signatures
//!
//! `ValueType` is the closed catalog of stack value types. Its declaration
//! order is the lattice ordinal used for every canonical ordering in the
//! crate, so the derived `Ord` of both `ValueType` and `TypeSignature` is the
//! ordinal tuple order.

use crate::error::DeclarationError;
use lazy_static::lazy_static;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A stack value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueType {
    Int,
    BigInt,
    Real,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
    Unit,
}

lazy_static! {
    static ref TYPES_BY_NAME: HashMap<&'static str, ValueType> = ValueType::ALL
        .iter()
        .map(|ty| (ty.name(), *ty))
        .collect();
}

impl ValueType {
    /// Every type, in ordinal order
    pub const ALL: [ValueType; 10] = [
        ValueType::Int,
        ValueType::BigInt,
        ValueType::Real,
        ValueType::Vec2,
        ValueType::Vec3,
        ValueType::Vec4,
        ValueType::Mat2,
        ValueType::Mat3,
        ValueType::Mat4,
        ValueType::Unit,
    ];

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueType::Int => "Int",
            ValueType::BigInt => "BigInt",
            ValueType::Real => "Real",
            ValueType::Vec2 => "Vec2",
            ValueType::Vec3 => "Vec3",
            ValueType::Vec4 => "Vec4",
            ValueType::Mat2 => "Mat2",
            ValueType::Mat3 => "Mat3",
            ValueType::Mat4 => "Mat4",
            ValueType::Unit => "Unit",
        }
    }

    /// Resolve a declared type name. Names are case-sensitive.
    pub fn from_name(name: &str) -> Result<Self, DeclarationError> {
        TYPES_BY_NAME
            .get(name)
            .copied()
            .ok_or_else(|| DeclarationError::UnknownType {
                name: name.to_string(),
                location: None,
            })
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueType {
    type Err = DeclarationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValueType::from_name(s)
    }
}

/// Ordered argument-type tuple identifying one callable variant of an operator
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeSignature(Vec<ValueType>);

impl TypeSignature {
    pub fn new(types: Vec<ValueType>) -> Self {
        Self(types)
    }

    /// Parse a list of type names, failing on the first unknown one
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, DeclarationError> {
        names
            .iter()
            .map(|name| ValueType::from_name(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn arity(&self) -> usize {
        self.0.len()
    }

    pub fn types(&self) -> &[ValueType] {
        &self.0
    }

    pub fn get(&self, position: usize) -> Option<ValueType> {
        self.0.get(position).copied()
    }

    /// The two-argument signature with its arguments swapped.
    /// Signatures of any other arity are returned unchanged.
    pub fn reversed(&self) -> Self {
        match self.0.as_slice() {
            [first, second] => Self(vec![*second, *first]),
            _ => self.clone(),
        }
    }

    pub fn ordinals(&self) -> Vec<u8> {
        self.0.iter().map(|ty| ty.ordinal()).collect()
    }

    /// `Int_Real` style rendering used in generated identifiers and messages
    pub fn underscored(&self) -> String {
        self.0
            .iter()
            .map(|ty| ty.name())
            .collect::<Vec<_>>()
            .join("_")
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|ty| ty.name()).collect();
        f.write_str(&names.join(", "))
    }
}

impl Borrow<[ValueType]> for TypeSignature {
    fn borrow(&self) -> &[ValueType] {
        &self.0
    }
}

impl From<Vec<ValueType>> for TypeSignature {
    fn from(types: Vec<ValueType>) -> Self {
        Self(types)
    }
}

impl From<&[ValueType]> for TypeSignature {
    fn from(types: &[ValueType]) -> Self {
        Self(types.to_vec())
    }
}

impl<const N: usize> From<[ValueType; N]> for TypeSignature {
    fn from(types: [ValueType; N]) -> Self {
        Self(types.to_vec())
    }
}
