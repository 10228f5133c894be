//! The widening relationships between value types
//!
//! Coercions are declared, never inferred. The only edges are the three in
//! [`COERCION_EDGES`], and a cast family may only use the edges that lead from
//! one of its members to its anchor.

use crate::declaration::Tag;
use crate::permutation::Provenance;
use crate::types::ValueType;
use std::fmt;

/// How a value is carried across a coercion edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoercionKind {
    /// Same numeric value, wider representation (Int -> BigInt)
    Reinterpret,
    /// Numeric conversion that may lose precision (-> Real)
    Convert,
}

/// A directed, declared widening from one type to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoercionEdge {
    pub from: ValueType,
    pub to: ValueType,
    pub kind: CoercionKind,
}

impl fmt::Display for CoercionEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}>{}", self.from, self.to)
    }
}

pub const COERCION_EDGES: [CoercionEdge; 3] = [
    CoercionEdge {
        from: ValueType::Int,
        to: ValueType::BigInt,
        kind: CoercionKind::Reinterpret,
    },
    CoercionEdge {
        from: ValueType::Int,
        to: ValueType::Real,
        kind: CoercionKind::Convert,
    },
    CoercionEdge {
        from: ValueType::BigInt,
        to: ValueType::Real,
        kind: CoercionKind::Convert,
    },
];

/// Coercion applied to one argument before the body is called
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coercion {
    Identity,
    Edge(CoercionEdge),
}

impl Coercion {
    pub fn is_identity(&self) -> bool {
        matches!(self, Coercion::Identity)
    }
}

impl fmt::Display for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coercion::Identity => f.write_str("="),
            Coercion::Edge(edge) => edge.fmt(f),
        }
    }
}

pub fn ordinal_of(ty: ValueType) -> u8 {
    ty.ordinal()
}

/// Look up the declared edge between two types. Identical types never have
/// an edge; callers treat them as identity.
pub fn coercion(from: ValueType, to: ValueType) -> Option<CoercionEdge> {
    COERCION_EDGES
        .iter()
        .find(|edge| edge.from == from && edge.to == to)
        .copied()
}

/// A widening family: every member may stand in for the anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastFamily {
    BigInt,
    Real,
}

impl CastFamily {
    /// Families in the order the expander applies them
    pub const ALL: [CastFamily; 2] = [CastFamily::BigInt, CastFamily::Real];

    pub fn anchor(self) -> ValueType {
        match self {
            CastFamily::BigInt => ValueType::BigInt,
            CastFamily::Real => ValueType::Real,
        }
    }

    /// Anchor first, then the narrower members
    pub fn members(self) -> &'static [ValueType] {
        match self {
            CastFamily::BigInt => &[ValueType::BigInt, ValueType::Int],
            CastFamily::Real => &[ValueType::Real, ValueType::BigInt, ValueType::Int],
        }
    }

    pub fn tag(self) -> Tag {
        match self {
            CastFamily::BigInt => Tag::BigIntCast,
            CastFamily::Real => Tag::RealCast,
        }
    }

    pub fn provenance(self) -> Provenance {
        match self {
            CastFamily::BigInt => Provenance::BigIntCast,
            CastFamily::Real => Provenance::RealCast,
        }
    }

    /// Coercion needed to present a `runtime` member as the anchor
    pub fn coercion_from(self, runtime: ValueType) -> Coercion {
        if runtime == self.anchor() {
            return Coercion::Identity;
        }

        match coercion(runtime, self.anchor()) {
            Some(edge) => Coercion::Edge(edge),
            None => unreachable!(
                "{} is a member of the {:?} family without an edge",
                runtime, self
            ),
        }
    }
}
