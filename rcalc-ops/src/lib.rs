//! RCalc operator tables
//!
//! Turns a handful of hand-written operator implementations, each keyed by
//! an exact argument-type tuple, into the complete dispatch table of every
//! signature the operator accepts.
//!
//! ## Architecture
//!
//! - **Type lattice** (`types`, `lattice`): the closed set of value types, their
//!   ordinal order and the declared coercion edges between them
//! - **Declarations** (`declaration`): one implementation plus its modifier tags
//! - **Expander** (`expander`): derives reversed and widened signatures from a
//!   declaration without claiming anything already owned
//! - **Registry** (`registry`): all declarations of one operator, sealed into an
//!   ordered table by `finalize`
//! - **Catalog** (`catalog`): every operator of a build, with categories and
//!   statistics
//!
//! The crate is generic over the body and formatter types, so it knows
//! nothing about runtime values. `rcalc-interpreter` supplies both.

#![allow(clippy::uninlined_format_args)]

pub mod catalog;
pub mod declaration;
pub mod error;
pub mod expander;
pub mod lattice;
pub mod permutation;
pub mod registry;
pub mod types;

#[cfg(test)]
#[path = "tests/mod.rs"]
mod tests;

// Re-export public API
pub use catalog::{canonical_name, CatalogStats, Category, OperatorCatalog};
pub use declaration::{
    CallDeclaration, Capture, FormatterDeclaration, Implementation, SourceLocation, Tag, TagSet,
};
pub use error::{DeclarationError, ErrorKind};
pub use expander::{Claim, ClaimMap, ClaimOrigin, PermutationExpander};
pub use lattice::{CastFamily, Coercion, CoercionEdge, CoercionKind};
pub use permutation::{ArgumentBinding, Permutation, Provenance};
pub use registry::{OperatorRegistry, OperatorTable, TableEntry};
pub use types::{TypeSignature, ValueType};
