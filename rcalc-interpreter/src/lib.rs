//! RCalc interpreter
//!
//! Runtime side of the operator tables: values, the RPN stack, typed
//! operator bodies and the dispatcher that routes a stack to the right body.
//!
//! - `value`, `stack`: what operators consume and produce
//! - `body`: typed closures erased into operator bodies and formatters
//! - `coercion`: applies lattice coercions to runtime values
//! - `dispatch`: one operator's table against a live stack
//! - `operator_map`: every operator, looked up by name
//! - `builtins`: the standard operator set
//! - `session`: line-at-a-time evaluation

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::result_large_err)]

pub mod body;
pub mod builtins;
pub mod coercion;
pub mod dispatch;
pub mod error;
pub mod operator_map;
pub mod session;
pub mod stack;
pub mod value;

// Include tests directory with all test modules
#[cfg(test)]
#[path = "tests/mod.rs"]
mod tests;

// Re-export public API
pub use body::{FromValue, IntoValue, OpBody, OpFormatter};
pub use builtins::{standard_catalog, standard_operator_map};
pub use dispatch::{Dispatcher, Registry};
pub use error::{EvalError, Result, RuntimeError, RuntimeErrorKind};
pub use operator_map::{Catalog, LookupStrategy, OperatorMap};
pub use session::{CalculatorSession, LineOutcome};
pub use stack::{RpnStack, StackItem};
pub use value::Value;
