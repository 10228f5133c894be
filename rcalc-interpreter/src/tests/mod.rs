//! Unit tests for dispatch, the standard operators and sessions

mod test_builtins;
mod test_dispatch;

use crate::{CalculatorSession, LookupStrategy, RpnStack, Value};

pub(crate) fn session() -> CalculatorSession {
    CalculatorSession::standard(LookupStrategy::Ordered).unwrap()
}

/// Evaluate a line in a fresh session and return the top value
pub(crate) fn eval(input: &str) -> Value {
    session().eval_to_value(input).unwrap()
}

/// A stack holding the given literals, bottom first
pub(crate) fn stack_of(literals: &[&str]) -> RpnStack {
    let mut stack = RpnStack::new();
    for literal in literals {
        stack.push_value(Value::parse(literal).unwrap());
    }
    stack
}
