//! Calculator session
//!
//! A session owns an operator map and a stack and evaluates whole input
//! lines against them:
//! - literals are pushed as they are read
//! - operators (by name or symbol) are dispatched against the stack
//! - a line is all or nothing, any error restores the stack it started with

use crate::error::{EvalError, RuntimeError};
use crate::operator_map::{LookupStrategy, OperatorMap};
use crate::stack::{RpnStack, StackItem};
use crate::value::Value;
use rcalc_ops::DeclarationError;
use rcalc_parser::{Literal, Token};

/// Result of evaluating one line
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineOutcome {
    pub literals: usize,
    /// `(operator, dispatch index)` for every operator evaluated
    pub dispatched: Vec<(String, usize)>,
}

#[derive(Debug)]
pub struct CalculatorSession {
    operators: OperatorMap,
    stack: RpnStack,
}

impl CalculatorSession {
    pub fn new(operators: OperatorMap) -> Self {
        Self {
            operators,
            stack: RpnStack::new(),
        }
    }

    /// A session over the standard operator set
    pub fn standard(strategy: LookupStrategy) -> Result<Self, DeclarationError> {
        Ok(Self::new(crate::builtins::standard_operator_map(strategy)?))
    }

    pub fn operators(&self) -> &OperatorMap {
        &self.operators
    }

    pub fn stack(&self) -> &RpnStack {
        &self.stack
    }

    pub fn top(&self) -> Option<&StackItem> {
        self.stack.top()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }

    /// Evaluate a line of RPN input
    pub fn eval_line(&mut self, input: &str) -> Result<LineOutcome, EvalError> {
        let line = rcalc_parser::parse_line(input)?;
        let snapshot = self.stack.clone();

        match self.eval_tokens(&line.tokens) {
            Ok(outcome) => Ok(outcome),
            Err(error) => {
                tracing::debug!(%error, "restoring stack after failed line");
                self.stack = snapshot;
                Err(error)
            }
        }
    }

    /// Evaluate a line and return the value left on top
    pub fn eval_to_value(&mut self, input: &str) -> Result<Value, EvalError> {
        self.eval_line(input)?;
        self.top()
            .map(|item| item.value.clone())
            .ok_or_else(|| RuntimeError::custom("The stack is empty").into())
    }

    /// Push one literal
    pub fn push_literal(&mut self, literal: &Literal) -> Result<(), EvalError> {
        let input = literal.value.to_string();
        let value = Value::try_from(literal.value.clone())?;
        self.stack.push_item(StackItem::new(input, value, false));
        Ok(())
    }

    /// Evaluate one operator by name
    pub fn apply(&mut self, operator: &str) -> Result<usize, EvalError> {
        Ok(self.operators.evaluate(operator, &mut self.stack)?)
    }

    fn eval_tokens(&mut self, tokens: &[Token]) -> Result<LineOutcome, EvalError> {
        let mut outcome = LineOutcome::default();

        for token in tokens {
            match token {
                Token::Literal(literal) => {
                    self.push_literal(literal)?;
                    outcome.literals += 1;
                }
                Token::Operator(operator) => {
                    let index = self.apply(&operator.name)?;
                    outcome.dispatched.push((operator.name.clone(), index));
                }
            }
        }

        tracing::trace!(
            literals = outcome.literals,
            operators = outcome.dispatched.len(),
            depth = self.stack.len(),
            "evaluated line"
        );
        Ok(outcome)
    }
}
