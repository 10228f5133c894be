//! Runtime dispatch over a finalized operator table
//!
//! The dispatcher reads the live argument types off the stack, finds the
//! one table entry with exactly those types, and only then touches the
//! stack. A failed lookup leaves the stack as it was; a failing body gets
//! its arguments pushed back before the error is returned.

use crate::body::{OpBody, OpFormatter};
use crate::coercion;
use crate::error::{Result, RuntimeError};
use crate::stack::{RpnStack, StackItem};
use crate::value::Value;
use rcalc_ops::{
    DeclarationError, OperatorRegistry, OperatorTable, Permutation, TableEntry, ValueType,
};

/// Registry instantiated with runtime bodies and formatters
pub type Registry = OperatorRegistry<OpBody, OpFormatter>;

pub struct Dispatcher<'r> {
    registry: &'r Registry,
    table: &'r OperatorTable,
    formatter: &'r OpFormatter,
}

impl<'r> Dispatcher<'r> {
    /// Fails unless the registry is finalized
    pub fn new(registry: &'r Registry) -> std::result::Result<Self, DeclarationError> {
        let table = registry.table()?;
        let formatter = registry
            .formatter()
            .map(|declaration| &declaration.format)
            .ok_or_else(|| DeclarationError::MissingFormatter {
                operator: registry.name().to_string(),
            })?;

        Ok(Self {
            registry,
            table,
            formatter,
        })
    }

    pub fn name(&self) -> &'r str {
        self.registry.name()
    }

    /// The table entry a tuple of live types would dispatch to
    pub fn lookup(&self, types: &[ValueType]) -> Option<TableEntry<'r>> {
        self.table.lookup(types)
    }

    /// Evaluate the operator against the top of `stack`. Returns the
    /// dispatch index that was taken.
    pub fn evaluate(&self, stack: &mut RpnStack) -> Result<usize> {
        let arity = self.registry.arity();

        // a zero-arity table holds the single empty signature
        let Some(types) = stack.peek_types(arity) else {
            return Err(self.invalid_param(format!(
                "{} op requires {} {}",
                self.name(),
                arity,
                if arity == 1 { "parameter" } else { "parameters" }
            )));
        };

        let Some(entry) = self.lookup(&types) else {
            return Err(self.invalid_param(format!(
                "{} op does not recognize {}",
                self.name(),
                stack.display_types(arity)
            )));
        };

        let body = self
            .registry
            .declaration(entry.permutation.declaration)
            .map(|declaration| &declaration.body)
            .ok_or_else(|| {
                RuntimeError::custom(format!(
                    "{} table entry {} has no declaration",
                    self.name(),
                    entry.index
                ))
            })?;

        let items = stack.pop_items(arity);
        let result =
            bind(entry.permutation, &items).and_then(|args| body.call(stack, args));

        let value = match result {
            Ok(value) => value,
            Err(error) => {
                stack.push_items(items);
                return Err(error);
            }
        };

        let input = self.formatter.format(stack, &items);
        stack.push_item(StackItem::new(
            input,
            value,
            entry.permutation.echo_expression,
        ));

        tracing::debug!(
            operator = %self.name(),
            index = entry.index,
            signature = %entry.signature,
            provenance = %entry.permutation.provenance_label(),
            "dispatched operator"
        );
        Ok(entry.index)
    }

    fn invalid_param(&self, message: String) -> RuntimeError {
        RuntimeError::InvalidParam {
            operator: self.name().to_string(),
            message,
        }
    }
}

/// Body arguments for a permutation, coerced from the popped items
fn bind(permutation: &Permutation, items: &[StackItem]) -> Result<Vec<Value>> {
    permutation
        .plan
        .iter()
        .map(|binding| {
            let item = items.get(binding.source_slot).ok_or(RuntimeError::ArgumentCount {
                expected: permutation.arity(),
                found: items.len(),
            })?;
            coercion::apply(item.value.clone(), &binding.coercion)
        })
        .collect()
}
