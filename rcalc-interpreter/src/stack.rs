//! The RPN stack operators read from and write to
//!
//! Items are stored bottom first. Multi-item operations always work in
//! that order too: `pop_items` returns the deepest popped item first and
//! `push_items` pushes in the order given, so pushing back what was popped
//! restores the stack exactly.

use crate::value::Value;
use rcalc_ops::{TypeSignature, ValueType};

/// A value on the stack together with how it was entered
#[derive(Debug, Clone, PartialEq)]
pub struct StackItem {
    /// How the value was written, or the expression that produced it
    pub input: String,
    /// The rendered value
    pub output: String,
    pub value: Value,
    /// When composing inputs, expressions are wrapped in parentheses
    pub input_is_expression: bool,
}

impl StackItem {
    pub fn new(input: impl Into<String>, value: Value, input_is_expression: bool) -> Self {
        Self {
            input: input.into(),
            output: value.to_string(),
            value,
            input_is_expression,
        }
    }

    /// An item entered directly as a literal
    pub fn from_value(value: Value) -> Self {
        let input = value.to_string();
        Self::new(input, value, false)
    }

    pub fn input_formatted(&self) -> String {
        if self.input_is_expression {
            format!("({})", self.input)
        } else {
            self.input.clone()
        }
    }

    pub fn value_type(&self) -> ValueType {
        self.value.value_type()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RpnStack {
    items: Vec<StackItem>,
}

impl RpnStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_item(&mut self, item: StackItem) {
        self.items.push(item);
    }

    pub fn push_value(&mut self, value: Value) {
        self.push_item(StackItem::from_value(value));
    }

    /// Push items in the given order, the last one ends up on top
    pub fn push_items(&mut self, items: Vec<StackItem>) {
        self.items.extend(items);
    }

    /// Types of the top `count` items, deepest first. `None` when the
    /// stack holds fewer than `count` items.
    pub fn peek_types(&self, count: usize) -> Option<Vec<ValueType>> {
        if count > self.items.len() {
            return None;
        }
        Some(
            self.items[self.items.len() - count..]
                .iter()
                .map(StackItem::value_type)
                .collect(),
        )
    }

    /// `Vec2, Vec2` rendering of up to `count` top types, for messages
    pub fn display_types(&self, count: usize) -> String {
        let count = count.min(self.items.len());
        let types: Vec<ValueType> = self.items[self.items.len() - count..]
            .iter()
            .map(StackItem::value_type)
            .collect();
        TypeSignature::new(types).to_string()
    }

    /// Remove up to `count` items from the top, deepest first
    pub fn pop_items(&mut self, count: usize) -> Vec<StackItem> {
        let count = count.min(self.items.len());
        self.items.split_off(self.items.len() - count)
    }

    pub fn top(&self) -> Option<&StackItem> {
        self.items.last()
    }

    /// Item `depth` places below the top, `0` being the top itself
    pub fn peek(&self, depth: usize) -> Option<&StackItem> {
        self.items.iter().rev().nth(depth)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[StackItem] {
        &self.items
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
