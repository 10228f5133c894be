//! Dispatch table entries
//!
//! A [`Permutation`] maps one callable signature onto the body of the
//! declaration it was derived from. Its argument plan says, for each body
//! parameter in order, which popped stack slot feeds it and how that value
//! is coerced first.

use crate::lattice::Coercion;
use crate::types::{TypeSignature, ValueType};
use std::fmt;

/// How a permutation was derived from its declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    Reversed,
    BigIntCast,
    RealCast,
}

impl Provenance {
    pub fn label(self) -> &'static str {
        match self {
            Provenance::Reversed => "reversed",
            Provenance::BigIntCast => "bigint cast",
            Provenance::RealCast => "real cast",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Binding of one body parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArgumentBinding {
    /// Declared parameter type the body receives
    pub target: ValueType,
    /// Type found on the stack in `source_slot`
    pub runtime: ValueType,
    /// Index into the popped values, deepest first
    pub source_slot: usize,
    pub coercion: Coercion,
}

impl ArgumentBinding {
    pub fn identity(ty: ValueType, slot: usize) -> Self {
        Self {
            target: ty,
            runtime: ty,
            source_slot: slot,
            coercion: Coercion::Identity,
        }
    }
}

/// One entry of an operator's dispatch table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    pub signature: TypeSignature,
    /// Index of the source declaration within its registry
    pub declaration: usize,
    pub plan: Vec<ArgumentBinding>,
    pub provenance: Vec<Provenance>,
    pub stack_ref: bool,
    pub echo_expression: bool,
}

impl Permutation {
    /// Build a permutation from its plan; the signature is read back from
    /// the slots the plan pulls from.
    pub fn from_plan(
        declaration: usize,
        plan: Vec<ArgumentBinding>,
        provenance: Vec<Provenance>,
        stack_ref: bool,
        echo_expression: bool,
    ) -> Self {
        let signature = signature_of(&plan);
        Self {
            signature,
            declaration,
            plan,
            provenance,
            stack_ref,
            echo_expression,
        }
    }

    /// The same call with its two stack slots swapped
    pub fn reversed(&self) -> Self {
        debug_assert_eq!(self.arity(), 2, "only binary permutations can be reversed");

        let mut plan = self.plan.clone();
        for binding in &mut plan {
            binding.source_slot = 1 - binding.source_slot;
        }

        let mut provenance = self.provenance.clone();
        provenance.push(Provenance::Reversed);

        Self::from_plan(
            self.declaration,
            plan,
            provenance,
            self.stack_ref,
            self.echo_expression,
        )
    }

    pub fn arity(&self) -> usize {
        self.plan.len()
    }

    pub fn is_identity(&self) -> bool {
        self.provenance.is_empty()
    }

    pub fn is_reversed(&self) -> bool {
        self.provenance.contains(&Provenance::Reversed)
    }

    /// `[bigint cast, reversed]`, or an empty string for the declared entry
    pub fn provenance_label(&self) -> String {
        if self.provenance.is_empty() {
            return String::new();
        }
        let labels: Vec<&str> = self.provenance.iter().map(|p| p.label()).collect();
        format!("[{}]", labels.join(", "))
    }
}

fn signature_of(plan: &[ArgumentBinding]) -> TypeSignature {
    let mut slots = vec![None; plan.len()];
    for binding in plan {
        slots[binding.source_slot] = Some(binding.runtime);
    }
    slots
        .into_iter()
        .map(|slot| slot.unwrap_or_else(|| unreachable!("argument plan leaves a slot unbound")))
        .collect::<Vec<_>>()
        .into()
}
