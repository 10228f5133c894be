//! Per-operator registry
//!
//! An [`OperatorRegistry`] collects every declaration of one operator name,
//! validates them as they arrive, and on [`OperatorRegistry::finalize`]
//! expands them into the operator's dispatch table. The table is ordered by
//! ordinal tuple and a signature's position in it is its dispatch index.
//!
//! Tie-breaking follows declaration order: every declared signature is
//! claimed before any expansion runs, then declarations are expanded in the
//! order they were declared, so the first declaration to derive a signature
//! owns it and a derived signature never displaces a declared one.

use crate::declaration::{CallDeclaration, FormatterDeclaration, Implementation};
use crate::error::{DeclarationError, Result};
use crate::expander::{ClaimMap, PermutationExpander};
use crate::permutation::Permutation;
use crate::types::{TypeSignature, ValueType};
use indexmap::IndexMap;

/// A finalized dispatch table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorTable {
    entries: IndexMap<TypeSignature, Permutation>,
}

/// A row of an [`OperatorTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableEntry<'t> {
    pub index: usize,
    pub signature: &'t TypeSignature,
    pub permutation: &'t Permutation,
}

impl OperatorTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact match of live argument types against the table
    pub fn lookup(&self, types: &[ValueType]) -> Option<TableEntry<'_>> {
        self.entries
            .get_full(types)
            .map(|(index, signature, permutation)| TableEntry {
                index,
                signature,
                permutation,
            })
    }

    pub fn get(&self, index: usize) -> Option<TableEntry<'_>> {
        self.entries
            .get_index(index)
            .map(|(signature, permutation)| TableEntry {
                index,
                signature,
                permutation,
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = TableEntry<'_>> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, (signature, permutation))| TableEntry {
                index,
                signature,
                permutation,
            })
    }

    pub fn signatures(&self) -> impl Iterator<Item = &TypeSignature> {
        self.entries.keys()
    }
}

/// Every declaration of one operator
#[derive(Debug, Clone)]
pub struct OperatorRegistry<B, F> {
    name: String,
    arity: Option<usize>,
    declarations: Vec<CallDeclaration<B>>,
    declared: IndexMap<TypeSignature, usize>,
    formatter: Option<FormatterDeclaration<F>>,
    table: Option<OperatorTable>,
}

impl<B, F> OperatorRegistry<B, F> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arity: None,
            declarations: Vec::new(),
            declared: IndexMap::new(),
            formatter: None,
            table: None,
        }
    }

    /// Add an implementation. Returns its declaration index.
    pub fn declare(&mut self, declaration: CallDeclaration<B>) -> Result<usize>
    where
        B: Implementation,
    {
        self.ensure_open()?;

        if declaration.operator != self.name {
            return Err(DeclarationError::UnknownOperator {
                operator: declaration.operator,
                location: declaration.location,
            });
        }

        declaration.validate()?;
        declaration.check_body()?;

        if let Some(expected) = self.arity {
            if expected != declaration.arity() {
                return Err(DeclarationError::ArityMismatch {
                    operator: self.name.clone(),
                    expected,
                    found: declaration.arity(),
                    location: declaration.location,
                });
            }
        }

        if declaration.arity() == 0 && !self.declarations.is_empty() {
            return Err(DeclarationError::MultipleZeroArity {
                operator: self.name.clone(),
                location: declaration.location,
            });
        }

        if let Some(previous) = self.declared.get(&declaration.params) {
            return Err(DeclarationError::DuplicateSignature {
                operator: self.name.clone(),
                signature: declaration.params,
                location: declaration.location,
                previous: self.declarations[*previous].location.clone(),
            });
        }

        let index = self.declarations.len();
        self.arity = Some(declaration.arity());
        self.declared.insert(declaration.params.clone(), index);
        self.declarations.push(declaration);
        Ok(index)
    }

    /// Attach the operator's input formatter
    pub fn declare_formatter(&mut self, formatter: FormatterDeclaration<F>) -> Result<()> {
        self.ensure_open()?;

        if self.formatter.is_some() {
            return Err(DeclarationError::DuplicateFormatter {
                operator: self.name.clone(),
                location: formatter.location,
            });
        }

        if let Some(expected) = self.arity {
            if expected != formatter.arity {
                return Err(DeclarationError::ArityMismatch {
                    operator: self.name.clone(),
                    expected,
                    found: formatter.arity,
                    location: formatter.location,
                });
            }
        }

        self.formatter = Some(formatter);
        Ok(())
    }

    /// Validate metadata, expand every declaration and build the table.
    ///
    /// Finalizing again rebuilds the same table.
    pub fn finalize(&mut self) -> Result<&OperatorTable> {
        if self.description().is_none() {
            return Err(DeclarationError::MissingDescription {
                operator: self.name.clone(),
            });
        }

        if self.formatter.is_none() {
            return Err(DeclarationError::MissingFormatter {
                operator: self.name.clone(),
            });
        }

        let mut claims = ClaimMap::new();
        for (index, declaration) in self.declarations.iter().enumerate() {
            claims
                .claim_declared(declaration.params.clone(), index)
                .map_err(|previous| DeclarationError::DuplicateSignature {
                    operator: self.name.clone(),
                    signature: declaration.params.clone(),
                    location: declaration.location.clone(),
                    previous: self.declarations[previous.declaration].location.clone(),
                })?;
        }

        let mut entries = IndexMap::new();
        for (index, declaration) in self.declarations.iter().enumerate() {
            let proposed = PermutationExpander::new(index, declaration).expand(&claims);

            for (signature, permutation) in proposed {
                if permutation.is_identity() || claims.claim_derived(signature.clone(), index) {
                    entries.insert(signature, permutation);
                }
            }
        }
        entries.sort_keys();

        tracing::debug!(
            operator = %self.name,
            declared = self.declarations.len(),
            total = entries.len(),
            "finalized operator table"
        );

        Ok(self.table.insert(OperatorTable { entries }))
    }

    /// The finalized table
    pub fn table(&self) -> Result<&OperatorTable> {
        self.table
            .as_ref()
            .ok_or_else(|| DeclarationError::NotFinalized {
                operator: self.name.clone(),
            })
    }

    pub fn is_finalized(&self) -> bool {
        self.table.is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of stack arguments, zero until the first declaration
    pub fn arity(&self) -> usize {
        self.arity.unwrap_or(0)
    }

    /// The first description supplied by any declaration
    pub fn description(&self) -> Option<&str> {
        self.declarations
            .iter()
            .find_map(|declaration| declaration.description.as_deref())
    }

    /// The first category supplied by any declaration
    pub fn category(&self) -> Option<&str> {
        self.declarations
            .iter()
            .find_map(|declaration| declaration.category.as_deref())
    }

    /// Every example argument list, in declaration order
    pub fn examples(&self) -> impl Iterator<Item = &Vec<String>> {
        self.declarations
            .iter()
            .flat_map(|declaration| declaration.examples.iter())
    }

    pub fn declarations(&self) -> &[CallDeclaration<B>] {
        &self.declarations
    }

    pub fn declaration(&self, index: usize) -> Option<&CallDeclaration<B>> {
        self.declarations.get(index)
    }

    pub fn formatter(&self) -> Option<&FormatterDeclaration<F>> {
        self.formatter.as_ref()
    }

    /// Hand-written implementations
    pub fn manual_count(&self) -> usize {
        self.declarations.len()
    }

    /// Callable signatures once finalized, hand-written ones otherwise
    pub fn total_count(&self) -> usize {
        self.table
            .as_ref()
            .map_or(self.declarations.len(), OperatorTable::len)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.table.is_some() {
            return Err(DeclarationError::Sealed {
                operator: self.name.clone(),
            });
        }
        Ok(())
    }
}
