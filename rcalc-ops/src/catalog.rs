//! The collection of every operator known to a build
//!
//! Declarations are routed to the registry of their operator as they are
//! discovered. Finalizing the catalog finalizes each registry, checks that
//! operator names stay unique once canonicalised, and groups operators into
//! categories for listing.

use crate::declaration::{CallDeclaration, FormatterDeclaration, Implementation};
use crate::error::{DeclarationError, Result};
use crate::registry::OperatorRegistry;
use indexmap::IndexMap;
use std::collections::HashMap;

/// Lowercase an operator name and drop everything outside `[a-z0-9_]`
pub fn canonical_name(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect()
}

/// Operators sharing a category, sorted case-insensitively
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// `None` holds operators declared without a category
    pub name: Option<String>,
    pub operators: Vec<String>,
}

/// Implementation counts across a catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub operators: usize,
    pub manual_implementations: usize,
    pub total_implementations: usize,
}

impl std::fmt::Display for CatalogStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} operators, {} manual implementations, {} callable signatures",
            self.operators, self.manual_implementations, self.total_implementations
        )
    }
}

/// Every operator registry of a build
#[derive(Debug, Clone)]
pub struct OperatorCatalog<B, F> {
    operators: IndexMap<String, OperatorRegistry<B, F>>,
    categories: Vec<Category>,
    finalized: bool,
}

impl<B, F> Default for OperatorCatalog<B, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B, F> OperatorCatalog<B, F> {
    pub fn new() -> Self {
        Self {
            operators: IndexMap::new(),
            categories: Vec::new(),
            finalized: false,
        }
    }

    /// Route a declaration to its operator, creating the operator on first
    /// sight. Returns the declaration's index within the operator.
    pub fn declare(&mut self, declaration: CallDeclaration<B>) -> Result<usize>
    where
        B: Implementation,
    {
        let location = declaration.location.clone();
        let registry = self
            .operators
            .entry(declaration.operator.clone())
            .or_insert_with(|| OperatorRegistry::new(declaration.operator.clone()));

        registry.declare(declaration).map_err(|error| match &location {
            Some(location) => error.with_location(location),
            None => error,
        })
    }

    /// Attach a formatter to an operator that has already been declared
    pub fn declare_formatter(&mut self, formatter: FormatterDeclaration<F>) -> Result<()> {
        match self.operators.get_mut(&formatter.operator) {
            Some(registry) => registry.declare_formatter(formatter),
            None => Err(DeclarationError::UnknownOperator {
                operator: formatter.operator,
                location: formatter.location,
            }),
        }
    }

    /// Finalize every operator. Stops at the first failing operator.
    pub fn finalize(&mut self) -> Result<()> {
        self.operators.sort_keys();

        {
            let mut canonical: HashMap<String, &str> = HashMap::new();
            for name in self.operators.keys() {
                if let Some(first) = canonical.insert(canonical_name(name), name) {
                    return Err(DeclarationError::NameCollision {
                        first: first.to_string(),
                        second: name.clone(),
                        canonical: canonical_name(name),
                    });
                }
            }
        }

        let mut categories: IndexMap<Option<String>, Vec<String>> = IndexMap::new();
        categories.insert(None, Vec::new());

        for (name, registry) in self.operators.iter_mut() {
            registry.finalize()?;

            if registry.arity() > 0 && registry.examples().next().is_none() {
                tracing::warn!(operator = %name, "operator does not have any examples");
            }

            categories
                .entry(registry.category().map(str::to_string))
                .or_default()
                .push(name.clone());
        }

        self.categories = categories
            .into_iter()
            .map(|(name, mut operators)| {
                operators.sort_by_key(|op| op.to_lowercase());
                Category { name, operators }
            })
            .collect();
        self.categories.sort_by(|a, b| match (&a.name, &b.name) {
            (None, None) => std::cmp::Ordering::Equal,
            (None, Some(_)) => std::cmp::Ordering::Less,
            (Some(_), None) => std::cmp::Ordering::Greater,
            (Some(a), Some(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        });

        self.finalized = true;

        tracing::debug!(stats = %self.stats(), "finalized operator catalog");
        Ok(())
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn get(&self, name: &str) -> Option<&OperatorRegistry<B, F>> {
        self.operators.get(name)
    }

    /// Registries sorted by name once finalized, in discovery order before
    pub fn operators(&self) -> impl Iterator<Item = &OperatorRegistry<B, F>> {
        self.operators.values()
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Uncategorised operators first, then categories alphabetically.
    /// Empty until finalized.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            operators: self.operators.len(),
            manual_implementations: self.operators.values().map(|r| r.manual_count()).sum(),
            total_implementations: self.operators.values().map(|r| r.total_count()).sum(),
        }
    }

    /// Hand the finalized registries over to a runtime
    pub fn into_registries(self) -> Result<(Vec<OperatorRegistry<B, F>>, Vec<Category>)> {
        if let Some(open) = self.operators.values().find(|r| !r.is_finalized()) {
            return Err(DeclarationError::NotFinalized {
                operator: open.name().to_string(),
            });
        }
        Ok((self.operators.into_values().collect(), self.categories))
    }
}
