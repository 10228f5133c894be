//! Permutation expansion
//!
//! Expands one declaration into every signature its modifier tags make
//! reachable:
//!
//! 1. the declared signature itself, with identity coercions;
//! 2. for `reversable` declarations, the swapped signature;
//! 3. for each cast family tag (`bigint_cast`, then `real_cast`), every
//!    substitution of family members at the anchor-typed positions, in
//!    ordinal order, each followed by its swapped form when the declaration
//!    is also reversible.
//!
//! Candidates already claimed for the operator, or already proposed earlier
//! in the same expansion, are skipped. The expander never fails; deciding
//! whether a collision is an error is the registry's job.

use crate::declaration::{CallDeclaration, Tag};
use crate::lattice::{CastFamily, Coercion};
use crate::permutation::{ArgumentBinding, Permutation};
use crate::types::{TypeSignature, ValueType};
use indexmap::IndexMap;

/// Whether a signature was written by hand or derived by expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimOrigin {
    Declared,
    Derived,
}

/// Owner of a claimed signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Claim {
    pub declaration: usize,
    pub origin: ClaimOrigin,
}

/// Signatures owned so far by an operator, split by origin
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimMap {
    claims: IndexMap<TypeSignature, Claim>,
}

impl ClaimMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, signature: &[ValueType]) -> bool {
        self.claims.contains_key(signature)
    }

    pub fn get(&self, signature: &[ValueType]) -> Option<&Claim> {
        self.claims.get(signature)
    }

    /// Claim a hand-written signature. Returns the previous owner when the
    /// signature was already declared.
    pub fn claim_declared(
        &mut self,
        signature: TypeSignature,
        declaration: usize,
    ) -> Result<(), Claim> {
        match self.claims.get(&signature) {
            Some(existing) if existing.origin == ClaimOrigin::Declared => Err(*existing),
            _ => {
                self.claims.insert(
                    signature,
                    Claim {
                        declaration,
                        origin: ClaimOrigin::Declared,
                    },
                );
                Ok(())
            }
        }
    }

    /// Claim a derived signature. Returns false, leaving the map untouched,
    /// if anything already owns it.
    pub fn claim_derived(&mut self, signature: TypeSignature, declaration: usize) -> bool {
        if self.claims.contains_key(&signature) {
            return false;
        }
        self.claims.insert(
            signature,
            Claim {
                declaration,
                origin: ClaimOrigin::Derived,
            },
        );
        true
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypeSignature, &Claim)> {
        self.claims.iter()
    }

    pub fn declared_count(&self) -> usize {
        self.claims
            .values()
            .filter(|claim| claim.origin == ClaimOrigin::Declared)
            .count()
    }
}

/// Expands a single declaration of an operator
pub struct PermutationExpander<'d, B> {
    index: usize,
    declaration: &'d CallDeclaration<B>,
}

impl<'d, B> PermutationExpander<'d, B> {
    /// `index` is the position of `declaration` within its registry
    pub fn new(index: usize, declaration: &'d CallDeclaration<B>) -> Self {
        Self { index, declaration }
    }

    /// Propose every permutation of the declaration that `claims` does not
    /// already own. The identity permutation is always first.
    pub fn expand(&self, claims: &ClaimMap) -> IndexMap<TypeSignature, Permutation> {
        let mut proposed = IndexMap::new();
        let reversible = self.declaration.has_tag(Tag::Reversible);

        let identity = self.identity();
        proposed.insert(identity.signature.clone(), identity.clone());

        if reversible {
            self.offer(identity.reversed(), claims, &mut proposed);
        }

        for family in CastFamily::ALL {
            if !self.declaration.has_tag(family.tag()) {
                continue;
            }

            for candidate in self.cast_candidates(family) {
                if candidate == self.declaration.params
                    || claims.contains(candidate.types())
                    || proposed.contains_key(&candidate)
                {
                    continue;
                }

                let permutation = self.cast_permutation(family, &candidate);
                if reversible {
                    let reversed = permutation.reversed();
                    self.offer(permutation, claims, &mut proposed);
                    self.offer(reversed, claims, &mut proposed);
                } else {
                    self.offer(permutation, claims, &mut proposed);
                }
            }
        }

        proposed
    }

    fn offer(
        &self,
        permutation: Permutation,
        claims: &ClaimMap,
        proposed: &mut IndexMap<TypeSignature, Permutation>,
    ) {
        if claims.contains(permutation.signature.types())
            || proposed.contains_key(&permutation.signature)
        {
            tracing::trace!(
                operator = %self.declaration.operator,
                signature = %permutation.signature,
                "skipping already claimed permutation"
            );
            return;
        }

        tracing::trace!(
            operator = %self.declaration.operator,
            signature = %permutation.signature,
            provenance = %permutation.provenance_label(),
            "derived permutation"
        );
        proposed.insert(permutation.signature.clone(), permutation);
    }

    fn identity(&self) -> Permutation {
        let plan = self
            .declaration
            .params
            .types()
            .iter()
            .enumerate()
            .map(|(slot, ty)| ArgumentBinding::identity(*ty, slot))
            .collect();

        Permutation::from_plan(
            self.index,
            plan,
            Vec::new(),
            self.stack_ref(),
            self.echo_expression(),
        )
    }

    /// Every substitution of family members at the anchor positions,
    /// sorted by ordinal tuple. Includes the declared signature itself.
    fn cast_candidates(&self, family: CastFamily) -> Vec<TypeSignature> {
        let anchor = family.anchor();
        let mut candidates: Vec<Vec<ValueType>> = vec![Vec::new()];

        for declared in self.declaration.params.types() {
            let choices: &[ValueType] = if *declared == anchor {
                family.members()
            } else {
                std::slice::from_ref(declared)
            };

            candidates = candidates
                .into_iter()
                .flat_map(|prefix| {
                    choices.iter().map(move |choice| {
                        let mut next = prefix.clone();
                        next.push(*choice);
                        next
                    })
                })
                .collect();
        }

        let mut candidates: Vec<TypeSignature> =
            candidates.into_iter().map(TypeSignature::new).collect();
        candidates.sort();
        candidates
    }

    fn cast_permutation(&self, family: CastFamily, candidate: &TypeSignature) -> Permutation {
        let plan = self
            .declaration
            .params
            .types()
            .iter()
            .zip(candidate.types())
            .enumerate()
            .map(|(slot, (declared, runtime))| ArgumentBinding {
                target: *declared,
                runtime: *runtime,
                source_slot: slot,
                coercion: if *declared == family.anchor() {
                    family.coercion_from(*runtime)
                } else {
                    Coercion::Identity
                },
            })
            .collect();

        Permutation::from_plan(
            self.index,
            plan,
            vec![family.provenance()],
            self.stack_ref(),
            self.echo_expression(),
        )
    }

    fn stack_ref(&self) -> bool {
        self.declaration.has_tag(Tag::StackRef)
    }

    fn echo_expression(&self) -> bool {
        !self.declaration.has_tag(Tag::NoExpr)
    }
}
