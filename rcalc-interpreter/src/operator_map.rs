//! Operator lookup by name
//!
//! The operator map owns every finalized registry and resolves user-typed
//! names to them. Names are canonicalised first (`Add`, `add` and `ADD!`
//! all reach the same operator). The name index is either an ordered map
//! or a minimal perfect hash over the canonical names; both answer the
//! same queries.

use crate::body::{OpBody, OpFormatter};
use crate::dispatch::{Dispatcher, Registry};
use crate::error::{EvalError, RuntimeError};
use crate::stack::RpnStack;
use crate::value::Value;
use rcalc_ops::{canonical_name, CatalogStats, Category, DeclarationError, OperatorCatalog};
use rustc_hash::FxHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// Catalog instantiated with runtime bodies and formatters
pub type Catalog = OperatorCatalog<OpBody, OpFormatter>;

/// How operator names are indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LookupStrategy {
    #[default]
    Ordered,
    PerfectHash,
}

#[derive(Debug, Clone)]
enum NameIndex {
    Ordered(BTreeMap<String, usize>),
    PerfectHash(PerfectHashIndex),
}

impl NameIndex {
    fn build(names: &[String], strategy: LookupStrategy) -> Self {
        let ordered = || {
            NameIndex::Ordered(
                names
                    .iter()
                    .enumerate()
                    .map(|(position, name)| (name.clone(), position))
                    .collect(),
            )
        };

        match strategy {
            LookupStrategy::Ordered => ordered(),
            LookupStrategy::PerfectHash => match PerfectHashIndex::build(names) {
                Some(index) => NameIndex::PerfectHash(index),
                None => {
                    tracing::warn!(
                        operators = names.len(),
                        "no perfect hash found for operator names, using ordered lookup"
                    );
                    ordered()
                }
            },
        }
    }

    fn get(&self, canonical: &str) -> Option<usize> {
        match self {
            NameIndex::Ordered(map) => map.get(canonical).copied(),
            NameIndex::PerfectHash(index) => index.get(canonical),
        }
    }

    fn strategy(&self) -> LookupStrategy {
        match self {
            NameIndex::Ordered(_) => LookupStrategy::Ordered,
            NameIndex::PerfectHash(_) => LookupStrategy::PerfectHash,
        }
    }
}

/// Hash-and-displace minimal perfect hash.
///
/// Keys are grouped into buckets by an unseeded hash; each bucket then gets
/// the first seed that sends all of its keys to free slots. Lookups hash
/// twice and confirm the key stored in the slot.
#[derive(Debug, Clone)]
struct PerfectHashIndex {
    seeds: Vec<u64>,
    slots: Vec<Option<(String, usize)>>,
}

const MAX_SEED: u64 = 1 << 16;

fn hash_with(seed: u64, key: &str) -> u64 {
    let mut hasher = FxHasher::default();
    seed.hash(&mut hasher);
    key.hash(&mut hasher);
    hasher.finish()
}

impl PerfectHashIndex {
    fn build(keys: &[String]) -> Option<Self> {
        let size = keys.len();
        if size == 0 {
            return Some(Self {
                seeds: Vec::new(),
                slots: Vec::new(),
            });
        }

        let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); size];
        for (position, key) in keys.iter().enumerate() {
            buckets[(hash_with(0, key) % size as u64) as usize].push(position);
        }

        let mut order: Vec<usize> = (0..size).collect();
        order.sort_by_key(|bucket| std::cmp::Reverse(buckets[*bucket].len()));

        let mut seeds = vec![0; size];
        let mut slots: Vec<Option<(String, usize)>> = vec![None; size];

        for bucket in order {
            let members = &buckets[bucket];
            if members.is_empty() {
                break;
            }

            let mut placed = None;
            for seed in 1..MAX_SEED {
                let mut targets: Vec<usize> = members
                    .iter()
                    .map(|position| (hash_with(seed, &keys[*position]) % size as u64) as usize)
                    .collect();
                if targets.iter().any(|slot| slots[*slot].is_some()) {
                    continue;
                }
                targets.sort_unstable();
                targets.dedup();
                if targets.len() == members.len() {
                    placed = Some(seed);
                    break;
                }
            }

            let seed = placed?;
            seeds[bucket] = seed;
            for position in members {
                let slot = (hash_with(seed, &keys[*position]) % size as u64) as usize;
                slots[slot] = Some((keys[*position].clone(), *position));
            }
        }

        Some(Self { seeds, slots })
    }

    fn get(&self, key: &str) -> Option<usize> {
        let size = self.slots.len() as u64;
        if size == 0 {
            return None;
        }
        let seed = self.seeds[(hash_with(0, key) % size) as usize];
        match &self.slots[(hash_with(seed, key) % size) as usize] {
            Some((stored, position)) if stored == key => Some(*position),
            _ => None,
        }
    }
}

/// Every operator of a build, ready to evaluate
#[derive(Debug)]
pub struct OperatorMap {
    registries: Vec<Registry>,
    categories: Vec<Category>,
    stats: CatalogStats,
    index: NameIndex,
}

impl OperatorMap {
    /// Finalize the catalog if needed and index its operators
    pub fn new(mut catalog: Catalog, strategy: LookupStrategy) -> Result<Self, DeclarationError> {
        if !catalog.is_finalized() {
            catalog.finalize()?;
        }

        let stats = catalog.stats();
        let (registries, categories) = catalog.into_registries()?;
        let names: Vec<String> = registries
            .iter()
            .map(|registry| canonical_name(registry.name()))
            .collect();
        let index = NameIndex::build(&names, strategy);

        tracing::debug!(
            operators = registries.len(),
            strategy = ?index.strategy(),
            "built operator map"
        );

        Ok(Self {
            registries,
            categories,
            stats,
            index,
        })
    }

    /// The strategy actually in use
    pub fn strategy(&self) -> LookupStrategy {
        self.index.strategy()
    }

    pub fn has(&self, name: &str) -> bool {
        self.operator(name).is_some()
    }

    pub fn operator(&self, name: &str) -> Option<&Registry> {
        self.index
            .get(&canonical_name(name))
            .and_then(|position| self.registries.get(position))
    }

    pub fn dispatcher(&self, name: &str) -> Result<Dispatcher<'_>, RuntimeError> {
        let registry = self
            .operator(name)
            .ok_or_else(|| RuntimeError::UnknownOperator {
                name: name.to_string(),
            })?;
        Dispatcher::new(registry).map_err(|error| RuntimeError::custom(error.to_string()))
    }

    /// Evaluate operator `name` against `stack`, returning the dispatch
    /// index that was taken
    pub fn evaluate(&self, name: &str, stack: &mut RpnStack) -> Result<usize, RuntimeError> {
        self.dispatcher(name)?.evaluate(stack)
    }

    /// Operators sorted by name
    pub fn operators(&self) -> impl Iterator<Item = &Registry> {
        self.registries.iter()
    }

    pub fn len(&self) -> usize {
        self.registries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registries.is_empty()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn stats(&self) -> CatalogStats {
        self.stats
    }

    /// One stack per declared example of `name`, arguments pushed in order
    pub fn example_stacks(&self, name: &str) -> Result<Vec<RpnStack>, EvalError> {
        let registry = self
            .operator(name)
            .ok_or_else(|| RuntimeError::UnknownOperator {
                name: name.to_string(),
            })?;

        registry
            .examples()
            .map(|arguments| -> Result<RpnStack, EvalError> {
                let mut stack = RpnStack::new();
                for argument in arguments {
                    stack.push_value(Value::parse(argument)?);
                }
                Ok(stack)
            })
            .collect()
    }
}
