//! Merges freshly generated candidates with prior working state

use std::collections::{HashMap, HashSet};
use crate::domain::aggregates::{Assignment, Combination, CombinationKey, SeedCombination};
use crate::domain::value_objects::Price;

/// Reconciled records plus where each one came from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub combinations: Vec<Combination>,
    pub carried_over: usize,
    pub seeded: usize,
    pub created: usize,
    pub dropped: usize,
}

pub fn reconcile(
    candidates: &[Assignment],
    existing: &[Combination],
    seed: &[SeedCombination],
    base_price: Price,
) -> Vec<Combination> {
    reconcile_detailed(candidates, existing, seed, base_price).combinations
}

/// One record per distinct candidate, in candidate order. For each candidate:
///
/// 1. an existing record with the same key keeps all its editable fields;
/// 2. a seed entry with the same key initializes it, selected;
/// 3. the first existing record (list order) the candidate is a projection of
///    keeps its fields, which covers attributes being removed;
/// 4. anything else gets defaults at `base_price`, selected.
pub fn reconcile_detailed(
    candidates: &[Assignment],
    existing: &[Combination],
    seed: &[SeedCombination],
    base_price: Price,
) -> Reconciliation {
    let mut by_key: HashMap<CombinationKey, &Combination> = HashMap::with_capacity(existing.len());
    for record in existing {
        by_key.entry(record.key()).or_insert(record);
    }
    let mut seeds: HashMap<CombinationKey, &SeedCombination> = HashMap::with_capacity(seed.len());
    for entry in seed {
        seeds.entry(entry.assignment.key()).or_insert(entry);
    }

    let mut result = Reconciliation::default();
    let mut emitted: HashSet<CombinationKey> = HashSet::with_capacity(candidates.len());
    for candidate in candidates {
        let key = candidate.key();
        if !emitted.insert(key.clone()) { continue; }

        let record = if let Some(prev) = by_key.get(&key) {
            result.carried_over += 1;
            inherit(candidate, prev)
        } else if let Some(entry) = seeds.get(&key) {
            result.seeded += 1;
            entry.to_combination(candidate.clone(), base_price)
        } else if let Some(prev) = existing.iter().find(|c| candidate.is_projection_of(&c.assignment)) {
            result.carried_over += 1;
            inherit(candidate, prev)
        } else {
            result.created += 1;
            Combination::with_defaults(candidate.clone(), base_price)
        };
        result.combinations.push(record);
    }

    result.dropped = by_key.keys().filter(|k| !emitted.contains(*k)).count();
    result
}

fn inherit(candidate: &Assignment, prev: &Combination) -> Combination {
    Combination { assignment: candidate.clone(), ..prev.clone() }
}
