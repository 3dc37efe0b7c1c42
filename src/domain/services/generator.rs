//! Cartesian product of an attribute set

use crate::domain::aggregates::{Assignment, Attribute, AttributeSet};

/// Every assignment of one value per attribute.
///
/// Depth-first: the first attribute varies slowest, the last one fastest.
/// An empty set yields no assignments, as does any attribute without values.
pub fn generate(set: &AttributeSet) -> Vec<Assignment> {
    if set.is_empty() { return vec![]; }
    let mut out = Vec::with_capacity(combination_count(set));
    expand(set.attributes(), &mut Assignment::new(), &mut out);
    out
}

/// Size of [`generate`]'s output without building it. Saturates on overflow.
pub fn combination_count(set: &AttributeSet) -> usize {
    if set.is_empty() { return 0; }
    set.attributes().iter().fold(1usize, |acc, a| acc.saturating_mul(a.values().len()))
}

fn expand(rest: &[Attribute], current: &mut Assignment, out: &mut Vec<Assignment>) {
    let Some((head, tail)) = rest.split_first() else {
        out.push(current.clone());
        return;
    };
    for value in head.values() {
        current.push(head.name().clone(), value.clone());
        expand(tail, current, out);
        current.pop();
    }
}
