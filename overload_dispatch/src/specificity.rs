//! Specificity: ordering declared types and picking the most specific
//! candidate of a set.
//!
//! "More specific" means "is a subtype of". Only affirmative oracle answers
//! create ordering constraints; incomparable or undecidable pairs keep the
//! order in which they were first seen.

use std::collections::BTreeSet;

use tracing::warn;

use crate::group::{CandidateId, OverloadGroup};
use crate::types::SubtypeOracle;

/// Order `types` from most specific to least specific.
///
/// Builds the "is a subtype of" graph (`a -> b` when `a <: b`, so `a` comes
/// first) and topologically sorts it. Among types that are ready at the same
/// time the one with the lowest input position goes first, so incomparable
/// types stay in input order. Types caught in an oracle cycle are appended in
/// input order.
pub fn order_most_specific_first<O>(oracle: &O, types: &[O::Type]) -> Vec<O::Type>
where
    O: SubtypeOracle + ?Sized,
{
    let n = types.len();
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut in_degree = vec![0usize; n];

    for i in 0..n {
        for j in (i + 1)..n {
            if oracle.subtype(&types[i], &types[j]).is_yes() {
                successors[i].push(j);
                in_degree[j] += 1;
            } else if oracle.subtype(&types[j], &types[i]).is_yes() {
                successors[j].push(i);
                in_degree[i] += 1;
            }
        }
    }

    let mut ready: BTreeSet<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut placed = vec![false; n];
    let mut order = Vec::with_capacity(n);

    while let Some(next) = ready.pop_first() {
        placed[next] = true;
        order.push(next);
        for &succ in &successors[next] {
            in_degree[succ] -= 1;
            if in_degree[succ] == 0 {
                ready.insert(succ);
            }
        }
    }

    if order.len() < n {
        let stuck: Vec<String> = (0..n)
            .filter(|&i| !placed[i])
            .map(|i| types[i].to_string())
            .collect();
        warn!(types = ?stuck, "subtype oracle reported a cycle; keeping input order");
        order.extend((0..n).filter(|&i| !placed[i]));
    }

    order.into_iter().map(|i| types[i].clone()).collect()
}

/// Pointwise dominance: every parameter type of `a` is a subtype of, or equal
/// to, the corresponding parameter type of `b`.
pub fn dominates<O>(
    oracle: &O,
    group: &OverloadGroup<O::Type>,
    a: CandidateId,
    b: CandidateId,
) -> bool
where
    O: SubtypeOracle + ?Sized,
{
    group
        .signature(a)
        .iter()
        .zip(group.signature(b))
        .all(|(ta, tb)| oracle.is_subtype_or_equal(ta, tb))
}

/// The most specific member of `ids`.
///
/// Linear incumbent scan: the first id is the incumbent, and a later id
/// replaces it only when it dominates the incumbent. With mutually
/// incomparable maximal members the earliest of them wins; a warning is
/// logged because a validated overload group should never get here.
pub fn most_specific<O>(
    oracle: &O,
    group: &OverloadGroup<O::Type>,
    ids: &[CandidateId],
) -> Option<CandidateId>
where
    O: SubtypeOracle + ?Sized,
{
    let (&first, rest) = ids.split_first()?;
    let mut incumbent = first;
    for &candidate in rest {
        if dominates(oracle, group, candidate, incumbent) {
            incumbent = candidate;
        }
    }

    if let Some(&rival) = ids
        .iter()
        .find(|&&other| other != incumbent && !dominates(oracle, group, incumbent, other))
    {
        warn!(
            group = group.name(),
            chosen = %group.candidate(incumbent),
            rival = %group.candidate(rival),
            "most specific candidate does not dominate the whole set"
        );
    }

    Some(incumbent)
}
