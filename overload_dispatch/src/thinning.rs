//! Thinning: collapse candidates that no remaining test can tell apart.
//!
//! Two candidates are equivalent when their declared types are exactly equal
//! (not merely mutual subtypes) at every parameter index that has not been
//! tested yet. Each equivalence class is replaced by its most specific member,
//! so the tree never branches again on a dimension that cannot separate them
//! and no duplicate leaves survive.

use crate::group::{CandidateId, OverloadGroup};
use crate::specificity::most_specific;
use crate::tree::TestedSet;
use crate::types::SubtypeOracle;

/// Do `a` and `b` agree exactly on every untested parameter?
pub fn equivalent_on_untested<T: PartialEq>(
    group: &OverloadGroup<T>,
    a: CandidateId,
    b: CandidateId,
    tested: &TestedSet,
) -> bool {
    (0..group.arity())
        .filter(|index| !tested.contains(*index))
        .all(|index| group.param_type(a, index) == group.param_type(b, index))
}

/// Replace every equivalence class of `ids` by its most specific member.
///
/// Classes are kept in the order of their first member.
pub fn thin<O>(
    oracle: &O,
    group: &OverloadGroup<O::Type>,
    ids: &[CandidateId],
    tested: &TestedSet,
) -> Vec<CandidateId>
where
    O: SubtypeOracle + ?Sized,
{
    let mut classes: Vec<Vec<CandidateId>> = Vec::new();
    for &id in ids {
        match classes
            .iter_mut()
            .find(|class| equivalent_on_untested(group, class[0], id, tested))
        {
            Some(class) => class.push(id),
            None => classes.push(vec![id]),
        }
    }

    classes
        .iter()
        .filter_map(|class| most_specific(oracle, group, class))
        .collect()
}
