//! Code emission for a single combined entry point.
//!
//! [`emit_dispatch`] walks a [`DispatchTree`] depth-first and drives a
//! [`DispatchEmitter`] backend. Internal nodes become a chain of runtime type
//! tests, most specific first, each falling through to the next sibling on
//! failure; leaves become downcasts, a call and a return. Whatever is left
//! over jumps to a caller-supplied "no match" label, which the backend turns
//! into its own "no applicable method" failure.
//!
//! [`CombinedSignature`] is the metadata the entry point itself needs.

mod listing;

pub use listing::{DispatchInstr, InstrListing};

use serde::Serialize;

use crate::candidate::Candidate;
use crate::group::{CandidateId, OverloadGroup};
use crate::tree::{DispatchTree, NodeId};
use crate::types::SubtypeOracle;

/// Backend callbacks, invoked in deterministic tree order.
///
/// Arguments are identified by their position in the combined entry point.
pub trait DispatchEmitter<T> {
    type Label: Clone;

    fn new_label(&mut self) -> Self::Label;
    fn bind_label(&mut self, label: &Self::Label);
    /// Test the runtime type of argument `arg` against `ty`; jump to
    /// `on_fail` when it is not a `ty`.
    fn emit_type_test(&mut self, arg: usize, ty: &T, on_fail: &Self::Label);
    fn emit_downcast(&mut self, arg: usize, ty: &T);
    fn emit_call(&mut self, candidate: &Candidate<T>);
    fn emit_return(&mut self);
    fn emit_no_match_jump(&mut self, label: &Self::Label);
}

/// Emit the whole tree. Every path ends in either a return or a jump to
/// `no_match`; the caller binds `no_match`.
pub fn emit_dispatch<T, E>(tree: &DispatchTree<T>, emitter: &mut E, no_match: &E::Label)
where
    E: DispatchEmitter<T> + ?Sized,
{
    emit_node(tree, tree.root(), emitter, no_match);
}

fn emit_node<T, E>(tree: &DispatchTree<T>, id: NodeId, emitter: &mut E, no_match: &E::Label)
where
    E: DispatchEmitter<T> + ?Sized,
{
    let node = tree.node(id);
    if let Some(branch) = node.branch() {
        for (ty, child) in &branch.children {
            let next = emitter.new_label();
            emitter.emit_type_test(branch.dispatch_index, ty, &next);
            emit_node(tree, *child, emitter, no_match);
            emitter.bind_label(&next);
        }
        emitter.emit_no_match_jump(no_match);
        return;
    }

    match node.target() {
        Some(target) => {
            for (arg, ty) in tree.group().signature(target).iter().enumerate() {
                emitter.emit_downcast(arg, ty);
            }
            emitter.emit_call(tree.candidate(target));
            emitter.emit_return();
        }
        None => emitter.emit_no_match_jump(no_match),
    }
}

/// Signature of the combined entry point standing for a whole group.
///
/// When the group has a principal member the entry point takes over that
/// member's return type and parameter types. Otherwise both are joins across
/// the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedSignature<T> {
    /// Return type of the principal member, or the join of all return types
    /// widened to the top type when they disagree.
    pub return_type: T,
    /// Union of declared thrown types, in first-occurrence order.
    pub throws: Vec<T>,
    /// Parameter types of the principal member, or the per-position join.
    pub domain: Vec<T>,
    /// The member the signature was taken from, if any.
    pub principal: Option<CandidateId>,
}

impl<T: Clone + PartialEq> CombinedSignature<T> {
    pub fn of<O>(oracle: &O, group: &OverloadGroup<T>) -> Self
    where
        O: SubtypeOracle<Type = T> + ?Sized,
    {
        let mut throws: Vec<T> = Vec::new();
        for thrown in group.candidates().iter().flat_map(|c| c.throws()) {
            if !throws.contains(thrown) {
                throws.push(thrown.clone());
            }
        }

        let principal = group.principal_member(oracle);
        let (return_type, domain) = match principal {
            Some(id) => (
                group.candidate(id).return_type().clone(),
                group.signature(id).to_vec(),
            ),
            None => {
                let returns: Vec<&T> = group.candidates().iter().map(|c| c.return_type()).collect();
                let domain = (0..group.arity())
                    .map(|index| {
                        let column: Vec<&T> =
                            group.ids().map(|id| group.param_type(id, index)).collect();
                        join(oracle, &column)
                    })
                    .collect();
                (join(oracle, &returns), domain)
            }
        };

        Self {
            return_type,
            throws,
            domain,
            principal,
        }
    }
}

/// The first type every other type is a subtype of (or equal to), else top.
fn join<O>(oracle: &O, types: &[&O::Type]) -> O::Type
where
    O: SubtypeOracle + ?Sized,
{
    types
        .iter()
        .find(|upper| types.iter().all(|ty| oracle.is_subtype_or_equal(ty, upper)))
        .map(|upper| (*upper).clone())
        .unwrap_or_else(|| oracle.top())
}
