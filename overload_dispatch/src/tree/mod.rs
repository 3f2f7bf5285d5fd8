//! Dispatch trees.
//!
//! A dispatch tree discriminates the candidates of one overload group by the
//! erased runtime types of the actual arguments. Every internal node tests a
//! single parameter index against an ordered list of declared types
//! (most specific first); every leaf holds the one candidate to call, or
//! nothing when the branch is unreachable.
//!
//! Nodes live in an arena owned by the tree. Parent links and incoming edge
//! types are kept as plain indices/values for diagnostics; the tree has no
//! reference cycles and is never mutated after [`TreeBuilder::build`] returns.
//!
//! # Sub-modules
//!
//! - `builder`: the recursive `split` procedure
//! - `display`: human-readable tree dump

mod builder;
mod display;

pub use builder::TreeBuilder;

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::candidate::Candidate;
use crate::group::{CandidateId, OverloadGroup};
use crate::types::SubtypeOracle;

/// Parameter indices already used to discriminate on the path to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TestedSet(BTreeSet<usize>);

impl TestedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of this set with `index` added.
    pub fn with(&self, index: usize) -> Self {
        let mut next = self.0.clone();
        next.insert(index);
        Self(next)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Display for TestedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = self.iter().map(|i| i.to_string()).collect();
        write!(f, "{{{}}}", items.join(", "))
    }
}

/// Index of a node in its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// The discrimination performed at an internal node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Branch<T> {
    pub dispatch_index: usize,
    /// `(edge type, child)` pairs, most specific edge type first.
    pub children: Vec<(T, NodeId)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchNode<T> {
    candidates: Vec<CandidateId>,
    tested: TestedSet,
    parent: Option<NodeId>,
    edge_type: Option<T>,
    branch: Option<Branch<T>>,
}

impl<T> DispatchNode<T> {
    pub(crate) fn new(
        candidates: Vec<CandidateId>,
        tested: TestedSet,
        parent: Option<NodeId>,
        edge_type: Option<T>,
    ) -> Self {
        Self {
            candidates,
            tested,
            parent,
            edge_type,
            branch: None,
        }
    }

    /// Surviving candidates at this node, in group order.
    pub fn candidates(&self) -> &[CandidateId] {
        &self.candidates
    }

    pub fn tested(&self) -> &TestedSet {
        &self.tested
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Type tested on the edge that led here (`None` at the root).
    pub fn edge_type(&self) -> Option<&T> {
        self.edge_type.as_ref()
    }

    pub fn branch(&self) -> Option<&Branch<T>> {
        self.branch.as_ref()
    }

    pub fn dispatch_index(&self) -> Option<usize> {
        self.branch.as_ref().map(|b| b.dispatch_index)
    }

    /// Children in most-specific-first order; empty at leaves.
    pub fn children(&self) -> &[(T, NodeId)] {
        self.branch.as_ref().map_or(&[], |b| b.children.as_slice())
    }

    /// Exactly one candidate remains.
    pub fn is_leaf(&self) -> bool {
        self.branch.is_none() && self.candidates.len() == 1
    }

    /// No candidate is applicable; reaching this node at runtime is a
    /// dispatch miss.
    pub fn is_empty(&self) -> bool {
        self.branch.is_none() && self.candidates.is_empty()
    }

    /// The candidate to call when this node is a leaf.
    pub fn target(&self) -> Option<CandidateId> {
        if self.branch.is_none() {
            self.candidates.first().copied()
        } else {
            None
        }
    }
}

/// The compiled dispatch procedure of one overload group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchTree<T> {
    group: OverloadGroup<T>,
    nodes: Vec<DispatchNode<T>>,
    root: NodeId,
}

impl<T> DispatchTree<T> {
    pub(crate) fn from_parts(
        group: OverloadGroup<T>,
        nodes: Vec<DispatchNode<T>>,
        root: NodeId,
    ) -> Self {
        Self { group, nodes, root }
    }

    pub fn name(&self) -> &str {
        self.group.name()
    }

    pub fn arity(&self) -> usize {
        self.group.arity()
    }

    pub fn group(&self) -> &OverloadGroup<T> {
        &self.group
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &DispatchNode<T> {
        self.node(self.root)
    }

    pub fn node(&self, id: NodeId) -> &DispatchNode<T> {
        &self.nodes[id.0]
    }

    /// All nodes in construction (depth-first, most-specific-first) order.
    pub fn nodes(&self) -> &[DispatchNode<T>] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn candidate(&self, id: CandidateId) -> &Candidate<T> {
        self.group.candidate(id)
    }

    /// Number of type tests on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.branch.is_none())
            .map(|n| n.tested.len())
            .max()
            .unwrap_or(0)
    }

    /// Leaf and empty nodes in depth-first order.
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_leaves(self.root, &mut out);
        out
    }

    fn collect_leaves(&self, id: NodeId, out: &mut Vec<NodeId>) {
        let node = self.node(id);
        match &node.branch {
            None => out.push(id),
            Some(branch) => {
                for (_, child) in &branch.children {
                    self.collect_leaves(*child, out);
                }
            }
        }
    }

    /// Edge types from the root down to `id`, as `(dispatch index, type)`.
    pub fn path_to(&self, id: NodeId) -> Vec<(usize, &T)> {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            let index = self
                .node(parent)
                .dispatch_index()
                .unwrap_or_default();
            if let Some(edge) = self.node(current).edge_type() {
                path.push((index, edge));
            }
            current = parent;
        }
        path.reverse();
        path
    }
}

impl<T: Clone + PartialEq + fmt::Debug + fmt::Display> DispatchTree<T> {
    /// Simulate runtime dispatch on erased argument types.
    ///
    /// Follows the first child whose edge type the argument at the node's
    /// dispatch index is a subtype of (or equal to). Returns `None` on a
    /// dispatch miss or when `arg_types` has the wrong length.
    pub fn select<O>(&self, oracle: &O, arg_types: &[T]) -> Option<&Candidate<T>>
    where
        O: SubtypeOracle<Type = T> + ?Sized,
    {
        if arg_types.len() != self.arity() {
            return None;
        }
        let mut current = self.root_node();
        while let Some(branch) = &current.branch {
            let arg = &arg_types[branch.dispatch_index];
            let (_, next) = branch
                .children
                .iter()
                .find(|(edge, _)| oracle.is_subtype_or_equal(arg, edge))?;
            current = self.node(*next);
        }
        current.target().map(|id| self.candidate(id))
    }
}
