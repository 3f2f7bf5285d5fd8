//! Recursive construction of a [`DispatchTree`].

use tracing::trace;

use super::{Branch, DispatchNode, DispatchTree, NodeId, TestedSet};
use crate::config::{DispatchConfig, IndexPolicy};
use crate::error::{OverloadError, OverloadResult};
use crate::group::{CandidateId, OverloadGroup};
use crate::specificity::{most_specific, order_most_specific_first};
use crate::thinning::thin;
use crate::types::SubtypeOracle;

/// Candidates bucketed by their declared type at one parameter index.
#[derive(Debug)]
struct ParamBuckets<T> {
    index: usize,
    /// Distinct declared types with their members, in first-occurrence order.
    buckets: Vec<(T, Vec<CandidateId>)>,
}

impl<T: Clone + PartialEq> ParamBuckets<T> {
    fn collect(group: &OverloadGroup<T>, candidates: &[CandidateId], index: usize) -> Self {
        let mut buckets: Vec<(T, Vec<CandidateId>)> = Vec::new();
        for &id in candidates {
            let ty = group.param_type(id, index);
            match buckets.iter_mut().find(|(seen, _)| seen == ty) {
                Some((_, members)) => members.push(id),
                None => buckets.push((ty.clone(), vec![id])),
            }
        }
        Self { index, buckets }
    }

    fn largest(&self) -> usize {
        self.buckets
            .iter()
            .map(|(_, members)| members.len())
            .max()
            .unwrap_or(0)
    }

    fn distinct(&self) -> usize {
        self.buckets.len()
    }

    fn types(&self) -> Vec<T> {
        self.buckets.iter().map(|(ty, _)| ty.clone()).collect()
    }
}

/// Pick the parameter index to discriminate on. Ties go to the lowest index.
fn choose_dispatch_index<T>(policy: IndexPolicy, options: &[ParamBuckets<T>]) -> Option<&ParamBuckets<T>>
where
    T: Clone + PartialEq,
{
    match policy {
        // `min_by_key` keeps the first of equal minima.
        IndexPolicy::SmallestLargestBucket => options.iter().min_by_key(|b| b.largest()),
        IndexPolicy::GreatestVariation => options.iter().max_by(|a, b| {
            a.distinct()
                .cmp(&b.distinct())
                .then_with(|| b.index.cmp(&a.index))
        }),
    }
}

fn reject_varargs<T>(
    group: &OverloadGroup<T>,
    candidates: &[CandidateId],
    indices: &[usize],
) -> OverloadResult<()>
where
    T: std::fmt::Display,
{
    for &id in candidates {
        if let Some(&index) = indices.iter().find(|&&i| group.is_vararg(id, i)) {
            return Err(OverloadError::OverloadedVarargs {
                name: group.name().to_string(),
                candidate: group.candidate(id).to_string(),
                index,
            });
        }
    }
    Ok(())
}

/// Builds dispatch trees for overload groups.
///
/// The builder is a pure function of the group, the oracle and the
/// configuration: it never mutates its input, and building the same group
/// twice yields equal trees.
#[derive(Debug)]
pub struct TreeBuilder<'a, O: ?Sized> {
    oracle: &'a O,
    config: &'a DispatchConfig,
}

impl<'a, O> TreeBuilder<'a, O>
where
    O: SubtypeOracle + ?Sized,
{
    pub fn new(oracle: &'a O, config: &'a DispatchConfig) -> Self {
        Self { oracle, config }
    }

    pub fn build(&self, group: &OverloadGroup<O::Type>) -> OverloadResult<DispatchTree<O::Type>> {
        let all: Vec<CandidateId> = group.ids().collect();
        let every_index: Vec<usize> = (0..group.arity()).collect();
        // A lone vararg candidate would otherwise reach the base case unchecked.
        reject_varargs(group, &all, &every_index)?;

        let mut nodes = Vec::new();
        let root = self.split(group, &mut nodes, all, TestedSet::new(), None, None)?;
        Ok(DispatchTree::from_parts(group.clone(), nodes, root))
    }

    fn split(
        &self,
        group: &OverloadGroup<O::Type>,
        nodes: &mut Vec<DispatchNode<O::Type>>,
        candidates: Vec<CandidateId>,
        tested: TestedSet,
        parent: Option<NodeId>,
        edge_type: Option<O::Type>,
    ) -> OverloadResult<NodeId> {
        let id = NodeId(nodes.len());
        nodes.push(DispatchNode::new(
            candidates.clone(),
            tested.clone(),
            parent,
            edge_type,
        ));

        if candidates.len() <= 1 {
            return Ok(id);
        }

        let untested: Vec<usize> = (0..group.arity())
            .filter(|&i| !tested.contains(i))
            .collect();
        if untested.is_empty() {
            let survivor = most_specific(self.oracle, group, &candidates);
            nodes[id.0].candidates = survivor.into_iter().collect();
            return Ok(id);
        }

        reject_varargs(group, &candidates, &untested)?;
        let options: Vec<ParamBuckets<O::Type>> = untested
            .iter()
            .map(|&i| ParamBuckets::collect(group, &candidates, i))
            .collect();
        let Some(chosen) = choose_dispatch_index(self.config.index_policy, &options) else {
            return Ok(id);
        };
        let index = chosen.index;
        let edges = order_most_specific_first(self.oracle, &chosen.types());

        trace!(
            group = group.name(),
            node = id.0,
            dispatch_index = index,
            edges = ?edges.iter().map(|t| t.to_string()).collect::<Vec<_>>(),
            "split"
        );

        let child_tested = tested.with(index);
        let mut claimed = vec![false; candidates.len()];
        let mut children = Vec::with_capacity(edges.len());

        for edge in edges {
            let mut members = Vec::new();
            for (slot, &candidate) in candidates.iter().enumerate() {
                if claimed[slot] {
                    continue;
                }
                let declared = group.param_type(candidate, index);
                if *declared == edge {
                    claimed[slot] = true;
                    members.push(candidate);
                } else if self.oracle.subtype(&edge, declared).is_yes() {
                    members.push(candidate);
                }
            }

            let mut members = thin(self.oracle, group, &members, &child_tested);
            if child_tested.len() == group.arity() && members.len() > 1 {
                members = most_specific(self.oracle, group, &members)
                    .into_iter()
                    .collect();
            }

            let child = self.split(
                group,
                nodes,
                members,
                child_tested.clone(),
                Some(id),
                Some(edge.clone()),
            )?;
            children.push((edge, child));
        }

        nodes[id.0].branch = Some(Branch {
            dispatch_index: index,
            children,
        });
        Ok(id)
    }
}
