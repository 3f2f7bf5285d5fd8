//! Per-group and whole-table compilation.
//!
//! Groups share nothing mutable, so `compile_all` may hand them to the rayon
//! pool. Output order is partition order either way.

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::candidate::Candidate;
use crate::config::DispatchConfig;
use crate::emit::CombinedSignature;
use crate::error::OverloadResult;
use crate::group::{partition_overloads, CandidateId, OverloadGroup};
use crate::tree::{DispatchTree, TreeBuilder};
use crate::types::SubtypeOracle;

/// Everything a backend needs to emit one combined entry point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledOverload<T> {
    pub tree: DispatchTree<T>,
    pub signature: CombinedSignature<T>,
    /// Entry points for the group's overload subsets, in group order.
    pub subsets: Vec<CompiledSubset<T>>,
}

/// A combined entry point for one overload subset. Its principal is the
/// candidate the subset is named after.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledSubset<T> {
    pub name: String,
    pub principal: CandidateId,
    pub tree: DispatchTree<T>,
    pub signature: CombinedSignature<T>,
}

impl<T> CompiledOverload<T> {
    pub fn name(&self) -> &str {
        self.tree.name()
    }

    pub fn arity(&self) -> usize {
        self.tree.arity()
    }
}

pub fn compile_group<O>(
    oracle: &O,
    config: &DispatchConfig,
    group: &OverloadGroup<O::Type>,
) -> OverloadResult<CompiledOverload<O::Type>>
where
    O: SubtypeOracle + ?Sized,
{
    let builder = TreeBuilder::new(oracle, config);
    let tree = builder.build(group)?;
    let signature = CombinedSignature::of(oracle, group);

    let subsets = group
        .overload_subsets(oracle)
        .into_iter()
        .map(|subset| -> OverloadResult<CompiledSubset<O::Type>> {
            let tree = builder.build(&subset.group)?;
            let signature = CombinedSignature::of(oracle, &subset.group);
            Ok(CompiledSubset {
                name: subset.name,
                principal: subset.principal,
                tree,
                signature,
            })
        })
        .collect::<OverloadResult<Vec<_>>>()?;

    debug!(
        group = group.name(),
        arity = group.arity(),
        candidates = group.len(),
        nodes = tree.len(),
        depth = tree.depth(),
        subsets = subsets.len(),
        "compiled overload group"
    );
    Ok(CompiledOverload {
        tree,
        signature,
        subsets,
    })
}

/// Partition `decls` into overload groups and compile every group with more
/// than one candidate.
///
/// Stops at the first failing group in partition order.
pub fn compile_all<O, I>(
    oracle: &O,
    config: &DispatchConfig,
    decls: I,
) -> OverloadResult<Vec<CompiledOverload<O::Type>>>
where
    O: SubtypeOracle + Sync + ?Sized,
    O::Type: Send + Sync,
    I: IntoIterator<Item = Candidate<O::Type>>,
{
    let groups: Vec<OverloadGroup<O::Type>> = partition_overloads(decls)?
        .into_iter()
        .filter(OverloadGroup::is_overloaded)
        .collect();

    debug!(
        groups = groups.len(),
        parallel = config.parallel,
        policy = %config.index_policy,
        "compiling overload table"
    );

    if config.parallel {
        groups
            .par_iter()
            .map(|group| compile_group(oracle, config, group))
            .collect()
    } else {
        groups
            .iter()
            .map(|group| compile_group(oracle, config, group))
            .collect()
    }
}
