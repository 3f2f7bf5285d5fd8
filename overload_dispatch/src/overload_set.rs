//! An overload group paired with its lazily built dispatch tree.

use once_cell::sync::OnceCell;

use crate::config::DispatchConfig;
use crate::error::OverloadResult;
use crate::group::OverloadGroup;
use crate::tree::{DispatchTree, TreeBuilder};
use crate::types::SubtypeOracle;

/// Holds a group and builds its tree at most once.
///
/// `split` is idempotent: the first successful call builds and caches the
/// tree, every later call returns the cached one untouched. A failed build
/// caches nothing.
#[derive(Debug)]
pub struct OverloadSet<T> {
    group: OverloadGroup<T>,
    tree: OnceCell<DispatchTree<T>>,
}

impl<T> OverloadSet<T> {
    pub fn new(group: OverloadGroup<T>) -> Self {
        Self {
            group,
            tree: OnceCell::new(),
        }
    }

    pub fn group(&self) -> &OverloadGroup<T> {
        &self.group
    }

    pub fn is_split(&self) -> bool {
        self.tree.get().is_some()
    }

    pub fn tree(&self) -> Option<&DispatchTree<T>> {
        self.tree.get()
    }

    pub fn into_tree(self) -> Option<DispatchTree<T>> {
        self.tree.into_inner()
    }

    /// Build the dispatch tree, or return the one already built.
    ///
    /// `config` only matters on the first successful call.
    pub fn split<O>(&self, oracle: &O, config: &DispatchConfig) -> OverloadResult<&DispatchTree<T>>
    where
        O: SubtypeOracle<Type = T> + ?Sized,
    {
        self.tree
            .get_or_try_init(|| TreeBuilder::new(oracle, config).build(&self.group))
    }
}
