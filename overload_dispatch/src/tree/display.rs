//! Indented text dump of a dispatch tree.
//!
//! ```text
//! f/2
//! #0
//!   Int -> #1
//!     Int -> api.f(Int, Int)
//!     String -> api.f(Int, String)
//!   String -> api.f(String, Int)
//! ```

use std::fmt;

use super::{DispatchTree, NodeId};

impl<T: fmt::Display> DispatchTree<T> {
    fn summary(&self, id: NodeId) -> String {
        let node = self.node(id);
        match (node.dispatch_index(), node.target()) {
            (Some(index), _) => format!("#{}", index),
            (None, Some(candidate)) => self.candidate(candidate).to_string(),
            (None, None) => "<no match>".to_string(),
        }
    }

    fn write_children(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        for (ty, child) in self.node(id).children() {
            writeln!(
                f,
                "{:indent$}{} -> {}",
                "",
                ty,
                self.summary(*child),
                indent = depth * 2
            )?;
            self.write_children(f, *child, depth + 1)?;
        }
        Ok(())
    }
}

impl<T: fmt::Display> fmt::Display for DispatchTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}/{}", self.name(), self.arity())?;
        writeln!(f, "{}", self.summary(self.root()))?;
        self.write_children(f, self.root(), 1)
    }
}
