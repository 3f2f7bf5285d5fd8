//! The subtype oracle consumed by the dispatch-tree builder.

use std::fmt;

/// Answer to "is `A` a subtype of `B`?".
///
/// Type checkers for trait-based languages cannot always decide subtyping
/// (e.g. for not-yet-instantiated generics), so the answer is three-valued.
/// Overload compilation only acts on [`Subtyping::Yes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subtyping {
    Yes,
    No,
    Unknown,
}

impl Subtyping {
    #[inline]
    pub fn is_yes(self) -> bool {
        matches!(self, Subtyping::Yes)
    }
}

impl From<bool> for Subtyping {
    fn from(value: bool) -> Self {
        if value {
            Subtyping::Yes
        } else {
            Subtyping::No
        }
    }
}

/// Pure query interface over the surrounding type system.
///
/// Implementations must be side-effect free: the builder may ask the same
/// question many times and in any order.
pub trait SubtypeOracle {
    /// Declared type as produced by the surrounding compiler.
    type Type: Clone + PartialEq + fmt::Debug + fmt::Display;

    /// Is `sub <: sup`?
    fn subtype(&self, sub: &Self::Type, sup: &Self::Type) -> Subtyping;

    /// The universal top type, used when widening joins that disagree.
    fn top(&self) -> Self::Type;

    /// `sub == sup` or the oracle affirms `sub <: sup`.
    fn is_subtype_or_equal(&self, sub: &Self::Type, sup: &Self::Type) -> bool {
        sub == sup || self.subtype(sub, sup).is_yes()
    }
}

impl<O: SubtypeOracle + ?Sized> SubtypeOracle for &O {
    type Type = O::Type;

    fn subtype(&self, sub: &Self::Type, sup: &Self::Type) -> Subtyping {
        (**self).subtype(sub, sup)
    }

    fn top(&self) -> Self::Type {
        (**self).top()
    }
}
