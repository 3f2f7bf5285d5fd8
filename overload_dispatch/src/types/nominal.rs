//! Nominal type hierarchy.
//!
//! A minimal subtype oracle for declared (trait/object) types: every type
//! names its direct supertypes, and subtyping is reachability through those
//! declarations. A distinguished top type is a supertype of everything.
//!
//! ```text
//! Any
//!  ├── Animal
//!  │    ├── Dog
//!  │    └── Cat
//!  └── Number
//!       └── Int
//! ```

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::oracle::{SubtypeOracle, Subtyping};

/// Name of the top type used when none is configured.
pub const DEFAULT_TOP: &str = "Any";

/// A declared type, identified by its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NominalType(String);

impl NominalType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NominalType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for NominalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declared-supertype lattice over [`NominalType`].
///
/// A type may declare several supertypes (trait extension). Questions about a
/// type that was never declared are answered with [`Subtyping::Unknown`]
/// rather than a guess.
#[derive(Debug, Clone)]
pub struct TypeHierarchy {
    top: NominalType,
    supertypes: HashMap<NominalType, Vec<NominalType>>,
}

impl Default for TypeHierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeHierarchy {
    pub fn new() -> Self {
        Self::with_top(DEFAULT_TOP)
    }

    pub fn with_top(top: impl Into<String>) -> Self {
        Self {
            top: NominalType::new(top),
            supertypes: HashMap::new(),
        }
    }

    /// Build a hierarchy from a `name -> [supertypes]` table.
    pub fn from_table<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<S>)>,
        S: Into<String>,
    {
        let mut hierarchy = Self::new();
        for (name, supers) in entries {
            hierarchy.declare(name, supers);
        }
        hierarchy
    }

    /// Declare `name` with the given direct supertypes.
    ///
    /// Redeclaring a type adds to its supertype list.
    pub fn declare<S, I>(&mut self, name: S, supers: I) -> &mut Self
    where
        S: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let entry = self
            .supertypes
            .entry(NominalType::new(name))
            .or_default();
        for sup in supers {
            let sup = NominalType::new(sup);
            if !entry.contains(&sup) {
                entry.push(sup);
            }
        }
        self
    }

    /// Builder-style [`TypeHierarchy::declare`].
    pub fn with(mut self, name: &str, supers: &[&str]) -> Self {
        self.declare(name, supers.iter().copied());
        self
    }

    pub fn is_declared(&self, ty: &NominalType) -> bool {
        ty == &self.top || self.supertypes.contains_key(ty)
    }

    /// Direct supertypes of `ty` (empty for the top type or unknown types).
    pub fn direct_supertypes(&self, ty: &NominalType) -> &[NominalType] {
        self.supertypes.get(ty).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn top_type(&self) -> &NominalType {
        &self.top
    }
}

impl SubtypeOracle for TypeHierarchy {
    type Type = NominalType;

    fn subtype(&self, sub: &NominalType, sup: &NominalType) -> Subtyping {
        if sub == sup || sup == &self.top {
            return Subtyping::Yes;
        }
        if sub == &self.top {
            return Subtyping::No;
        }
        if !self.is_declared(sub) || !self.is_declared(sup) {
            return Subtyping::Unknown;
        }

        // Breadth-first walk up the declared supertypes; the visited set
        // guards against cyclic declarations.
        let mut visited: HashSet<&NominalType> = HashSet::new();
        let mut queue: VecDeque<&NominalType> = VecDeque::new();
        let mut saw_undeclared = false;
        queue.push_back(sub);
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            if !self.is_declared(current) {
                saw_undeclared = true;
                continue;
            }
            for parent in self.direct_supertypes(current) {
                if parent == sup {
                    return Subtyping::Yes;
                }
                queue.push_back(parent);
            }
        }

        if saw_undeclared {
            Subtyping::Unknown
        } else {
            Subtyping::No
        }
    }

    fn top(&self) -> NominalType {
        self.top.clone()
    }
}
