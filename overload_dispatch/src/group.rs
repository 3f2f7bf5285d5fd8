//! Overload-group ingestion.
//!
//! An overload group is every candidate sharing one name and one arity in
//! the scope being compiled. Ingestion checks the preconditions the earlier
//! phases are supposed to guarantee and resolves the declared-type table the
//! builder dispatches on.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::candidate::Candidate;
use crate::error::{OverloadError, OverloadResult};
use crate::specificity::dominates;
use crate::types::SubtypeOracle;

/// Position of a candidate inside its [`OverloadGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CandidateId(usize);

impl CandidateId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Same-name, same-arity candidates, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverloadGroup<T> {
    name: String,
    arity: usize,
    candidates: Vec<Candidate<T>>,
    /// Declared type of every parameter, `signatures[candidate][param]`.
    #[serde(skip)]
    signatures: Vec<Vec<T>>,
}

impl<T: Clone + PartialEq + fmt::Display> OverloadGroup<T> {
    /// Ingest a group.
    ///
    /// Fails when the group is empty, when a candidate has a different name or
    /// parameter count, or when a parameter has no declared type. Exact
    /// duplicates are kept once.
    pub fn new<I>(name: impl Into<String>, arity: usize, candidates: I) -> OverloadResult<Self>
    where
        I: IntoIterator<Item = Candidate<T>>,
    {
        let name = name.into();
        let mut unique: Vec<Candidate<T>> = Vec::new();
        let mut signatures = Vec::new();

        for candidate in candidates {
            if candidate.name() != name {
                return Err(OverloadError::NameMismatch {
                    name,
                    candidate: candidate.to_string(),
                });
            }
            if candidate.arity() != arity {
                return Err(OverloadError::ArityMismatch {
                    name,
                    expected: arity,
                    found: candidate.arity(),
                    candidate: candidate.to_string(),
                });
            }
            if unique.contains(&candidate) {
                continue;
            }

            let mut signature = Vec::with_capacity(arity);
            for (index, param) in candidate.params().iter().enumerate() {
                match &param.ty {
                    Some(ty) => signature.push(ty.clone()),
                    None => {
                        return Err(OverloadError::MissingParamType {
                            candidate: candidate.to_string(),
                            index,
                        })
                    }
                }
            }
            signatures.push(signature);
            unique.push(candidate);
        }

        if unique.is_empty() {
            return Err(OverloadError::EmptyGroup { name });
        }

        Ok(Self {
            name,
            arity,
            candidates: unique,
            signatures,
        })
    }
}

impl<T> OverloadGroup<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Always false for an ingested group; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// More than one candidate, so a dispatch procedure is actually needed.
    pub fn is_overloaded(&self) -> bool {
        self.candidates.len() > 1
    }

    pub fn candidates(&self) -> &[Candidate<T>] {
        &self.candidates
    }

    pub fn candidate(&self, id: CandidateId) -> &Candidate<T> {
        &self.candidates[id.0]
    }

    pub fn ids(&self) -> impl Iterator<Item = CandidateId> + '_ {
        (0..self.candidates.len()).map(CandidateId)
    }

    /// Declared type of parameter `index` of candidate `id`.
    pub fn param_type(&self, id: CandidateId, index: usize) -> &T {
        &self.signatures[id.0][index]
    }

    /// All declared parameter types of candidate `id`.
    pub fn signature(&self, id: CandidateId) -> &[T] {
        &self.signatures[id.0]
    }

    pub fn is_vararg(&self, id: CandidateId, index: usize) -> bool {
        self.candidates[id.0].params()[index].vararg
    }

    /// The member every other member is at least as specific as.
    ///
    /// When it exists the combined entry point takes its signature. A
    /// singleton group has none. Among members with identical signatures the
    /// first one wins.
    pub fn principal_member<O>(&self, oracle: &O) -> Option<CandidateId>
    where
        O: SubtypeOracle<Type = T> + ?Sized,
    {
        if !self.is_overloaded() {
            return None;
        }
        self.ids()
            .find(|&f| self.ids().all(|g| dominates(oracle, self, g, f)))
    }

    /// Members other than `f` that dominate it.
    fn more_specific_than<O>(&self, oracle: &O, f: CandidateId) -> Vec<CandidateId>
    where
        O: SubtypeOracle<Type = T> + ?Sized,
    {
        self.ids()
            .filter(|&g| g != f && dominates(oracle, self, g, f))
            .collect()
    }
}

/// A sub-group that can be named on its own: one candidate together with
/// every sibling more specific than it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverloadSubset<T> {
    /// Display form of the principal candidate.
    pub name: String,
    /// The principal, as an id into the parent group.
    pub principal: CandidateId,
    /// Members in parent order. The principal is its principal member.
    pub group: OverloadGroup<T>,
}

impl<T: Clone + PartialEq + fmt::Display> OverloadGroup<T> {
    /// One subset per candidate that some, but not all, of its siblings are
    /// more specific than. A candidate dominated by every sibling is the
    /// principal member of the whole group and gets no subset.
    pub fn overload_subsets<O>(&self, oracle: &O) -> Vec<OverloadSubset<T>>
    where
        O: SubtypeOracle<Type = T> + ?Sized,
    {
        let mut subsets = Vec::new();
        for f in self.ids() {
            let below = self.more_specific_than(oracle, f);
            if below.is_empty() || below.len() + 1 == self.len() {
                continue;
            }
            let members: Vec<CandidateId> = self
                .ids()
                .filter(|&g| g == f || below.contains(&g))
                .collect();
            subsets.push(OverloadSubset {
                name: self.candidate(f).to_string(),
                principal: f,
                group: self.restrict(&members),
            });
        }
        subsets
    }

    /// The already-validated members `ids`, as a group of their own.
    fn restrict(&self, ids: &[CandidateId]) -> Self {
        Self {
            name: self.name.clone(),
            arity: self.arity,
            candidates: ids.iter().map(|id| self.candidates[id.0].clone()).collect(),
            signatures: ids.iter().map(|id| self.signatures[id.0].clone()).collect(),
        }
    }
}

/// Partition a flat declaration list into overload groups keyed by
/// `(name, arity)`, in first-occurrence order.
///
/// Singleton groups are returned too; filter with
/// [`OverloadGroup::is_overloaded`] when only real overloads matter.
pub fn partition_overloads<T, I>(decls: I) -> OverloadResult<Vec<OverloadGroup<T>>>
where
    T: Clone + PartialEq + fmt::Display,
    I: IntoIterator<Item = Candidate<T>>,
{
    let mut slots: HashMap<(String, usize), usize> = HashMap::new();
    let mut buckets: Vec<((String, usize), Vec<Candidate<T>>)> = Vec::new();

    for candidate in decls {
        let key = (candidate.name().to_string(), candidate.arity());
        match slots.get(&key) {
            Some(&slot) => buckets[slot].1.push(candidate),
            None => {
                slots.insert(key.clone(), buckets.len());
                buckets.push((key, vec![candidate]));
            }
        }
    }

    buckets
        .into_iter()
        .map(|((name, arity), members)| OverloadGroup::new(name, arity, members))
        .collect()
}
