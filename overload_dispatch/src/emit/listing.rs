//! Reference emitter: a flat instruction listing plus a small evaluator.

use std::fmt;

use serde::Serialize;

use super::{emit_dispatch, DispatchEmitter};
use crate::candidate::Candidate;
use crate::tree::DispatchTree;
use crate::types::SubtypeOracle;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DispatchInstr<T> {
    Label { id: usize },
    TypeTest { arg: usize, ty: T, on_fail: usize },
    Downcast { arg: usize, ty: T },
    Call { candidate: Candidate<T> },
    Return,
    Jump { target: usize },
}

impl<T: fmt::Display> fmt::Display for DispatchInstr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchInstr::Label { id } => write!(f, "L{}:", id),
            DispatchInstr::TypeTest { arg, ty, on_fail } => {
                write!(f, "  test x{} <: {} else L{}", arg, ty, on_fail)
            }
            DispatchInstr::Downcast { arg, ty } => write!(f, "  downcast x{} as {}", arg, ty),
            DispatchInstr::Call { candidate } => write!(f, "  call {}", candidate),
            DispatchInstr::Return => write!(f, "  return"),
            DispatchInstr::Jump { target } => write!(f, "  jump L{}", target),
        }
    }
}

/// Collects emitted instructions. Labels are plain counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrListing<T> {
    instrs: Vec<DispatchInstr<T>>,
    labels: usize,
}

impl<T> Default for InstrListing<T> {
    fn default() -> Self {
        Self {
            instrs: Vec::new(),
            labels: 0,
        }
    }
}

impl<T: Clone> InstrListing<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `tree` with its no-match label bound at the very end.
    pub fn from_tree(tree: &DispatchTree<T>) -> Self {
        let mut listing = Self::new();
        let no_match = listing.new_label();
        emit_dispatch(tree, &mut listing, &no_match);
        listing.bind_label(&no_match);
        listing
    }

    pub fn instrs(&self) -> &[DispatchInstr<T>] {
        &self.instrs
    }

    pub fn into_instrs(self) -> Vec<DispatchInstr<T>> {
        self.instrs
    }

    fn label_positions(&self) -> Vec<Option<usize>> {
        let mut positions = vec![None; self.labels];
        for (pc, instr) in self.instrs.iter().enumerate() {
            if let DispatchInstr::Label { id } = instr {
                if let Some(slot) = positions.get_mut(*id) {
                    *slot = Some(pc);
                }
            }
        }
        positions
    }

    /// Execute the listing against erased argument types.
    ///
    /// Downcasts are trusted, as a backend would after a passing test.
    /// Returns the called candidate, or `None` when control reaches the
    /// no-match label (the end of the listing) or an unbound label.
    pub fn run<O>(&self, oracle: &O, arg_types: &[T]) -> Option<&Candidate<T>>
    where
        O: SubtypeOracle<Type = T> + ?Sized,
    {
        let positions = self.label_positions();
        let mut called = None;
        let mut pc = 0;
        loop {
            match self.instrs.get(pc)? {
                DispatchInstr::TypeTest { arg, ty, on_fail } => {
                    let passes = arg_types
                        .get(*arg)
                        .is_some_and(|actual| oracle.is_subtype_or_equal(actual, ty));
                    pc = if passes {
                        pc + 1
                    } else {
                        (*positions.get(*on_fail)?)?
                    };
                }
                DispatchInstr::Call { candidate } => {
                    called = Some(candidate);
                    pc += 1;
                }
                DispatchInstr::Return => return called,
                DispatchInstr::Jump { target } => pc = (*positions.get(*target)?)?,
                DispatchInstr::Label { .. } | DispatchInstr::Downcast { .. } => pc += 1,
            }
        }
    }
}

impl<T: Clone> DispatchEmitter<T> for InstrListing<T> {
    type Label = usize;

    fn new_label(&mut self) -> usize {
        let label = self.labels;
        self.labels += 1;
        label
    }

    fn bind_label(&mut self, label: &usize) {
        self.instrs.push(DispatchInstr::Label { id: *label });
    }

    fn emit_type_test(&mut self, arg: usize, ty: &T, on_fail: &usize) {
        self.instrs.push(DispatchInstr::TypeTest {
            arg,
            ty: ty.clone(),
            on_fail: *on_fail,
        });
    }

    fn emit_downcast(&mut self, arg: usize, ty: &T) {
        self.instrs.push(DispatchInstr::Downcast {
            arg,
            ty: ty.clone(),
        });
    }

    fn emit_call(&mut self, candidate: &Candidate<T>) {
        self.instrs.push(DispatchInstr::Call {
            candidate: candidate.clone(),
        });
    }

    fn emit_return(&mut self) {
        self.instrs.push(DispatchInstr::Return);
    }

    fn emit_no_match_jump(&mut self, label: &usize) {
        self.instrs.push(DispatchInstr::Jump { target: *label });
    }
}

impl<T: fmt::Display> fmt::Display for InstrListing<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instr in &self.instrs {
            writeln!(f, "{}", instr)?;
        }
        Ok(())
    }
}
