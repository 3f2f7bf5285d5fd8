// Library code reports through `tracing`; only the bin may print.
#![deny(clippy::print_stderr)]

//! Compilation of overload groups into runtime dispatch trees.
//!
//! Given every candidate sharing one name and arity, plus a subtype oracle
//! for the surrounding type system, the crate builds a decision tree that
//! picks the most specific applicable candidate from the erased runtime types
//! of the arguments, and drives a backend to emit it as a chain of type
//! tests ending in a call or a "no match" jump.

// Type model consumed from the surrounding compiler
pub mod candidate;
pub mod types;

// Ingestion and resolution
pub mod group;
pub mod specificity;
pub mod thinning;

// Tree construction and emission
pub mod emit;
pub mod overload_set;
pub mod tree;

// Drivers
pub mod compile;
pub mod config;
pub mod error;
pub mod manifest;
pub mod report;

pub use candidate::{Candidate, FunctionDecl, Namespace, Param};
pub use compile::{compile_all, compile_group, CompiledOverload, CompiledSubset};
pub use config::{DispatchConfig, IndexPolicy};
pub use emit::{emit_dispatch, CombinedSignature, DispatchEmitter, DispatchInstr, InstrListing};
pub use error::{OverloadError, OverloadResult};
pub use group::{partition_overloads, CandidateId, OverloadGroup, OverloadSubset};
pub use manifest::OverloadManifest;
pub use overload_set::OverloadSet;
pub use report::{render, DumpFormat};
pub use specificity::{dominates, most_specific, order_most_specific_first};
pub use thinning::thin;
pub use tree::{Branch, DispatchNode, DispatchTree, NodeId, TestedSet, TreeBuilder};
pub use types::{NominalType, SubtypeOracle, Subtyping, TypeHierarchy};
