//! Type-system seam for overload-set compilation.
//!
//! The dispatch-tree builder never inspects types directly; every question
//! about declared types goes through a [`SubtypeOracle`]. This module defines
//! that seam and a reference nominal hierarchy implementing it.
//!
//! # Module Organization
//!
//! - `oracle.rs`: `SubtypeOracle` trait and the three-valued `Subtyping` answer
//! - `nominal.rs`: `NominalType` and `TypeHierarchy`, a declared-supertype lattice

mod nominal;
mod oracle;


pub use nominal::{NominalType, TypeHierarchy, DEFAULT_TOP};
pub use oracle::{SubtypeOracle, Subtyping};
