//! Error types for overload-set compilation.
//!
//! The group-level variants are internal invariant violations: an earlier
//! phase was supposed to rule the situation out, and callers stop compiling
//! the unit when they see one. The remaining variants come from the manifest
//! and dump drivers.
//!
//! A runtime dispatch miss is not represented here. It is a structural part of
//! the dispatch tree (the caller's no-match label) and never an error value.

use thiserror::Error;

/// Hard failure while ingesting or splitting an overload group.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverloadError {
    /// An overload group must contain at least one candidate.
    #[error("overload group '{name}' has no candidates")]
    EmptyGroup { name: String },

    /// A candidate was filed under the wrong overload group.
    #[error("candidate {candidate} does not belong to overload group '{name}'")]
    NameMismatch { name: String, candidate: String },

    /// Candidates sharing a name disagree on parameter count.
    #[error(
        "arity mismatch in overload group '{name}': expected {expected} parameters, \
         {candidate} has {found}"
    )]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        candidate: String,
    },

    /// A parameter reached this phase without a resolved declared type.
    #[error("missing declared type for parameter {index} of {candidate}")]
    MissingParamType { candidate: String, index: usize },

    /// Vararg parameters cannot take part in compiled overload dispatch.
    #[error("unsupported: overloaded varargs in '{name}' (parameter {index} of {candidate})")]
    OverloadedVarargs {
        name: String,
        candidate: String,
        index: usize,
    },

    /// A dispatch configuration could not be parsed.
    #[error("invalid dispatch configuration: {message}")]
    InvalidConfig { message: String },

    /// An overload manifest could not be parsed or refers to unknown names.
    #[error("invalid overload manifest: {message}")]
    InvalidManifest { message: String },

    /// A compiled table could not be written out.
    #[error("failed to serialize compiled overloads: {message}")]
    Serialization { message: String },
}

impl OverloadError {
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        OverloadError::InvalidConfig {
            message: msg.into(),
        }
    }

    pub fn invalid_manifest<S: Into<String>>(msg: S) -> Self {
        OverloadError::InvalidManifest {
            message: msg.into(),
        }
    }
}

/// Result type alias for overload-set compilation.
pub type OverloadResult<T> = Result<T, OverloadError>;
