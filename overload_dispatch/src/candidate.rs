//! Candidate model: one declared function together with the namespace
//! (trait, object, or API) that declares it.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Declaring namespace of a candidate (trait, object, component or API name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Namespace {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A declared parameter.
///
/// `ty` is `None` when the surrounding compiler failed to resolve the
/// declared type; ingestion rejects such parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param<T> {
    pub name: String,
    pub ty: Option<T>,
    /// `x: T...` parameter. Never dispatched on.
    #[serde(default)]
    pub vararg: bool,
}

impl<T> Param<T> {
    pub fn typed(name: impl Into<String>, ty: T) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
            vararg: false,
        }
    }

    pub fn vararg(name: impl Into<String>, ty: T) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
            vararg: true,
        }
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            vararg: false,
        }
    }
}

/// A function or method declaration as indexed by the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl<T> {
    pub name: String,
    pub params: Vec<Param<T>>,
    pub return_type: T,
    /// Declared thrown-error types.
    #[serde(default = "Vec::new")]
    pub throws: Vec<T>,
}

impl<T> FunctionDecl<T> {
    pub fn new(name: impl Into<String>, params: Vec<Param<T>>, return_type: T) -> Self {
        Self {
            name: name.into(),
            params,
            return_type,
            throws: Vec::new(),
        }
    }

    pub fn with_throws(mut self, throws: Vec<T>) -> Self {
        self.throws = throws;
        self
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// One member of an overload group: `(namespace, function)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate<T> {
    pub namespace: Namespace,
    pub decl: FunctionDecl<T>,
}

impl<T> Candidate<T> {
    pub fn new(namespace: impl Into<Namespace>, decl: FunctionDecl<T>) -> Self {
        Self {
            namespace: namespace.into(),
            decl,
        }
    }

    pub fn name(&self) -> &str {
        &self.decl.name
    }

    pub fn arity(&self) -> usize {
        self.decl.arity()
    }

    pub fn params(&self) -> &[Param<T>] {
        &self.decl.params
    }

    pub fn return_type(&self) -> &T {
        &self.decl.return_type
    }

    pub fn throws(&self) -> &[T] {
        &self.decl.throws
    }

    /// Index of the first vararg parameter, if any.
    pub fn vararg_index(&self) -> Option<usize> {
        self.decl.params.iter().position(|p| p.vararg)
    }
}

impl<T: fmt::Display> Candidate<T> {
    /// Total order for deterministic listings: function name, then namespace,
    /// then arity, then the displayed parameter types.
    pub fn compare(&self, other: &Self) -> Ordering {
        self.name()
            .cmp(other.name())
            .then_with(|| self.namespace.cmp(&other.namespace))
            .then_with(|| self.arity().cmp(&other.arity()))
            .then_with(|| {
                let lhs = self.params().iter().map(param_label);
                let rhs = other.params().iter().map(param_label);
                lhs.cmp(rhs)
            })
    }
}

fn param_label<T: fmt::Display>(param: &Param<T>) -> String {
    match (&param.ty, param.vararg) {
        (Some(ty), false) => ty.to_string(),
        (Some(ty), true) => format!("{}...", ty),
        (None, _) => "?".to_string(),
    }
}

impl<T: fmt::Display> fmt::Display for Candidate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params().iter().map(param_label).collect();
        write!(f, "{}.{}({})", self.namespace, self.name(), params.join(", "))
    }
}
