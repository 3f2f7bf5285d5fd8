//! TOML description of a type hierarchy and a declaration table.
//!
//! ```toml
//! top = "Any"              # optional
//!
//! [dispatch]
//! index_policy = "smallest_largest_bucket"
//!
//! [types]                  # every type used below must appear here
//! Animal = []
//! Dog = ["Animal"]
//! Int = []
//! String = []
//! IoError = []
//!
//! [[function]]
//! namespace = "zoo"
//! name = "speak"
//! params = ["Dog", "Int..."]   # "T..." is a vararg, "" has no declared type
//! returns = "String"           # defaults to the top type
//! throws = ["IoError"]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::candidate::{Candidate, FunctionDecl, Param};
use crate::compile::{compile_all, CompiledOverload};
use crate::config::DispatchConfig;
use crate::error::{OverloadError, OverloadResult};
use crate::types::{NominalType, TypeHierarchy, DEFAULT_TOP};

const VARARG_SUFFIX: &str = "...";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverloadManifest {
    #[serde(default)]
    pub top: Option<String>,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// Type name to its direct supertypes.
    #[serde(default)]
    pub types: BTreeMap<String, Vec<String>>,
    #[serde(default, rename = "function")]
    pub functions: Vec<FunctionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionEntry {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default)]
    pub returns: Option<String>,
    #[serde(default)]
    pub throws: Vec<String>,
}

fn default_namespace() -> String {
    "main".to_string()
}

impl OverloadManifest {
    pub fn from_toml_str(src: &str) -> OverloadResult<Self> {
        toml::from_str(src).map_err(|e| OverloadError::invalid_manifest(e.to_string()))
    }

    pub fn from_path(path: &Path) -> OverloadResult<Self> {
        let src = fs::read_to_string(path).map_err(|e| {
            OverloadError::invalid_manifest(format!("{}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&src)
    }

    pub fn top_type(&self) -> &str {
        self.top.as_deref().unwrap_or(DEFAULT_TOP)
    }

    pub fn hierarchy(&self) -> TypeHierarchy {
        let mut hierarchy = TypeHierarchy::with_top(self.top_type());
        for (name, supers) in &self.types {
            hierarchy.declare(name.as_str(), supers.iter().map(String::as_str));
        }
        hierarchy
    }

    /// Declarations in manifest order.
    ///
    /// Every type a declaration or a `[types]` entry mentions must be the top
    /// type or a key of `[types]`.
    pub fn candidates(&self) -> OverloadResult<Vec<Candidate<NominalType>>> {
        let hierarchy = self.hierarchy();
        for (name, supers) in &self.types {
            for sup in supers {
                check_declared(&hierarchy, &NominalType::from(sup.as_str()), || {
                    format!("supertypes of '{}'", name)
                })?;
            }
        }

        self.functions
            .iter()
            .map(|entry| {
                let candidate = entry.to_candidate(self.top_type())?;
                let mentioned = candidate
                    .params()
                    .iter()
                    .filter_map(|p| p.ty.as_ref())
                    .chain(std::iter::once(candidate.return_type()))
                    .chain(candidate.throws());
                for ty in mentioned {
                    check_declared(&hierarchy, ty, || candidate.to_string())?;
                }
                Ok(candidate)
            })
            .collect()
    }

    /// Compile every overloaded group with the manifest's own configuration.
    pub fn compile(&self) -> OverloadResult<Vec<CompiledOverload<NominalType>>> {
        compile_all(&self.hierarchy(), &self.dispatch, self.candidates()?)
    }
}

impl FunctionEntry {
    fn to_candidate(&self, top: &str) -> OverloadResult<Candidate<NominalType>> {
        if self.name.trim().is_empty() {
            return Err(OverloadError::invalid_manifest(format!(
                "function in namespace '{}' has an empty name",
                self.namespace
            )));
        }

        let params = self
            .params
            .iter()
            .enumerate()
            .map(|(i, raw)| parse_param(format!("x{}", i), raw))
            .collect();
        let returns = self.returns.as_deref().unwrap_or(top);
        let decl = FunctionDecl::new(self.name.as_str(), params, NominalType::from(returns))
            .with_throws(self.throws.iter().map(|ty| NominalType::from(ty.as_str())).collect());
        Ok(Candidate::new(self.namespace.as_str(), decl))
    }
}

fn check_declared<F>(hierarchy: &TypeHierarchy, ty: &NominalType, context: F) -> OverloadResult<()>
where
    F: FnOnce() -> String,
{
    if hierarchy.is_declared(ty) {
        Ok(())
    } else {
        Err(OverloadError::invalid_manifest(format!(
            "unknown type '{}' in {}",
            ty,
            context()
        )))
    }
}

fn parse_param(name: String, raw: &str) -> Param<NominalType> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Param::untyped(name);
    }
    match raw.strip_suffix(VARARG_SUFFIX) {
        Some(ty) => Param::vararg(name, NominalType::from(ty.trim())),
        None => Param::typed(name, NominalType::from(raw)),
    }
}
