//! Dispatch compilation settings.
//!
//! Settings come from three places, later ones overriding earlier ones in the
//! order the caller chooses to apply them:
//!
//! - built-in defaults ([`DispatchConfig::default`]),
//! - a `[dispatch]` table in a TOML document ([`DispatchConfig::from_toml_str`]),
//! - environment variables ([`DispatchConfig::from_env`]):
//!   `OVERLOAD_DISPATCH_POLICY` (`smallest_largest_bucket` | `greatest_variation`)
//!   and `OVERLOAD_DISPATCH_PARALLEL` (`1`/`true`/`0`/`false`).

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{OverloadError, OverloadResult};

pub const POLICY_ENV: &str = "OVERLOAD_DISPATCH_POLICY";
pub const PARALLEL_ENV: &str = "OVERLOAD_DISPATCH_PARALLEL";

/// How a node picks the parameter it dispatches on.
///
/// The policy changes the shape of the tree. An argument tuple with a unique
/// most specific applicable candidate reaches it under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexPolicy {
    /// Minimise the largest type bucket, bounding the worst-case fan-in of
    /// any child. Ties go to the lowest parameter index.
    #[default]
    SmallestLargestBucket,
    /// Maximise the number of distinct declared types. Ties go to the lowest
    /// parameter index.
    GreatestVariation,
}

impl IndexPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            IndexPolicy::SmallestLargestBucket => "smallest_largest_bucket",
            IndexPolicy::GreatestVariation => "greatest_variation",
        }
    }
}

impl fmt::Display for IndexPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexPolicy {
    type Err = OverloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "smallest_largest_bucket" => Ok(IndexPolicy::SmallestLargestBucket),
            "greatest_variation" => Ok(IndexPolicy::GreatestVariation),
            other => Err(OverloadError::invalid_config(format!(
                "unknown index policy '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    pub index_policy: IndexPolicy,
    /// Compile independent overload groups on the rayon thread pool.
    pub parallel: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            index_policy: IndexPolicy::default(),
            parallel: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    dispatch: DispatchConfig,
}

impl DispatchConfig {
    pub fn with_policy(mut self, index_policy: IndexPolicy) -> Self {
        self.index_policy = index_policy;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Read the `[dispatch]` table of a TOML document. Other tables are
    /// ignored; a missing table yields the defaults.
    pub fn from_toml_str(src: &str) -> OverloadResult<Self> {
        let doc: ConfigDocument =
            toml::from_str(src).map_err(|e| OverloadError::invalid_config(e.to_string()))?;
        Ok(doc.dispatch)
    }

    /// Defaults overridden by the environment.
    pub fn from_env() -> OverloadResult<Self> {
        Self::default().apply_env()
    }

    /// Override fields from `OVERLOAD_DISPATCH_*` variables that are set.
    pub fn apply_env(self) -> OverloadResult<Self> {
        self.apply_overrides(env::var(POLICY_ENV).ok(), env::var(PARALLEL_ENV).ok())
    }

    fn apply_overrides(
        mut self,
        policy: Option<String>,
        parallel: Option<String>,
    ) -> OverloadResult<Self> {
        if let Some(raw) = policy.filter(|v| !v.trim().is_empty()) {
            self.index_policy = raw.parse()?;
        }
        if let Some(raw) = parallel.filter(|v| !v.trim().is_empty()) {
            self.parallel = parse_flag(PARALLEL_ENV, &raw)?;
        }
        Ok(self)
    }
}

fn parse_flag(var: &str, raw: &str) -> OverloadResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(OverloadError::invalid_config(format!(
            "{} must be a boolean, got '{}'",
            var, other
        ))),
    }
}
