//! Human- and machine-readable dumps of a compiled overload table.

use std::fmt::{self, Write};

use serde::Serialize;

use crate::compile::CompiledOverload;
use crate::emit::{CombinedSignature, InstrListing};
use crate::error::{OverloadError, OverloadResult};
use crate::tree::DispatchTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DumpFormat {
    /// Trees and combined signatures.
    #[default]
    Text,
    /// As `Text`, with the instruction listing after every tree.
    Listing,
    /// The whole table as pretty-printed JSON.
    Json,
}

/// Render every compiled overload, in table order.
///
/// In the text formats each overload is followed by its subsets, each
/// introduced by a `subset <principal>` line, and then a blank line.
pub fn render<T>(compiled: &[CompiledOverload<T>], format: DumpFormat) -> OverloadResult<String>
where
    T: Clone + fmt::Display + Serialize,
{
    if format == DumpFormat::Json {
        let mut text = serde_json::to_string_pretty(compiled).map_err(|e| {
            OverloadError::Serialization {
                message: e.to_string(),
            }
        })?;
        text.push('\n');
        return Ok(text);
    }

    let listing = format == DumpFormat::Listing;
    let mut out = String::new();
    for overload in compiled {
        write_entry(&mut out, &overload.tree, &overload.signature, listing);
        for subset in &overload.subsets {
            let _ = writeln!(out, "subset {}", subset.name);
            write_entry(&mut out, &subset.tree, &subset.signature, listing);
        }
        out.push('\n');
    }
    Ok(out)
}

fn write_entry<T>(
    out: &mut String,
    tree: &DispatchTree<T>,
    signature: &CombinedSignature<T>,
    listing: bool,
) where
    T: Clone + fmt::Display,
{
    let _ = write!(out, "{}", tree);
    let _ = writeln!(out, "{}", SignatureLine(signature));
    if listing {
        let _ = write!(out, "{}", InstrListing::from_tree(tree));
    }
}

struct SignatureLine<'a, T>(&'a CombinedSignature<T>);

impl<T: fmt::Display> fmt::Display for SignatureLine<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |types: &[T]| {
            types
                .iter()
                .map(|ty| ty.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        write!(
            f,
            "combined: ({}) -> {} throws [{}]",
            join(&self.0.domain),
            self.0.return_type,
            join(&self.0.throws)
        )
    }
}
