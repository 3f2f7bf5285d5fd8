//! Dump the dispatch trees of every overloaded group in a manifest.
//!
//! Usage:
//!   overload-dump <manifest.toml> [--json] [--emit]

use std::env;
use std::path::Path;

use overload_dispatch::{render, DispatchConfig, DumpFormat, OverloadManifest};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: overload-dump <manifest.toml> [--json] [--emit]");
        std::process::exit(1);
    }

    let mut manifest_path = None;
    let mut json = false;
    let mut emit = false;

    for arg in &args[1..] {
        match arg.as_str() {
            "--json" => json = true,
            "--emit" => emit = true,
            "-h" | "--help" => {
                println!("Usage: overload-dump <manifest.toml> [--json] [--emit]");
                return;
            }
            other if !other.starts_with('-') => manifest_path = Some(other.to_string()),
            _ => {
                eprintln!("Unknown argument: {}", arg);
                std::process::exit(1);
            }
        }
    }

    let manifest_path = manifest_path.unwrap_or_else(|| {
        eprintln!("Error: manifest file required");
        std::process::exit(1);
    });

    let mut manifest = OverloadManifest::from_path(Path::new(&manifest_path)).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    // Environment overrides the manifest's [dispatch] table.
    manifest.dispatch = apply_env(manifest.dispatch);

    let compiled = manifest.compile().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let format = if json {
        DumpFormat::Json
    } else if emit {
        DumpFormat::Listing
    } else {
        DumpFormat::Text
    };
    match render(&compiled, format) {
        Ok(text) => print!("{}", text),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn apply_env(config: DispatchConfig) -> DispatchConfig {
    config.apply_env().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    })
}
