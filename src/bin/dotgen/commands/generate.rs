//! `dotgen generate` command
//!
//! Walks a workspace tree, runs the generation pipeline over every
//! directory, and prints the produced rules. Per-directory failures are
//! reported and skipped; they never abort the run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use walkdir::{DirEntry, WalkDir};

use dotgen::generate::{generate_rules, ExistingRules, GeneratedRules, ProjectDirectoryView};
use dotgen::util::{fs, paths};

use crate::cli::GenerateArgs;

/// Directories never descended into while scanning for projects.
const SKIPPED_DIRS: &[&str] = &["bin", "obj", "node_modules", ".git"];

#[derive(Serialize)]
struct PackageOutput {
    package: String,
    rules: Vec<dotgen::Rule>,
}

pub fn execute(args: GenerateArgs) -> Result<()> {
    let root = args
        .root
        .canonicalize()
        .with_context(|| format!("cannot resolve workspace root: {}", args.root.display()))?;

    // Collect candidate directories up front; generation is pure per
    // directory, which is what makes the fan-out below safe.
    let dirs: Vec<PathBuf> = WalkDir::new(&root)
        .into_iter()
        .filter_entry(|e| !is_skipped(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.into_path())
        .collect();

    let mut outputs: Vec<PackageOutput> = dirs
        .par_iter()
        .filter_map(|dir| generate_one(&root, dir))
        .map(|(package, generated)| PackageOutput {
            package,
            rules: generated.rules,
        })
        .collect();

    // Filesystem enumeration and the parallel fan-out are both unordered;
    // the final sort keeps output stable run over run.
    outputs.sort_by(|a, b| a.package.cmp(&b.package));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outputs)?);
    } else {
        for output in &outputs {
            for rule in &output.rules {
                println!("//{}: {} {}", output.package, rule.kind(), rule.name());
            }
        }
    }

    Ok(())
}

fn generate_one(root: &Path, dir: &Path) -> Option<(String, GeneratedRules)> {
    let view = match directory_view(root, dir) {
        Ok(view) => view,
        Err(e) => {
            tracing::warn!("skipping {}: {:#}", dir.display(), e);
            return None;
        }
    };

    match generate_rules(&view, &ExistingRules::default()) {
        Ok(Some(generated)) => Some((view.rel, generated)),
        Ok(None) => None,
        Err(e) => {
            tracing::error!(
                "cannot generate rules for {}: {:#}",
                dir.display(),
                anyhow::Error::new(e)
            );
            None
        }
    }
}

fn directory_view(root: &Path, dir: &Path) -> Result<ProjectDirectoryView> {
    let rel = pathdiff::diff_paths(dir, root)
        .map(|p| paths::forward_slashed(&p))
        .unwrap_or_default();
    let regular_files = fs::regular_file_names(dir)?;

    Ok(ProjectDirectoryView {
        dir: dir.to_path_buf(),
        rel,
        regular_files,
    })
}

fn is_skipped(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}
