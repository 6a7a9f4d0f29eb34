//! Source-file discovery for a project directory.

use std::path::{Component, Path};

use crate::util::paths::forward_slashed;

/// Directory names excluded anywhere under the project root. These hold
/// build artifacts and restored tooling, never first-party sources.
const EXCLUDED_DIRS: &[&str] = &["bin", "obj", "node_modules"];

/// Find all `.cs` files under `dir`, excluding artifact directories.
///
/// Paths come back relative to `dir`, forward-slashed, sorted, and
/// deduplicated. Unreadable entries are skipped with a warning rather than
/// failing the directory: missing sources surface later as an empty `srcs`
/// attribute, which is not an error.
pub fn find_source_files(dir: &Path) -> Vec<String> {
    let pattern = format!("{}/**/*.cs", dir.display());
    tracing::debug!("searching for source files with {}", pattern);

    let entries = match glob::glob(&pattern) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("invalid source glob {}: {}", pattern, e);
            return Vec::new();
        }
    };

    let mut results = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => {
                if !path.is_file() {
                    continue;
                }
                let rel = path.strip_prefix(dir).unwrap_or(&path);
                if has_excluded_component(rel) {
                    tracing::debug!("excluding {}", rel.display());
                    continue;
                }
                results.push(forward_slashed(rel));
            }
            Err(e) => tracing::warn!("glob error: {}", e),
        }
    }

    results.sort();
    results.dedup();

    tracing::debug!("found {} source files under {}", results.len(), dir.display());
    results
}

fn has_excluded_component(path: &Path) -> bool {
    path.components().any(|c| match c {
        Component::Normal(name) => EXCLUDED_DIRS.iter().any(|d| name == *d),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, rel: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "// test").unwrap();
    }

    #[test]
    fn test_finds_nested_sources_sorted() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "Services/Worker.cs");
        touch(tmp.path(), "Program.cs");
        touch(tmp.path(), "readme.md");

        let files = find_source_files(tmp.path());
        assert_eq!(files, ["Program.cs", "Services/Worker.cs"]);
    }

    #[test]
    fn test_excludes_artifact_directories() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "Program.cs");
        touch(tmp.path(), "bin/Debug/net8.0/Generated.cs");
        touch(tmp.path(), "obj/Debug/Project.AssemblyInfo.cs");
        touch(tmp.path(), "wwwroot/node_modules/pkg/index.cs");
        touch(tmp.path(), "Nested/obj/Cache.cs");

        let files = find_source_files(tmp.path());
        assert_eq!(files, ["Program.cs"]);
    }

    #[test]
    fn test_empty_directory_yields_no_sources() {
        let tmp = TempDir::new().unwrap();
        assert!(find_source_files(tmp.path()).is_empty());
    }
}
