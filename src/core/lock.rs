//! `packages.lock.json` parsing.
//!
//! The lock file is a resolved-dependency snapshot keyed by target framework
//! and package name. Package name keys are normalized to lowercase for
//! canonical lookup while the original-case name is retained inside the
//! entry for human-facing output.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::core::errors::GenerateError;

/// Filename of the NuGet package lock file. Not to be confused with
/// `package-lock.json` used by npm.
pub const PACKAGES_LOCK_FILE_NAME: &str = "packages.lock.json";

/// Lock entry type marking an explicit top-level package reference.
pub const DIRECT_DEPENDENCY_TYPE: &str = "Direct";

/// A parsed `packages.lock.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackagesLock {
    #[serde(default)]
    pub version: i64,

    /// target framework -> lowercased package name -> entry.
    #[serde(default)]
    pub dependencies: HashMap<String, HashMap<String, LockDependency>>,
}

/// One resolved package entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LockDependency {
    /// Original-case package name, carried over from the JSON key during
    /// normalization.
    #[serde(skip)]
    pub name: String,

    /// `"Direct"` for explicit references, anything else for transitive or
    /// project-sourced entries. Passed through without validation.
    #[serde(default, rename = "type")]
    pub dep_type: String,

    /// Resolved version string. Passed through without validation.
    #[serde(default)]
    pub resolved: String,
    // contentHash is unusable here: it does not represent the archive hash
    // the downstream fetcher would verify.
}

impl LockDependency {
    /// Whether this entry is an explicit top-level reference.
    pub fn is_direct(&self) -> bool {
        self.dep_type == DIRECT_DEPENDENCY_TYPE
    }
}

impl PackagesLock {
    /// Load a lock file. An absent path is valid - projects without package
    /// references have no lock file - and yields the empty value.
    pub fn load(path: Option<&Path>) -> Result<Self, GenerateError> {
        let Some(path) = path else {
            return Ok(PackagesLock::default());
        };

        let content = std::fs::read_to_string(path).map_err(|e| GenerateError::LockParse {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

        Self::parse(&content, path)
    }

    /// Parse lock file content. `path` is recorded for diagnostics.
    pub fn parse(content: &str, path: &Path) -> Result<Self, GenerateError> {
        let mut lock: PackagesLock =
            serde_json::from_str(content).map_err(|e| GenerateError::LockParse {
                path: path.to_path_buf(),
                source: Box::new(e),
            })?;

        // Normalize every package key to lowercase, keeping the original
        // name inside the entry.
        for deps in lock.dependencies.values_mut() {
            for (name, mut dep) in std::mem::take(deps) {
                dep.name = name.clone();
                deps.insert(name.to_lowercase(), dep);
            }
        }

        Ok(lock)
    }

    /// Entries for one target framework. An unknown (or empty) framework
    /// yields no entries; that is "no external dependencies", not an error.
    pub fn framework_dependencies(
        &self,
        framework: &str,
    ) -> impl Iterator<Item = (&String, &LockDependency)> {
        self.dependencies
            .get(framework)
            .into_iter()
            .flat_map(|deps| deps.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
      "version": 1,
      "dependencies": {
        "net8.0": {
          "Newtonsoft.Json": {
            "type": "Direct",
            "requested": "[13.0.3, )",
            "resolved": "13.0.3",
            "contentHash": "HrC5BXdl00IP9zeV+0Z848QWPAoCr9P3bDEZguI+gkLcBKAOxix/tLEAAHC+UvDNPv4a2d18lOReHMOagPa+zQ=="
          },
          "System.Buffers": {
            "type": "Transitive",
            "resolved": "4.5.1"
          }
        }
      }
    }"#;

    #[test]
    fn test_parse_normalizes_keys_and_keeps_names() {
        let lock = PackagesLock::parse(SAMPLE, Path::new("packages.lock.json")).unwrap();
        assert_eq!(lock.version, 1);

        let deps = &lock.dependencies["net8.0"];
        let entry = &deps["newtonsoft.json"];
        assert_eq!(entry.name, "Newtonsoft.Json");
        assert_eq!(entry.resolved, "13.0.3");
        assert!(entry.is_direct());
        assert!(!deps["system.buffers"].is_direct());
    }

    #[test]
    fn test_absent_lock_is_empty() {
        let lock = PackagesLock::load(None).unwrap();
        assert_eq!(lock.version, 0);
        assert!(lock.dependencies.is_empty());
    }

    #[test]
    fn test_unknown_framework_yields_no_entries() {
        let lock = PackagesLock::parse(SAMPLE, Path::new("packages.lock.json")).unwrap();
        assert_eq!(lock.framework_dependencies("net6.0").count(), 0);
        assert_eq!(lock.framework_dependencies("").count(), 0);
        assert_eq!(lock.framework_dependencies("net8.0").count(), 2);
    }

    #[test]
    fn test_malformed_lock_is_a_parse_error() {
        let err = PackagesLock::parse("{not json", Path::new("packages.lock.json")).unwrap_err();
        assert!(matches!(err, GenerateError::LockParse { .. }));
    }

    #[test]
    fn test_missing_file_with_path_is_a_parse_error() {
        let err = PackagesLock::load(Some(Path::new("/nonexistent/packages.lock.json")))
            .unwrap_err();
        assert!(matches!(err, GenerateError::LockParse { .. }));
    }
}
