//! Per-directory rule generation.
//!
//! The host invokes this once per directory with a pre-parsed file listing
//! and consumes the produced rules. Both sides of that contract are modeled
//! here as plain value types ([`ProjectDirectoryView`] in,
//! [`GeneratedRules`] out) so the pipeline stays pure with respect to the
//! host: no shared state, no I/O other than reading the two project files
//! and discovering sources.

pub mod sources;
pub mod synth;

use std::path::PathBuf;

use crate::core::errors::GenerateError;
use crate::core::kind::classify;
use crate::core::lock::{PackagesLock, PACKAGES_LOCK_FILE_NAME};
use crate::core::manifest::Manifest;
use crate::core::rule::Rule;
use crate::resolver;

pub use synth::ExistingRules;

/// The host-supplied view of one directory.
#[derive(Debug, Clone)]
pub struct ProjectDirectoryView {
    /// Absolute path of the directory.
    pub dir: PathBuf,

    /// Workspace-relative, forward-slash path; empty at the workspace root.
    /// Doubles as the package identity for dependency labels.
    pub rel: String,

    /// Names of the regular files directly inside `dir`.
    pub regular_files: Vec<String>,
}

/// Rules produced for one directory: the primary project rule and, when
/// applicable, its global-usings companion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedRules {
    pub rules: Vec<Rule>,
}

/// Generate rules for one project directory.
///
/// Returns `Ok(None)` when the directory holds no project manifest - the
/// common case for ordinary directories, and not worth a diagnostic above
/// debug level. All `Err` cases are fatal for this directory only.
///
/// Running this twice over an unchanged directory, feeding the first pass's
/// rules back as `existing`, produces identical attribute sets.
pub fn generate_rules(
    view: &ProjectDirectoryView,
    existing: &ExistingRules,
) -> Result<Option<GeneratedRules>, GenerateError> {
    tracing::debug!("checking directory {}", view.dir.display());

    let Some(files) = find_project_files(view)? else {
        return Ok(None);
    };

    tracing::info!("found project manifest {}", files.manifest.display());

    let manifest = Manifest::load(&files.manifest)?;
    let lock = PackagesLock::load(files.lock.as_deref())?;
    let props = manifest.resolved_properties();

    let kind = classify(&manifest, &props)?;
    tracing::info!("identified project kind {}", kind.rule_kind());

    let deps = resolver::resolve_deps(&manifest, &lock, &view.rel);
    let srcs = sources::find_source_files(&view.dir);
    let name = rule_name(view);

    let rules = synth::synthesize_rules(
        kind, &name, &manifest, &lock, &props, &deps, &srcs, existing,
    );

    Ok(Some(GeneratedRules { rules }))
}

/// The primary rule is named after its directory.
fn rule_name(view: &ProjectDirectoryView) -> String {
    match view.rel.rsplit_once('/') {
        Some((_, base)) => base.to_string(),
        None if !view.rel.is_empty() => view.rel.clone(),
        None => view
            .dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

struct ProjectFiles {
    manifest: PathBuf,
    lock: Option<PathBuf>,
}

/// Locate the manifest and lock file in the directory listing. Exactly one
/// `.csproj` is required; zero is the quiet no-project case, and two or
/// more is an error the caller must not confuse with absence.
fn find_project_files(
    view: &ProjectDirectoryView,
) -> Result<Option<ProjectFiles>, GenerateError> {
    let mut manifest = None;

    for file in &view.regular_files {
        if file.ends_with(".csproj") {
            if manifest.is_some() {
                return Err(GenerateError::MultipleManifests {
                    dir: view.dir.clone(),
                });
            }
            manifest = Some(view.dir.join(file));
        }
    }

    let Some(manifest) = manifest else {
        return Ok(None);
    };

    let lock = view
        .regular_files
        .iter()
        .find(|f| f.as_str() == PACKAGES_LOCK_FILE_NAME)
        .map(|f| view.dir.join(f));

    Ok(Some(ProjectFiles { manifest, lock }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(dir: &str, rel: &str, files: &[&str]) -> ProjectDirectoryView {
        ProjectDirectoryView {
            dir: PathBuf::from(dir),
            rel: rel.to_string(),
            regular_files: files.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[test]
    fn test_no_manifest_is_none() {
        let v = view("/ws/docs", "docs", &["readme.md"]);
        let result = generate_rules(&v, &ExistingRules::default()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_multiple_manifests_is_an_error() {
        let v = view(
            "/ws/apps/both",
            "apps/both",
            &["A.csproj", "B.csproj"],
        );
        let err = generate_rules(&v, &ExistingRules::default()).unwrap_err();
        assert!(matches!(err, GenerateError::MultipleManifests { .. }));
    }

    #[test]
    fn test_rule_name_from_rel_path() {
        assert_eq!(rule_name(&view("/ws/apps/server", "apps/server", &[])), "server");
        assert_eq!(rule_name(&view("/ws/server", "server", &[])), "server");
        assert_eq!(rule_name(&view("/ws", "", &[])), "ws");
    }

    #[test]
    fn test_lock_file_is_optional_in_listing() {
        let v = view("/ws/apps/a", "apps/a", &["A.csproj", "Program.cs"]);
        let files = find_project_files(&v).unwrap().unwrap();
        assert!(files.lock.is_none());

        let v = view(
            "/ws/apps/a",
            "apps/a",
            &["A.csproj", "packages.lock.json"],
        );
        let files = find_project_files(&v).unwrap().unwrap();
        assert_eq!(
            files.lock.as_deref(),
            Some(std::path::Path::new("/ws/apps/a/packages.lock.json"))
        );
    }
}
