//! Dependency resolution for generated rules.
//!
//! Two independent contributions are unioned into one list: external NuGet
//! packages taken from the lock file, and sibling projects taken from the
//! manifest's `ProjectReference` items. The result is sorted and
//! deduplicated so output is deterministic regardless of filesystem
//! enumeration order.

use crate::core::lock::PackagesLock;
use crate::core::manifest::Manifest;
use crate::util::paths;

/// Resolve the dependency labels for a project.
///
/// `package_path` is the workspace-relative, forward-slash path of the
/// project directory (empty at the workspace root). An empty result means
/// the project has no dependencies; that is not an error.
pub fn resolve_deps(manifest: &Manifest, lock: &PackagesLock, package_path: &str) -> Vec<String> {
    let mut deps = Vec::new();

    // An empty target framework simply finds no lock entries; project
    // references below still resolve.
    let framework = manifest.resolved_properties().target_framework;
    let repo_key = nuget_repo_key(package_path);

    for (key, entry) in lock.framework_dependencies(&framework) {
        // Transitive entries are skipped: only explicit top-level
        // references become labels, so the downstream strict-deps
        // enforcement stays authoritative.
        if !entry.is_direct() {
            continue;
        }

        let target = format!("{}//{}/{}", repo_key, key, entry.resolved);
        tracing::debug!(
            "found package reference {} {} -> {}",
            entry.name,
            entry.resolved,
            target
        );
        deps.push(target);
    }

    for reference in manifest.project_references() {
        let target = project_reference_label(package_path, &reference.include);
        tracing::debug!("found project reference {} -> {}", reference.include, target);
        deps.push(target);
    }

    deps.sort();
    deps.dedup();
    deps
}

/// Repository key scoping NuGet packages to one project directory, so two
/// projects pinning different versions of the same package cannot collide.
fn nuget_repo_key(package_path: &str) -> String {
    format!("@nuget_{}", package_path.replace('/', "_").to_lowercase())
}

/// Label of the package directory a `ProjectReference` points at.
///
/// The include path uses Windows separators in the wild; it is normalized
/// to forward slashes, resolved against the referencing package, lexically
/// collapsed, and stripped of its `.csproj` basename.
pub fn project_reference_label(package_path: &str, include: &str) -> String {
    let include = include.replace('\\', "/");

    let joined = if package_path.is_empty() {
        include
    } else {
        format!("{package_path}/{include}")
    };

    let cleaned = paths::clean(&joined);
    let dir = match cleaned.rsplit_once('/') {
        Some((dir, _file)) => dir,
        None => ".",
    };

    format!("//{dir}")
}
