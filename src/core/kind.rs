//! Project-kind classification and rule-kind metadata.

use crate::core::errors::GenerateError;
use crate::core::manifest::{Manifest, ResolvedProperties};

/// Rule kind names shared with the downstream rule definitions.
pub const CSHARP_LIBRARY_KIND: &str = "csharp_library";
pub const CSHARP_BINARY_KIND: &str = "csharp_binary";
pub const CSHARP_TEST_KIND: &str = "csharp_test";
pub const CSHARP_NUNIT_TEST_KIND: &str = "csharp_nunit_test";
pub const CSHARP_GLOBALUSINGS_KIND: &str = "csharp_globalusings";

/// SDK name that forces the binary kind and enables web-specific attributes.
pub const WEB_SDK: &str = "Microsoft.NET.Sdk.Web";

/// The build kind of a project directory. Classification is total: every
/// project resolves to exactly one kind or fails with a typed error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    Library,
    Binary,
    Test,
    NUnitTest,
}

impl ProjectKind {
    /// The rule kind string this project kind generates.
    pub fn rule_kind(self) -> &'static str {
        match self {
            ProjectKind::Library => CSHARP_LIBRARY_KIND,
            ProjectKind::Binary => CSHARP_BINARY_KIND,
            ProjectKind::Test => CSHARP_TEST_KIND,
            ProjectKind::NUnitTest => CSHARP_NUNIT_TEST_KIND,
        }
    }
}

/// Classify a project from its manifest and resolved properties.
///
/// Precedence is fixed; the first matching arm wins:
/// 1. NUnit package reference in a test project -> NUnit test. The NUnit
///    check alone never changes the kind of a non-test project.
/// 2. Test project flag -> generic test.
/// 3. `Exe` output or the web SDK -> binary.
/// 4. `Library` output -> library.
///
/// An empty resolved target framework is not a classification concern; it
/// only matters at framework-qualified lock lookups.
pub fn classify(
    manifest: &Manifest,
    props: &ResolvedProperties,
) -> Result<ProjectKind, GenerateError> {
    // All item groups are scanned, regardless of which property group set
    // the test flag.
    let references_nunit = manifest
        .package_references()
        .any(|r| r.include.to_ascii_lowercase().contains("nunit"));

    if references_nunit && props.is_test_project {
        return Ok(ProjectKind::NUnitTest);
    }

    if props.is_test_project {
        return Ok(ProjectKind::Test);
    }

    if props.output_type == "Exe" || manifest.sdk == WEB_SDK {
        return Ok(ProjectKind::Binary);
    }

    if props.output_type == "Library" {
        return Ok(ProjectKind::Library);
    }

    Err(GenerateError::Classification {
        path: manifest.path.clone(),
    })
}

/// How the host merges rules of one kind: which attributes make the rule
/// worth keeping, which are merged against manual edits, and which are
/// filled in by dependency resolution.
#[derive(Debug, Clone, Copy)]
pub struct KindInfo {
    pub kind: &'static str,
    pub non_empty_attrs: &'static [&'static str],
    pub mergeable_attrs: &'static [&'static str],
    pub resolve_attrs: &'static [&'static str],
}

/// Merge metadata for every rule kind this generator produces.
pub const KINDS: &[KindInfo] = &[
    KindInfo {
        kind: CSHARP_LIBRARY_KIND,
        non_empty_attrs: &["srcs", "target_frameworks"],
        mergeable_attrs: &["srcs"],
        resolve_attrs: &["deps"],
    },
    KindInfo {
        kind: CSHARP_BINARY_KIND,
        non_empty_attrs: &["srcs", "target_frameworks"],
        mergeable_attrs: &["srcs"],
        resolve_attrs: &["deps"],
    },
    KindInfo {
        kind: CSHARP_TEST_KIND,
        non_empty_attrs: &["srcs", "target_frameworks"],
        mergeable_attrs: &["srcs"],
        resolve_attrs: &["deps"],
    },
    KindInfo {
        kind: CSHARP_NUNIT_TEST_KIND,
        non_empty_attrs: &["srcs", "target_frameworks"],
        mergeable_attrs: &["srcs"],
        resolve_attrs: &["deps"],
    },
    KindInfo {
        kind: CSHARP_GLOBALUSINGS_KIND,
        non_empty_attrs: &["usings"],
        mergeable_attrs: &["usings"],
        resolve_attrs: &[],
    },
];

/// Look up merge metadata for a rule kind.
pub fn kind_info(kind: &str) -> Option<&'static KindInfo> {
    KINDS.iter().find(|k| k.kind == kind)
}

/// A load statement the host emits for generated kinds.
#[derive(Debug, Clone, Copy)]
pub struct LoadInfo {
    pub file: &'static str,
    pub symbols: &'static [&'static str],
}

/// Which symbols the host imports from which definition files.
pub const LOADS: &[LoadInfo] = &[
    LoadInfo {
        file: "@rules_dotnet//dotnet:defs.bzl",
        symbols: &[
            CSHARP_BINARY_KIND,
            CSHARP_LIBRARY_KIND,
            CSHARP_TEST_KIND,
            CSHARP_NUNIT_TEST_KIND,
        ],
    },
    LoadInfo {
        file: "//prelude/dotnet:defs.bzl",
        symbols: &[CSHARP_GLOBALUSINGS_KIND],
    },
];
