//! `.csproj` manifest parsing and property resolution.
//!
//! A project manifest is an MSBuild XML document: a `<Project>` root element
//! carrying an `Sdk` attribute, repeated `<PropertyGroup>` blocks, and
//! repeated `<ItemGroup>` blocks. Parsing goes through `roxmltree` into
//! fully owned types. Nothing is evaluated beyond the handful of properties
//! the generator tracks - this is not an MSBuild evaluator.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::errors::{Cause, GenerateError};

/// A parsed project manifest.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    /// Path this manifest was loaded from (diagnostics only).
    pub path: PathBuf,

    /// The `Sdk` attribute on the root element (empty when absent).
    pub sdk: String,

    /// `<PropertyGroup>` blocks in document order.
    pub property_groups: Vec<PropertyGroup>,

    /// `<ItemGroup>` blocks in document order.
    pub item_groups: Vec<ItemGroup>,
}

/// One `<PropertyGroup>` block.
///
/// Each field holds the raw token from the document, or `None` when the
/// element is absent or empty. Enablement semantics are applied at
/// resolution time, not here.
#[derive(Debug, Clone, Default)]
pub struct PropertyGroup {
    pub output_type: Option<String>,
    pub target_framework: Option<String>,
    pub is_test_project: Option<String>,
    pub nullable: Option<String>,
    pub implicit_usings: Option<String>,
}

/// One `<ItemGroup>` block.
#[derive(Debug, Clone, Default)]
pub struct ItemGroup {
    pub compiles: Vec<Compile>,
    pub package_references: Vec<PackageReference>,
    pub project_references: Vec<ProjectReference>,
    pub usings: Vec<Using>,
}

/// A `<Compile Include="..."/>` item.
#[derive(Debug, Clone)]
pub struct Compile {
    pub include: String,
}

/// A `<PackageReference Include="..." Version="..."/>` item.
#[derive(Debug, Clone)]
pub struct PackageReference {
    pub include: String,
    pub version: Option<String>,
}

/// A `<ProjectReference Include="..."/>` item.
#[derive(Debug, Clone)]
pub struct ProjectReference {
    pub include: String,
}

/// A `<Using Include="..." Alias="..." Static="..."/>` directive.
#[derive(Debug, Clone)]
pub struct Using {
    pub include: String,
    pub alias: Option<String>,
    /// Raw `Static` token; see [`Using::is_static`].
    pub static_token: Option<String>,
}

impl Using {
    /// Whether this directive is a `using static`.
    pub fn is_static(&self) -> bool {
        self.static_token.as_deref().is_some_and(is_enabled)
    }
}

/// Properties resolved across all property groups.
///
/// Several groups may each set a subset of fields; for every field the last
/// group that supplies a non-empty token wins. The source grammar nominally
/// allows `TargetFramework` to repeat, so the resolved value is whatever the
/// last group said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProperties {
    pub implicit_usings: bool,
    pub is_test_project: bool,
    pub nullable: bool,
    /// `"Library"` when never set.
    pub output_type: String,
    /// Empty when never set. Callers that need a framework-qualified lock
    /// lookup must treat the empty string as "no entries".
    pub target_framework: String,
}

impl Default for ResolvedProperties {
    fn default() -> Self {
        ResolvedProperties {
            implicit_usings: false,
            is_test_project: false,
            nullable: false,
            output_type: "Library".to_string(),
            target_framework: String::new(),
        }
    }
}

/// Root element was not `<Project>`.
#[derive(Debug)]
struct UnexpectedRoot(String);

impl fmt::Display for UnexpectedRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected root element <Project>, found <{}>", self.0)
    }
}

impl std::error::Error for UnexpectedRoot {}

impl Manifest {
    /// Load a manifest from a file path.
    pub fn load(path: &Path) -> Result<Self, GenerateError> {
        let content = std::fs::read_to_string(path).map_err(|e| GenerateError::ManifestParse {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

        Self::parse(&content, path)
    }

    /// Parse manifest content. `path` is recorded for diagnostics.
    pub fn parse(content: &str, path: &Path) -> Result<Self, GenerateError> {
        let parse_error = |source: Cause| GenerateError::ManifestParse {
            path: path.to_path_buf(),
            source,
        };

        let doc = roxmltree::Document::parse(content).map_err(|e| parse_error(Box::new(e)))?;
        let root = doc.root_element();
        if !root.has_tag_name("Project") {
            return Err(parse_error(Box::new(UnexpectedRoot(
                root.tag_name().name().to_string(),
            ))));
        }

        let sdk = root.attribute("Sdk").unwrap_or_default().to_string();

        let mut property_groups = Vec::new();
        let mut item_groups = Vec::new();
        for node in root.children().filter(|n| n.is_element()) {
            match node.tag_name().name() {
                "PropertyGroup" => property_groups.push(parse_property_group(node)),
                "ItemGroup" => item_groups.push(parse_item_group(node)),
                _ => {}
            }
        }

        Ok(Manifest {
            path: path.to_path_buf(),
            sdk,
            property_groups,
            item_groups,
        })
    }

    /// Compute the resolved-properties view over all property groups.
    pub fn resolved_properties(&self) -> ResolvedProperties {
        let mut props = ResolvedProperties::default();

        for group in &self.property_groups {
            if let Some(value) = group.implicit_usings.as_deref() {
                props.implicit_usings = is_enabled(value);
            }
            if let Some(value) = group.is_test_project.as_deref() {
                props.is_test_project = is_enabled(value);
            }
            if let Some(value) = group.nullable.as_deref() {
                props.nullable = is_enabled(value);
            }
            if let Some(value) = group.output_type.as_deref() {
                props.output_type = value.to_string();
            }
            if let Some(value) = group.target_framework.as_deref() {
                props.target_framework = value.to_string();
            }
        }

        props
    }

    /// All package references across item groups, in document order.
    pub fn package_references(&self) -> impl Iterator<Item = &PackageReference> {
        self.item_groups.iter().flat_map(|g| &g.package_references)
    }

    /// All project references across item groups, in document order.
    pub fn project_references(&self) -> impl Iterator<Item = &ProjectReference> {
        self.item_groups.iter().flat_map(|g| &g.project_references)
    }

    /// All using directives across item groups, in document order.
    pub fn usings(&self) -> impl Iterator<Item = &Using> {
        self.item_groups.iter().flat_map(|g| &g.usings)
    }
}

/// A string property is enabled iff its lowercased value is `true` or
/// `enable`. Applies uniformly to `IsTestProject`, `Nullable`,
/// `ImplicitUsings`, and the `Static` flag on using directives.
pub fn is_enabled(value: &str) -> bool {
    let text = value.to_ascii_lowercase();
    text == "true" || text == "enable"
}

fn parse_property_group(node: roxmltree::Node) -> PropertyGroup {
    PropertyGroup {
        output_type: child_text(node, "OutputType"),
        target_framework: child_text(node, "TargetFramework"),
        is_test_project: child_text(node, "IsTestProject"),
        nullable: child_text(node, "Nullable"),
        implicit_usings: child_text(node, "ImplicitUsings"),
    }
}

fn parse_item_group(node: roxmltree::Node) -> ItemGroup {
    let mut group = ItemGroup::default();

    for item in node.children().filter(|n| n.is_element()) {
        match item.tag_name().name() {
            "Compile" => group.compiles.push(Compile {
                include: attr(item, "Include"),
            }),
            "PackageReference" => group.package_references.push(PackageReference {
                include: attr(item, "Include"),
                version: item.attribute("Version").map(str::to_string),
            }),
            "ProjectReference" => group.project_references.push(ProjectReference {
                include: attr(item, "Include"),
            }),
            "Using" => group.usings.push(Using {
                include: attr(item, "Include"),
                alias: non_empty_attr(item, "Alias"),
                static_token: non_empty_attr(item, "Static"),
            }),
            _ => {}
        }
    }

    group
}

/// Trimmed text content of a named child element; `None` when the element
/// is absent or holds only whitespace.
fn child_text(parent: roxmltree::Node, tag: &str) -> Option<String> {
    let child = parent
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == tag)?;
    let text = child.text().unwrap_or_default().trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn attr(node: roxmltree::Node, name: &str) -> String {
    node.attribute(name).unwrap_or_default().to_string()
}

fn non_empty_attr(node: roxmltree::Node, name: &str) -> Option<String> {
    node.attribute(name)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Manifest {
        Manifest::parse(content, Path::new("Test.csproj")).unwrap()
    }

    #[test]
    fn test_parse_basic_manifest() {
        let manifest = parse(
            r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <OutputType>Exe</OutputType>
    <TargetFramework>net8.0</TargetFramework>
  </PropertyGroup>
  <ItemGroup>
    <PackageReference Include="Newtonsoft.Json" Version="13.0.3" />
    <ProjectReference Include="..\Lib\Lib.csproj" />
  </ItemGroup>
</Project>"#,
        );

        assert_eq!(manifest.sdk, "Microsoft.NET.Sdk");
        assert_eq!(manifest.property_groups.len(), 1);
        assert_eq!(manifest.item_groups.len(), 1);

        let props = manifest.resolved_properties();
        assert_eq!(props.output_type, "Exe");
        assert_eq!(props.target_framework, "net8.0");
        assert!(!props.is_test_project);

        let pkg: Vec<_> = manifest.package_references().collect();
        assert_eq!(pkg.len(), 1);
        assert_eq!(pkg[0].include, "Newtonsoft.Json");
        assert_eq!(pkg[0].version.as_deref(), Some("13.0.3"));

        let proj: Vec<_> = manifest.project_references().collect();
        assert_eq!(proj.len(), 1);
        assert_eq!(proj[0].include, "..\\Lib\\Lib.csproj");
    }

    #[test]
    fn test_last_property_group_wins_per_field() {
        let manifest = parse(
            r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <OutputType>Exe</OutputType>
    <Nullable>enable</Nullable>
  </PropertyGroup>
  <PropertyGroup>
    <TargetFramework>net7.0</TargetFramework>
  </PropertyGroup>
  <PropertyGroup>
    <OutputType>Library</OutputType>
    <TargetFramework>net8.0</TargetFramework>
  </PropertyGroup>
</Project>"#,
        );

        let props = manifest.resolved_properties();
        // The middle group leaves OutputType unset; only groups that supply
        // a value count for that field.
        assert_eq!(props.output_type, "Library");
        assert_eq!(props.target_framework, "net8.0");
        assert!(props.nullable);
    }

    #[test]
    fn test_later_group_can_disable_a_flag() {
        let manifest = parse(
            r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <Nullable>enable</Nullable>
  </PropertyGroup>
  <PropertyGroup>
    <Nullable>disable</Nullable>
  </PropertyGroup>
</Project>"#,
        );

        assert!(!manifest.resolved_properties().nullable);
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let manifest = parse(r#"<Project Sdk="Microsoft.NET.Sdk"></Project>"#);

        let props = manifest.resolved_properties();
        assert_eq!(props.output_type, "Library");
        assert_eq!(props.target_framework, "");
        assert!(!props.implicit_usings);
        assert!(!props.is_test_project);
        assert!(!props.nullable);
    }

    #[test]
    fn test_enablement_tokens() {
        assert!(is_enabled("true"));
        assert!(is_enabled("True"));
        assert!(is_enabled("enable"));
        assert!(is_enabled("ENABLE"));
        assert!(!is_enabled("false"));
        assert!(!is_enabled("disable"));
        assert!(!is_enabled(""));
    }

    #[test]
    fn test_parse_usings() {
        let manifest = parse(
            r#"<Project Sdk="Microsoft.NET.Sdk">
  <ItemGroup>
    <Using Include="System.Math" Static="true" />
    <Using Include="MyApp.Json" Alias="Json" />
    <Using Include="System.IO" />
  </ItemGroup>
</Project>"#,
        );

        let usings: Vec<_> = manifest.usings().collect();
        assert_eq!(usings.len(), 3);
        assert!(usings[0].is_static());
        assert_eq!(usings[1].alias.as_deref(), Some("Json"));
        assert!(!usings[2].is_static());
        assert!(usings[2].alias.is_none());
    }

    #[test]
    fn test_malformed_xml_is_a_parse_error() {
        let err = Manifest::parse("<Project", Path::new("Bad.csproj")).unwrap_err();
        assert!(matches!(err, GenerateError::ManifestParse { .. }));
        assert!(err.to_string().contains("Bad.csproj"));
    }

    #[test]
    fn test_wrong_root_element_is_a_parse_error() {
        let err = Manifest::parse("<Potato />", Path::new("Bad.csproj")).unwrap_err();
        assert!(matches!(err, GenerateError::ManifestParse { .. }));
    }

    #[test]
    fn test_missing_file_is_a_parse_error() {
        let err = Manifest::load(Path::new("/nonexistent/Nope.csproj")).unwrap_err();
        assert!(matches!(err, GenerateError::ManifestParse { .. }));
    }
}
