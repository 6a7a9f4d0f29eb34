//! CLI integration tests for dotgen.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the dotgen binary command.
fn dotgen() -> Command {
    Command::cargo_bin("dotgen").unwrap()
}

/// Lay out a small workspace with one library project.
fn write_demo_workspace(root: &Path) {
    let demo = root.join("apps/demo");
    fs::create_dir_all(&demo).unwrap();

    fs::write(
        demo.join("demo.csproj"),
        r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
  </PropertyGroup>
  <ItemGroup>
    <PackageReference Include="Newtonsoft.Json" Version="13.0.3" />
  </ItemGroup>
</Project>"#,
    )
    .unwrap();

    fs::write(
        demo.join("packages.lock.json"),
        r#"{
  "version": 1,
  "dependencies": {
    "net8.0": {
      "Newtonsoft.Json": { "type": "Direct", "resolved": "13.0.3" }
    }
  }
}"#,
    )
    .unwrap();

    fs::write(demo.join("Demo.cs"), "// demo").unwrap();
}

#[test]
fn test_generate_summary_output() {
    let tmp = TempDir::new().unwrap();
    write_demo_workspace(tmp.path());

    dotgen()
        .args(["generate", "--root"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("csharp_library demo"));
}

#[test]
fn test_generate_json_output() {
    let tmp = TempDir::new().unwrap();
    write_demo_workspace(tmp.path());

    dotgen()
        .args(["generate", "--json", "--root"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"csharp_library\""))
        .stdout(predicate::str::contains(
            "@nuget_apps_demo//newtonsoft.json/13.0.3",
        ));
}

#[test]
fn test_broken_directory_does_not_abort_the_run() {
    let tmp = TempDir::new().unwrap();
    write_demo_workspace(tmp.path());

    // A directory with two manifests is fatal for itself only.
    let both = tmp.path().join("apps/both");
    fs::create_dir_all(&both).unwrap();
    fs::write(both.join("One.csproj"), "<Project Sdk=\"Microsoft.NET.Sdk\" />").unwrap();
    fs::write(both.join("Two.csproj"), "<Project Sdk=\"Microsoft.NET.Sdk\" />").unwrap();

    dotgen()
        .args(["generate", "--root"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("csharp_library demo"))
        .stderr(predicate::str::contains("multiple project manifests"));
}

#[test]
fn test_empty_workspace_generates_nothing() {
    let tmp = TempDir::new().unwrap();

    dotgen()
        .args(["generate", "--root"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_help_mentions_generate() {
    dotgen()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Generate build rules"));
}
