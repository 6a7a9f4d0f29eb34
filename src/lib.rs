//! Dotgen - build-rule generation for .NET project trees.
//!
//! This crate provides the core pipeline: `.csproj` manifest parsing with
//! multi-group property resolution, `packages.lock.json` interpretation,
//! project-kind classification, dependency resolution, and synthesis of
//! structured build rules merged against prior generation passes.

pub mod core;
pub mod generate;
pub mod resolver;
pub mod util;

pub use crate::core::errors::GenerateError;
pub use crate::core::kind::ProjectKind;
pub use crate::core::lock::PackagesLock;
pub use crate::core::manifest::Manifest;
pub use crate::core::rule::Rule;
pub use generate::{generate_rules, ExistingRules, GeneratedRules, ProjectDirectoryView};
