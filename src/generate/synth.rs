//! Rule synthesis and merging.
//!
//! Builds the primary rule for a project (and, when the project declares
//! using directives or implicit usings, a companion global-usings rule),
//! merging against same-kind/same-name rules from a prior generation pass
//! so manual attribute edits survive regeneration.

use crate::core::kind::{ProjectKind, CSHARP_GLOBALUSINGS_KIND, WEB_SDK};
use crate::core::lock::PackagesLock;
use crate::core::manifest::{Manifest, ResolvedProperties};
use crate::core::rule::{AttrValue, Rule, RulePrivate, UsingRecord};

/// Pre-existing rules from a prior generation pass, looked up by exact
/// (kind, name). An explicit snapshot rather than a handle into the host's
/// build-file tree, so synthesis stays free of shared mutable state.
#[derive(Debug, Clone, Default)]
pub struct ExistingRules {
    rules: Vec<Rule>,
}

impl ExistingRules {
    pub fn new(rules: Vec<Rule>) -> Self {
        ExistingRules { rules }
    }

    pub fn get(&self, kind: &str, name: &str) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|r| r.kind() == kind && r.name() == name)
    }
}

/// Synthesize the rules for one project.
///
/// Returns the primary rule first, followed by the companion global-usings
/// rule when one applies.
#[allow(clippy::too_many_arguments)]
pub fn synthesize_rules(
    kind: ProjectKind,
    name: &str,
    manifest: &Manifest,
    lock: &PackagesLock,
    props: &ResolvedProperties,
    deps: &[String],
    srcs: &[String],
    existing: &ExistingRules,
) -> Vec<Rule> {
    let mut rule = existing
        .get(kind.rule_kind(), name)
        .cloned()
        .unwrap_or_else(|| Rule::new(kind.rule_kind(), name));

    let usings: Vec<&crate::core::manifest::Using> = manifest.usings().collect();
    let wants_companion = !usings.is_empty() || props.implicit_usings;
    let companion_name = format!("{name}.GlobalUsings");

    // srcs and target_frameworks are only meaningful once the project has
    // at least one discovered source file.
    if !srcs.is_empty() {
        let mut src_list = srcs.to_vec();
        if wants_companion {
            src_list.push(format!(":{companion_name}"));
        }
        rule.set_attr("srcs", AttrValue::Strings(src_list));
        rule.set_attr(
            "target_frameworks",
            AttrValue::strings([props.target_framework.clone()]),
        );
    }

    if kind == ProjectKind::Binary && manifest.sdk == WEB_SDK {
        rule.set_attr("project_sdk", AttrValue::string("web"));
        rule.set_attr(
            "appsetting_files",
            AttrValue::ListPlusGlob {
                files: vec!["appsettings.json".to_string()],
                patterns: vec!["appsettings.*.json".to_string()],
            },
        );
    }

    if kind == ProjectKind::Library {
        rule.set_attr("visibility", AttrValue::strings(["//visibility:public"]));
    }

    // Mirror the resolved flag each pass: removal, not a stale leftover,
    // when the property turns off.
    if props.nullable {
        rule.set_attr("nullable", AttrValue::string("enable"));
    } else {
        rule.remove_attr("nullable");
    }

    if !deps.is_empty() {
        rule.set_attr("deps", AttrValue::Strings(deps.to_vec()));
    }

    rule.set_private(RulePrivate {
        manifest: manifest.clone(),
        lock: lock.clone(),
    });

    let mut rules = vec![rule];

    if wants_companion {
        let mut companion = existing
            .get(CSHARP_GLOBALUSINGS_KIND, &companion_name)
            .cloned()
            .unwrap_or_else(|| Rule::new(CSHARP_GLOBALUSINGS_KIND, &companion_name));

        let records: Vec<UsingRecord> = usings
            .iter()
            .map(|u| UsingRecord {
                include: u.include.clone(),
                alias: u.alias.clone(),
                is_static: u.is_static().then_some(true),
            })
            .collect();
        companion.set_attr("usings", AttrValue::Usings(records));

        if props.implicit_usings {
            companion.set_attr("sdk", AttrValue::string(manifest.sdk.clone()));
        } else {
            companion.remove_attr("sdk");
        }

        rules.push(companion);
    }

    rules
}
