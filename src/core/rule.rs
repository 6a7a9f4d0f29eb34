//! Structured build-rule representation.
//!
//! A rule is what the generator hands to the host's build-file writer: a
//! kind, a name, and an insertion-ordered attribute map. Values stay
//! structured - the renderer owns concrete syntax. The private metadata
//! slot carries the parsed manifest and lock file through to the host's
//! resolve step and is never rendered.

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::core::lock::PackagesLock;
use crate::core::manifest::Manifest;

/// One record in a `usings` attribute. `alias`/`static` are omitted from
/// output when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsingRecord {
    pub include: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(rename = "static", skip_serializing_if = "Option::is_none")]
    pub is_static: Option<bool>,
}

/// An attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// A plain string.
    String(String),

    /// An ordered list of strings.
    Strings(Vec<String>),

    /// A literal file list plus glob patterns, rendered downstream as
    /// `[files...] + glob([patterns...])`.
    ListPlusGlob {
        files: Vec<String>,
        patterns: Vec<String>,
    },

    /// An ordered list of using-directive records.
    Usings(Vec<UsingRecord>),
}

impl AttrValue {
    /// Convenience constructor for a single-string value.
    pub fn string(value: impl Into<String>) -> Self {
        AttrValue::String(value.into())
    }

    /// Convenience constructor for a string-list value.
    pub fn strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AttrValue::Strings(values.into_iter().map(Into::into).collect())
    }
}

/// Metadata consumed by the host's resolve step, never rendered.
#[derive(Debug, Clone)]
pub struct RulePrivate {
    pub manifest: Manifest,
    pub lock: PackagesLock,
}

/// A structured, named build-rule declaration.
///
/// Attributes keep insertion order so regenerated output is stable against
/// pre-existing declarations: merging starts from the prior rule's map and
/// overwrites values in place.
#[derive(Debug, Clone, Default)]
pub struct Rule {
    kind: String,
    name: String,
    attrs: Vec<(String, AttrValue)>,
    private: Option<RulePrivate>,
}

impl Rule {
    /// Create an empty rule of the given kind and name.
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Rule {
            kind: kind.into(),
            name: name.into(),
            attrs: Vec::new(),
            private: None,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set an attribute, replacing any existing value in place so the
    /// attribute keeps its original position in the map.
    pub fn set_attr(&mut self, name: &str, value: AttrValue) {
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    /// Remove an attribute entirely. Used for flags that must not be left
    /// stale when their source property turns off.
    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(n, _)| n != name);
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// The string-list value of an attribute, if it has one.
    pub fn attr_strings(&self, name: &str) -> Option<&[String]> {
        match self.attr(name) {
            Some(AttrValue::Strings(values)) => Some(values),
            _ => None,
        }
    }

    /// Attributes in insertion order.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attrs.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn set_private(&mut self, private: RulePrivate) {
        self.private = Some(private);
    }

    pub fn private(&self) -> Option<&RulePrivate> {
        self.private.as_ref()
    }
}

/// Equality over the rendered parts only (kind, name, attributes); private
/// metadata is a pass-through for the host and deliberately ignored.
impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.name == other.name && self.attrs == other.attrs
    }
}

impl Serialize for Rule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Manual impl so the attribute map serializes in insertion order.
        struct Attrs<'a>(&'a [(String, AttrValue)]);

        impl Serialize for Attrs<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (name, value) in self.0 {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
        }

        let mut state = serializer.serialize_struct("Rule", 3)?;
        state.serialize_field("kind", &self.kind)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("attrs", &Attrs(&self.attrs))?;
        state.end()
    }
}
