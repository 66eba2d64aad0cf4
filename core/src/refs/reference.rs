#![deny(missing_docs)]

//! # References
//!
//! A [`Reference`] is an immutable value describing a pointer to schema
//! content located elsewhere, plus that content once it has been loaded.
//! Every operation returns a new value; nothing is mutated in place.
//!
//! Variants are selected by [`ReferenceKind`]:
//! - `JsonSchema`: content is JSON / YAML, nested `$ref` keys become placeholders.
//! - `LateResolution`: the URI is a template whose `{{name}}` markers are
//!   filled from sibling variables at evaluation time.
//! - `Exotic`: opaque content, never parsed.

use crate::refs::container::ReferenceContainer;
use crate::refs::pointer::{extract_sub_tree, resolve_uri, split_fragment};
use crate::refs::value::{SchemaValue, REF_KEY};
use regex::Regex;
use serde_json::Value as JsonValue;
use std::sync::OnceLock;
use tracing::warn;

/// Namespace under which late-resolution variables live.
pub const VARIABLES_NAMESPACE: &str = "#/x-variables/";

/// Upper bound on template substitutions performed by a single evaluation.
pub const MAX_SUBSTITUTIONS: usize = 20;

/// Builds the URI of the late-resolution variable `name`.
pub fn variable_uri(name: &str) -> String {
    format!("{}{}", VARIABLES_NAMESPACE, name)
}

/// Parses raw content as JSON, falling back to YAML.
pub fn parse_document(raw: &str) -> Option<JsonValue> {
    serde_json::from_str(raw)
        .ok()
        .or_else(|| serde_yaml::from_str(raw).ok())
}

fn template_marker() -> &'static Regex {
    static MARKER_RE: OnceLock<Regex> = OnceLock::new();
    MARKER_RE.get_or_init(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("Invalid regex"))
}

/// Discriminates how a reference parses and expands its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceKind {
    /// JSON Schema `$ref` pointer.
    #[default]
    JsonSchema,
    /// Template reference filled from variables when evaluated.
    LateResolution,
    /// Opaque content stored verbatim.
    Exotic,
}

/// A resolvable pointer to a sub-document of schema data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reference {
    /// Variant tag.
    pub kind: ReferenceKind,
    /// Identifier of the referenced sub-document (document path + fragment).
    pub uri: String,
    /// Pointer text exactly as it appeared in the source.
    pub relative: Option<String>,
    /// Parsed content, with nested references held as placeholders.
    pub value: Option<SchemaValue>,
    /// True once the reference's own content has been loaded.
    pub resolved: bool,
    /// Nested references found while parsing `value`, in document order.
    pub dependencies: Vec<Reference>,
    /// Original text, kept when it could not be parsed.
    pub raw: Option<String>,
    /// Free-form description carried along for serializers.
    pub description: Option<String>,
}

impl Reference {
    /// Creates an unresolved reference of the given kind.
    pub fn new(kind: ReferenceKind, uri: impl Into<String>) -> Self {
        Self {
            kind,
            uri: uri.into(),
            ..Self::default()
        }
    }

    /// Creates an unresolved JSON Schema reference.
    pub fn json_schema(uri: impl Into<String>) -> Self {
        Self::new(ReferenceKind::JsonSchema, uri)
    }

    /// Creates an unresolved late-resolution reference.
    pub fn late(uri: impl Into<String>) -> Self {
        Self::new(ReferenceKind::LateResolution, uri)
    }

    /// Creates an unresolved opaque reference.
    pub fn exotic(uri: impl Into<String>) -> Self {
        Self::new(ReferenceKind::Exotic, uri)
    }

    /// Sets `value`.
    pub fn with_value(mut self, value: impl Into<SchemaValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Sets `resolved`.
    pub fn with_resolved(mut self, resolved: bool) -> Self {
        self.resolved = resolved;
        self
    }

    /// Sets `relative`.
    pub fn with_relative(mut self, relative: impl Into<String>) -> Self {
        self.relative = Some(relative.into());
        self
    }

    /// Sets `dependencies`.
    pub fn with_dependencies(mut self, dependencies: Vec<Reference>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Sets `raw`.
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    /// Sets `description`.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The pointer text to emit when this reference is left unexpanded.
    pub fn pointer(&self) -> &str {
        self.relative.as_deref().unwrap_or(&self.uri)
    }

    /// Document part of the URI (before `#`).
    ///
    /// Late-resolution and opaque references have no backing document and
    /// return `None`; they never trigger a fetch.
    pub fn data_uri(&self) -> Option<&str> {
        match self.kind {
            ReferenceKind::JsonSchema => Some(split_fragment(&self.uri).0),
            ReferenceKind::LateResolution | ReferenceKind::Exotic => None,
        }
    }

    /// Loads the reference's own content from `raw`.
    ///
    /// Never fails: content that cannot be parsed, or a fragment that does not
    /// exist in the parsed document, yields a resolved reference whose `raw`
    /// holds the original text and whose `value` is unset.
    pub fn resolve(&self, raw: &str) -> Reference {
        match self.kind {
            ReferenceKind::JsonSchema => self.resolve_json_schema(raw),
            ReferenceKind::LateResolution => self.mark_resolved(),
            ReferenceKind::Exotic => Reference {
                resolved: true,
                raw: Some(raw.to_string()),
                ..self.clone()
            },
        }
    }

    /// Loads an already-parsed document as this reference's content.
    ///
    /// No fragment extraction happens; nested `$ref` keys are replaced by
    /// placeholders and recorded as dependencies.
    pub fn resolve_value(&self, document: JsonValue) -> Reference {
        let mut dependencies = Vec::new();
        let value = self.substitute_refs(document, &mut dependencies);
        Reference {
            resolved: true,
            value: Some(value),
            dependencies,
            raw: None,
            ..self.clone()
        }
    }

    /// Rewrites the URI of every dependency, and of its placeholder in
    /// `value`, with `rebase`.
    pub fn rebase(&self, rebase: impl Fn(&str) -> String) -> Reference {
        Reference {
            value: self.value.as_ref().map(|value| value.rebase(&rebase)),
            dependencies: self
                .dependencies
                .iter()
                .map(|dependency| Reference {
                    uri: rebase(&dependency.uri),
                    ..dependency.clone()
                })
                .collect(),
            ..self.clone()
        }
    }

    /// Marks the reference as loaded without touching its content.
    pub fn mark_resolved(&self) -> Reference {
        Reference {
            resolved: true,
            ..self.clone()
        }
    }

    /// Marks the reference as loaded with no content ("acknowledged absent").
    pub fn acknowledge_absent(&self) -> Reference {
        Reference {
            resolved: true,
            value: None,
            dependencies: Vec::new(),
            ..self.clone()
        }
    }

    /// Expands nested placeholders `depth` levels deep using `container`.
    ///
    /// Each placeholder is replaced by the target's value resolved to
    /// `depth - 1`. Placeholders whose target is unknown, or has no value,
    /// are left in place. Depth 0 returns an identical copy.
    pub fn evaluate(&self, container: &ReferenceContainer, depth: usize) -> Reference {
        match self.kind {
            ReferenceKind::JsonSchema => Reference {
                kind: self.kind,
                uri: self.uri.clone(),
                relative: self.relative.clone(),
                value: self
                    .value
                    .as_ref()
                    .map(|value| expand(value, container, depth)),
                resolved: self.resolved,
                dependencies: self.dependencies.clone(),
                raw: self.raw.clone(),
                description: self.description.clone(),
            },
            ReferenceKind::LateResolution => self.evaluate_template(container, depth),
            ReferenceKind::Exotic => self.clone(),
        }
    }

    /// Renders the content as plain JSON, leaving placeholders at the depth
    /// boundary as pointer strings. Unparsed content renders as its raw text.
    pub fn to_json_schema(&self, depth: usize) -> Option<JsonValue> {
        match (&self.value, &self.raw) {
            (Some(value), _) => Some(value.to_json_schema(depth)),
            (None, Some(raw)) => Some(JsonValue::String(raw.clone())),
            (None, None) => None,
        }
    }

    fn resolve_json_schema(&self, raw: &str) -> Reference {
        let Some(document) = parse_document(raw) else {
            warn!(uri = %self.uri, "content is neither JSON nor YAML, keeping raw text");
            return self.recovered(raw);
        };

        let sub_tree = match split_fragment(&self.uri).1 {
            None => document,
            Some(fragment) => match extract_sub_tree(&document, fragment) {
                Some(tree) => tree.clone(),
                None => {
                    warn!(uri = %self.uri, "fragment not found in document, keeping raw text");
                    return self.recovered(raw);
                }
            },
        };

        self.resolve_value(sub_tree)
    }

    fn recovered(&self, raw: &str) -> Reference {
        Reference {
            resolved: true,
            value: None,
            dependencies: Vec::new(),
            raw: Some(raw.to_string()),
            ..self.clone()
        }
    }

    fn substitute_refs(&self, node: JsonValue, dependencies: &mut Vec<Reference>) -> SchemaValue {
        match node {
            JsonValue::Object(map) => SchemaValue::Object(
                map.into_iter()
                    .map(|(key, value)| {
                        let value = match (key.as_str(), value) {
                            (REF_KEY, JsonValue::String(pointer)) => {
                                let placeholder =
                                    Reference::json_schema(resolve_uri(&pointer, &self.uri))
                                        .with_relative(pointer);
                                dependencies.push(placeholder.clone());
                                SchemaValue::from(placeholder)
                            }
                            (_, value) => self.substitute_refs(value, dependencies),
                        };
                        (key, value)
                    })
                    .collect(),
            ),
            JsonValue::Array(items) => SchemaValue::Array(
                items
                    .into_iter()
                    .map(|item| self.substitute_refs(item, dependencies))
                    .collect(),
            ),
            other => SchemaValue::from(other),
        }
    }

    fn evaluate_template(&self, container: &ReferenceContainer, depth: usize) -> Reference {
        if self.value.is_some() || depth == 0 {
            return self.clone();
        }
        let Some(template) = self.uri.strip_prefix(VARIABLES_NAMESPACE) else {
            return self.clone();
        };

        let mut current = template.to_string();
        for _ in 0..MAX_SUBSTITUTIONS {
            let Some(captures) = template_marker().captures(&current) else {
                break;
            };
            let (Some(marker), Some(name)) = (captures.get(0), captures.get(1)) else {
                break;
            };
            let replacement = self.variable(container, name.as_str(), depth);
            let next = format!(
                "{}{}{}",
                &current[..marker.start()],
                replacement,
                &current[marker.end()..]
            );
            if next == current {
                break;
            }
            current = next;
        }

        Reference {
            value: (current != "null").then(|| SchemaValue::String(current)),
            ..self.clone()
        }
    }

    fn variable(&self, container: &ReferenceContainer, name: &str, depth: usize) -> String {
        let uri = variable_uri(name);
        if uri == self.uri {
            return name.to_string();
        }
        match container
            .resolve(&uri, depth - 1)
            .and_then(|reference| reference.value)
        {
            Some(SchemaValue::String(s)) => s,
            Some(other) => other.to_json_schema(0).to_string(),
            None => name.to_string(),
        }
    }
}

fn expand(value: &SchemaValue, container: &ReferenceContainer, depth: usize) -> SchemaValue {
    if depth == 0 {
        return value.clone();
    }
    match value {
        SchemaValue::Ref(placeholder) => container
            .resolve(&placeholder.uri, depth - 1)
            .and_then(|target| target.value)
            .unwrap_or_else(|| value.clone()),
        SchemaValue::Array(items) => SchemaValue::Array(
            items
                .iter()
                .map(|item| expand(item, container, depth))
                .collect(),
        ),
        SchemaValue::Object(map) => SchemaValue::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), expand(item, container, depth)))
                .collect(),
        ),
        other => other.clone(),
    }
}
