#![deny(missing_docs)]

//! # Schema Values
//!
//! The structural tree carried by a [`Reference`]. It mirrors a JSON document,
//! except that `$ref` occurrences are held as [`SchemaValue::Ref`]
//! placeholders until they get expanded.
//!
//! Trees are plain owned values: cloning one never shares substructure, so an
//! expansion computed for one depth can be reused as a building block for
//! another without aliasing.

use crate::refs::reference::Reference;
use indexmap::IndexMap;
use serde_json::{Map, Number, Value as JsonValue};

/// Object key that marks a JSON Schema reference.
pub const REF_KEY: &str = "$ref";

/// A JSON-like value that may contain unexpanded reference placeholders.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaValue {
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number.
    Number(Number),
    /// JSON string.
    String(String),
    /// JSON array.
    Array(Vec<SchemaValue>),
    /// JSON object, in document order.
    Object(IndexMap<String, SchemaValue>),
    /// A nested reference that has not been expanded.
    Ref(Box<Reference>),
}

impl SchemaValue {
    /// Returns the value stored under `key` if this is an object.
    pub fn get(&self, key: &str) -> Option<&SchemaValue> {
        match self {
            SchemaValue::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Returns the placeholder if this node is an unexpanded reference.
    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            SchemaValue::Ref(reference) => Some(reference),
            _ => None,
        }
    }

    /// Returns the string content if this node is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SchemaValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Rewrites the URI of every placeholder in the tree with `rebase`.
    pub fn rebase<F: Fn(&str) -> String>(&self, rebase: &F) -> SchemaValue {
        match self {
            SchemaValue::Ref(reference) => SchemaValue::Ref(Box::new(Reference {
                uri: rebase(&reference.uri),
                ..(**reference).clone()
            })),
            SchemaValue::Object(map) => SchemaValue::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.rebase(rebase)))
                    .collect(),
            ),
            SchemaValue::Array(items) => {
                SchemaValue::Array(items.iter().map(|item| item.rebase(rebase)).collect())
            }
            other => other.clone(),
        }
    }

    /// Collects every placeholder still present in the tree, in document order.
    pub fn placeholders(&self) -> Vec<&Reference> {
        let mut found = Vec::new();
        self.collect_placeholders(&mut found);
        found
    }

    fn collect_placeholders<'a>(&'a self, found: &mut Vec<&'a Reference>) {
        match self {
            SchemaValue::Ref(reference) => found.push(reference),
            SchemaValue::Array(items) => items.iter().for_each(|i| i.collect_placeholders(found)),
            SchemaValue::Object(map) => map.values().for_each(|v| v.collect_placeholders(found)),
            _ => {}
        }
    }

    /// Renders the tree as plain JSON.
    ///
    /// Placeholders are inlined while `depth` remains and the placeholder
    /// carries content of its own; everything else at the boundary becomes the
    /// placeholder's pointer string (e.g. `"#/definitions/Pet"`).
    pub fn to_json_schema(&self, depth: usize) -> JsonValue {
        match self {
            SchemaValue::Null => JsonValue::Null,
            SchemaValue::Bool(b) => JsonValue::Bool(*b),
            SchemaValue::Number(n) => JsonValue::Number(n.clone()),
            SchemaValue::String(s) => JsonValue::String(s.clone()),
            SchemaValue::Array(items) => {
                JsonValue::Array(items.iter().map(|i| i.to_json_schema(depth)).collect())
            }
            SchemaValue::Object(map) => JsonValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json_schema(depth)))
                    .collect::<Map<String, JsonValue>>(),
            ),
            SchemaValue::Ref(reference) => match (&reference.value, depth) {
                (Some(value), d) if d > 0 => value.to_json_schema(d - 1),
                _ => JsonValue::String(reference.pointer().to_string()),
            },
        }
    }
}

impl From<JsonValue> for SchemaValue {
    /// Converts plain JSON verbatim. `$ref` keys are kept as strings; use
    /// [`Reference::resolve`] to obtain placeholders.
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => SchemaValue::Null,
            JsonValue::Bool(b) => SchemaValue::Bool(b),
            JsonValue::Number(n) => SchemaValue::Number(n),
            JsonValue::String(s) => SchemaValue::String(s),
            JsonValue::Array(items) => {
                SchemaValue::Array(items.into_iter().map(SchemaValue::from).collect())
            }
            JsonValue::Object(map) => SchemaValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, SchemaValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for SchemaValue {
    fn from(value: &str) -> Self {
        SchemaValue::String(value.to_string())
    }
}

impl From<Reference> for SchemaValue {
    fn from(reference: Reference) -> Self {
        SchemaValue::Ref(Box::new(reference))
    }
}
