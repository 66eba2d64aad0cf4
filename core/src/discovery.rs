//! # Discovery
//!
//! Builds the initial [`Context`] of a document: one reference per named
//! definition, one per `$ref` target, and one late-resolution reference per
//! entry of the top-level `x-variables` map.

use crate::error::{AppError, AppResult};
use crate::refs::pointer::{encode_pointer_segment, resolve_uri};
use crate::refs::reference::parse_document;
use crate::refs::{variable_uri, Reference, ReferenceContainer, REF_KEY};
use crate::resolver::params::literal;
use crate::resolver::{Context, Item, SCHEMAS_DOMAIN};
use serde_json::Value as JsonValue;
use tracing::debug;

/// Domain holding late-resolution variables.
pub const VARIABLES_DOMAIN: &str = "variables";

/// Sections whose entries are named definitions.
const DEFINITION_SECTIONS: &[&str] = &["definitions"];

/// Parses `item` and registers every reference it declares or uses.
///
/// Unlike the reference engine, this fails on content that is neither JSON
/// nor YAML.
pub fn discover_references(item: &Item) -> AppResult<Context> {
    let document = parse_document(&item.content).ok_or_else(|| {
        AppError::General(format!(
            "Failed to parse {} as JSON or YAML",
            item.location.as_deref().unwrap_or("document")
        ))
    })?;

    let mut schemas = Vec::new();
    collect_definitions(&document, &mut schemas);
    collect_refs(&document, &mut schemas);
    debug!(count = schemas.len(), "discovered schema references");

    let mut context = Context::new();
    if let Some(container) = context.container_mut(SCHEMAS_DOMAIN) {
        *container = std::mem::take(container).create(schemas);
    }

    if let Some(JsonValue::Object(variables)) = document.get("x-variables") {
        let variables = variables.iter().map(|(name, value)| Reference {
            value: literal(value),
            ..Reference::late(variable_uri(name)).with_resolved(true)
        });
        context = context.insert(
            VARIABLES_DOMAIN,
            ReferenceContainer::named(VARIABLES_DOMAIN).create(variables),
        );
    }

    Ok(context)
}

fn definition_ref(path: &[&str]) -> Reference {
    let pointer = path
        .iter()
        .map(|segment| encode_pointer_segment(segment))
        .collect::<Vec<_>>()
        .join("/");
    let uri = format!("#/{}", pointer);
    Reference::json_schema(uri.clone()).with_relative(uri)
}

fn collect_definitions(document: &JsonValue, out: &mut Vec<Reference>) {
    for section in DEFINITION_SECTIONS {
        if let Some(JsonValue::Object(entries)) = document.get(*section) {
            out.extend(entries.keys().map(|name| definition_ref(&[*section, name.as_str()])));
        }
    }

    if let Some(JsonValue::Object(components)) = document.get("components") {
        for (section, entries) in components {
            if let JsonValue::Object(entries) = entries {
                out.extend(
                    entries
                        .keys()
                        .map(|name| definition_ref(&["components", section.as_str(), name.as_str()])),
                );
            }
        }
    }
}

fn collect_refs(node: &JsonValue, out: &mut Vec<Reference>) {
    match node {
        JsonValue::Object(map) => {
            for (key, value) in map {
                match (key.as_str(), value) {
                    (REF_KEY, JsonValue::String(pointer)) => out.push(
                        Reference::json_schema(resolve_uri(pointer, "")).with_relative(pointer.clone()),
                    ),
                    (_, value) => collect_refs(value, out),
                }
            }
        }
        JsonValue::Array(items) => items.iter().for_each(|item| collect_refs(item, out)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refs::SchemaValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_discovers_definitions_and_refs_in_order() {
        let yaml = r##"
swagger: "2.0"
definitions:
  Pet:
    properties:
      tags:
        items:
          $ref: "#/definitions/Tag"
      owner:
        $ref: "common.yaml#/Owner"
  Tag:
    type: string
  a/b:
    type: integer
"##;
        let context = discover_references(&Item::new("api.yaml", yaml)).unwrap();
        let schemas = context.schemas().unwrap();

        assert_eq!(
            schemas.uris(),
            vec![
                "#/definitions/Pet",
                "#/definitions/Tag",
                "#/definitions/a~1b",
                "common.yaml#/Owner"
            ]
        );
        assert_eq!(schemas.unresolved_references().len(), 4);
        assert!(context.container(VARIABLES_DOMAIN).is_none());
    }

    #[test]
    fn test_discovers_components() {
        let json = r##"{
            "openapi": "3.0.0",
            "components": {
                "schemas": { "User": { "type": "object" } },
                "parameters": { "limit": { "$ref": "#/components/schemas/User" } }
            }
        }"##;
        let context = discover_references(&Item::inline(json)).unwrap();
        assert_eq!(
            context.schemas().map(|c| c.uris()),
            Some(vec![
                "#/components/schemas/User".to_string(),
                "#/components/parameters/limit".to_string()
            ])
        );
    }

    #[test]
    fn test_discovers_variables() {
        let json = r#"{ "x-variables": { "host": "example.com", "port": 8080, "empty": null } }"#;
        let context = discover_references(&Item::inline(json)).unwrap();
        let variables = context.container(VARIABLES_DOMAIN).unwrap();

        assert_eq!(variables.len(), 3);
        assert!(variables.unresolved_references().is_empty());
        assert_eq!(
            variables.resolve(&variable_uri("host"), 0).and_then(|r| r.value),
            Some(SchemaValue::from("example.com"))
        );
        assert_eq!(
            variables.resolve(&variable_uri("empty"), 0).map(|r| r.value),
            Some(None)
        );
    }

    #[test]
    fn test_rejects_unparseable_document() {
        let result = discover_references(&Item::inline("{ \"a\": [1, 2 }"));
        assert!(matches!(result, Err(AppError::General(_))));
    }
}
