//! # Serialization
//!
//! Renders loaded containers as plain JSON for embedding into an output
//! document. References left unexpanded at the depth boundary render as
//! their pointer strings.

use crate::refs::ReferenceContainer;
use crate::resolver::Context;
use serde_json::{Map, Value as JsonValue};

/// Expands every loaded entry of `container` to `depth`, keyed by URI.
///
/// Pointer text is not unique across documents (`#/Common` may appear in
/// several), so the composed URI is used. Entries that were never loaded, or
/// were acknowledged absent, are omitted.
pub fn expand_definitions(container: &ReferenceContainer, depth: usize) -> Map<String, JsonValue> {
    container
        .iter()
        .filter(|(_, cache)| cache.is_base_resolved())
        .filter_map(|(uri, _)| {
            let rendered = container.resolve(uri, depth)?.to_json_schema(depth)?;
            Some((uri.clone(), rendered))
        })
        .collect()
}

/// Expands every domain of `context`, keyed by domain name.
pub fn expand_context(context: &Context, depth: usize) -> Map<String, JsonValue> {
    context
        .references
        .iter()
        .map(|(domain, container)| {
            (
                domain.clone(),
                JsonValue::Object(expand_definitions(container, depth)),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refs::Reference;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn container() -> ReferenceContainer {
        ReferenceContainer::named("schemas")
            .update(
                Reference::json_schema("#/definitions/User")
                    .with_relative("#/definitions/User")
                    .resolve_value(json!({ "test": true, "$ref": "#/definitions/Product" })),
            )
            .update(
                Reference::json_schema("#/definitions/Product")
                    .with_relative("#/definitions/Product")
                    .resolve_value(json!({ "pid": 42, "$ref": "#/definitions/User" })),
            )
            .create(vec![Reference::json_schema("#/definitions/Pending")])
            .update(Reference::json_schema("#/definitions/Absent").acknowledge_absent())
    }

    #[test]
    fn test_expand_definitions_at_depth_one() {
        let rendered = expand_definitions(&container(), 1);
        assert_eq!(
            JsonValue::Object(rendered),
            json!({
                "#/definitions/User": {
                    "test": true,
                    "$ref": { "pid": 42, "$ref": "#/definitions/User" }
                },
                "#/definitions/Product": {
                    "pid": 42,
                    "$ref": { "test": true, "$ref": "#/definitions/Product" }
                }
            })
        );
    }

    #[test]
    fn test_same_pointer_in_two_documents_keeps_both() {
        let container = ReferenceContainer::new()
            .update(
                Reference::json_schema("a.json#/Common")
                    .with_relative("#/Common")
                    .resolve_value(json!({ "type": "string" })),
            )
            .update(
                Reference::json_schema("b.json#/Common")
                    .with_relative("#/Common")
                    .resolve_value(json!({ "type": "integer" })),
            );

        let rendered = expand_definitions(&container, 1);
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered.get("a.json#/Common"), Some(&json!({ "type": "string" })));
        assert_eq!(rendered.get("b.json#/Common"), Some(&json!({ "type": "integer" })));
    }

    #[test]
    fn test_expand_context_groups_by_domain() {
        let context = Context::new().insert("schemas", container());
        let rendered = expand_context(&context, 0);
        assert_eq!(
            rendered.get("schemas").and_then(|s| s.get("#/definitions/User")),
            Some(&json!({ "test": true, "$ref": "#/definitions/Product" }))
        );
    }
}
