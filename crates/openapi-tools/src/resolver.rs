//! Schema resolution: `OpenAPI` schema nodes to JSON Schema values.
//!
//! Component references (`#/components/schemas/*`) are inlined recursively so
//! that the tool schemas handed to MCP clients are reference-free. A visited
//! set guards self- and mutually-referential component graphs: revisiting a
//! component within one top-level resolve short-circuits to an empty object
//! schema. That sacrifices completeness of deeply cyclic schemas for
//! guaranteed termination.

use openapiv3::{
    Components, ParameterData, ParameterSchemaOrContent, ReferenceOr, Schema, SchemaKind, Type,
    VariantOrUnknownOrEmpty,
};
use serde_json::{Map, Value, json};
use std::collections::HashSet;

/// Resolve a schema node into a reference-free JSON Schema object.
///
/// `visited` must be fresh per top-level call. It is threaded through the
/// recursion and never pruned, so each component is inlined at most once per
/// resolve; any revisit (a cycle, or a second occurrence of the same
/// component) yields `{}`.
///
/// Unresolvable references also yield `{}`: a broken component must not abort
/// the whole catalog build.
#[must_use]
pub fn resolve_schema(
    schema: &ReferenceOr<Schema>,
    components: Option<&Components>,
    visited: &mut HashSet<String>,
) -> Value {
    match schema {
        ReferenceOr::Reference { reference } => resolve_reference(reference, components, visited),
        ReferenceOr::Item(item) => resolve_item(item, components, visited),
    }
}

/// Resolve a parameter's schema, falling back to the parameter-level
/// description when the schema itself carries none.
#[must_use]
pub fn resolve_parameter_schema(
    parameter: &ParameterData,
    components: Option<&Components>,
) -> Value {
    let mut visited = HashSet::new();
    let mut resolved = match &parameter.format {
        ParameterSchemaOrContent::Schema(schema) => {
            resolve_schema(schema, components, &mut visited)
        }
        // Content-keyed parameters carry no directly usable schema.
        ParameterSchemaOrContent::Content(_) => json!({"type": "string"}),
    };

    if let Some(description) = &parameter.description
        && let Some(obj) = resolved.as_object_mut()
        && !obj.contains_key("description")
    {
        obj.insert(
            "description".to_string(),
            Value::String(description.clone()),
        );
    }

    resolved
}

pub(crate) fn resolve_boxed(
    schema: &ReferenceOr<Box<Schema>>,
    components: Option<&Components>,
    visited: &mut HashSet<String>,
) -> Value {
    match schema {
        ReferenceOr::Reference { reference } => resolve_reference(reference, components, visited),
        ReferenceOr::Item(item) => resolve_item(item, components, visited),
    }
}

fn resolve_reference(
    reference: &str,
    components: Option<&Components>,
    visited: &mut HashSet<String>,
) -> Value {
    // Component name is the last `/` segment of the reference.
    let name = reference.rsplit('/').next().unwrap_or(reference);
    if !visited.insert(name.to_string()) {
        return json!({});
    }

    match components.and_then(|c| c.schemas.get(name)) {
        Some(ReferenceOr::Reference { reference }) => {
            resolve_reference(reference, components, visited)
        }
        Some(ReferenceOr::Item(item)) => resolve_item(item, components, visited),
        None => json!({}),
    }
}

fn resolve_item(
    schema: &Schema,
    components: Option<&Components>,
    visited: &mut HashSet<String>,
) -> Value {
    let mut out = Map::new();

    if let Some(description) = &schema.schema_data.description {
        out.insert(
            "description".to_string(),
            Value::String(description.clone()),
        );
    }

    match &schema.schema_kind {
        SchemaKind::Type(Type::String(string)) => {
            out.insert("type".to_string(), json!("string"));
            insert_format(&mut out, &string.format);
            let values: Vec<&String> = string.enumeration.iter().flatten().collect();
            if !values.is_empty() {
                out.insert("enum".to_string(), json!(values));
            }
        }
        SchemaKind::Type(Type::Number(number)) => {
            out.insert("type".to_string(), json!("number"));
            insert_format(&mut out, &number.format);
            if let Some(minimum) = number.minimum {
                out.insert("minimum".to_string(), json!(minimum));
            }
            if let Some(maximum) = number.maximum {
                out.insert("maximum".to_string(), json!(maximum));
            }
        }
        SchemaKind::Type(Type::Integer(integer)) => {
            out.insert("type".to_string(), json!("integer"));
            insert_format(&mut out, &integer.format);
            if let Some(minimum) = integer.minimum {
                out.insert("minimum".to_string(), json!(minimum));
            }
            if let Some(maximum) = integer.maximum {
                out.insert("maximum".to_string(), json!(maximum));
            }
        }
        SchemaKind::Type(Type::Boolean(_)) => {
            out.insert("type".to_string(), json!("boolean"));
        }
        SchemaKind::Type(Type::Object(object)) => {
            out.insert("type".to_string(), json!("object"));
            let mut properties = Map::new();
            for (name, property) in &object.properties {
                properties.insert(name.clone(), resolve_boxed(property, components, visited));
            }
            out.insert("properties".to_string(), Value::Object(properties));
            // `required` is assembled by the tool synthesizer, not here.
        }
        SchemaKind::Type(Type::Array(array)) => {
            out.insert("type".to_string(), json!("array"));
            if let Some(items) = &array.items {
                out.insert("items".to_string(), resolve_boxed(items, components, visited));
            }
        }
        // Composite kinds (oneOf/anyOf/allOf/any) degrade to a bare object.
        _ => {
            out.insert("type".to_string(), json!("object"));
        }
    }

    Value::Object(out)
}

fn insert_format<T: serde::Serialize>(
    out: &mut Map<String, Value>,
    format: &VariantOrUnknownOrEmpty<T>,
) {
    if let Ok(Value::String(format)) = serde_json::to_value(format) {
        out.insert("format".to_string(), Value::String(format));
    }
}
