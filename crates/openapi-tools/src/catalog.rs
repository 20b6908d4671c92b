//! Operation extraction and tool synthesis.
//!
//! Walks the spec's path map into a linear operation list, then builds one
//! tool definition per operation: sanitized name, description, merged input
//! schema (query/path parameters plus request body), output schema from the
//! first successful response, and the URL template used at dispatch time.

use crate::resolver::{resolve_parameter_schema, resolve_schema};
use openapiv3::{
    Components, MediaType, OpenAPI, Operation, Parameter, ReferenceOr, StatusCode,
};
use regex::Regex;
use serde_json::{Map, Value, json};
use std::collections::HashSet;

/// Closed set of HTTP methods that participate in tool synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Explicit mapping to the transport's verb constant.
    #[must_use]
    pub fn to_http(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

/// One HTTP-method-and-path combination exposed by the source spec.
#[derive(Debug, Clone, Copy)]
pub struct ExtractedOperation<'a> {
    pub method: HttpMethod,
    pub path: &'a str,
    pub operation: &'a Operation,
}

/// A tool synthesized from one `OpenAPI` operation. Immutable once built.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub output_schema: Option<Value>,
    pub read_only: bool,
    pub url_template: String,
    pub method: HttpMethod,
}

/// Flatten the spec's path map into a linear operation list.
///
/// Methods are emitted in a fixed order per path; path order follows the
/// spec's own (insertion) order. Referenced path items and absent operations
/// are skipped.
#[must_use]
pub fn extract_operations(spec: &OpenAPI) -> Vec<ExtractedOperation<'_>> {
    let mut operations = Vec::new();

    for (path, item) in &spec.paths.paths {
        let ReferenceOr::Item(item) = item else {
            continue;
        };
        let methods = [
            (HttpMethod::Get, &item.get),
            (HttpMethod::Post, &item.post),
            (HttpMethod::Put, &item.put),
            (HttpMethod::Delete, &item.delete),
            (HttpMethod::Patch, &item.patch),
        ];
        for (method, operation) in methods {
            if let Some(operation) = operation {
                operations.push(ExtractedOperation {
                    method,
                    path,
                    operation,
                });
            }
        }
    }

    operations
}

/// Build a tool definition for one operation.
///
/// Missing data degrades rather than fails: absent descriptions become empty
/// strings, absent schemas become empty object schemas, and operations with
/// no JSON-typed body or response simply have no body/output schema.
#[must_use]
pub fn synthesize_tool(
    base_url: &str,
    op: &ExtractedOperation<'_>,
    components: Option<&Components>,
) -> ToolDefinition {
    let operation = op.operation;

    let name = operation
        .operation_id
        .clone()
        .unwrap_or_else(|| format!("{}_{}", op.method.as_str(), op.path));
    let name = sanitize_tool_name(&name);

    let description = operation
        .description
        .clone()
        .or_else(|| operation.summary.clone())
        .unwrap_or_default();

    let (parameters, required) = operation_parameters(operation, components);
    let request_body = operation_request_body(operation, components)
        .filter(|body| body.as_object().is_some_and(|obj| !obj.is_empty()));
    let output_schema = operation_response_body(operation, components);
    let input_schema = merge_input_schema(parameters, required, request_body);

    // Exactly one `/` at the join regardless of how the inputs are slashed.
    let url_template = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        op.path.strip_prefix('/').unwrap_or(op.path),
    );

    ToolDefinition {
        name,
        description,
        input_schema,
        output_schema,
        read_only: op.method == HttpMethod::Get,
        url_template,
        method: op.method,
    }
}

/// Sanitize a tool name down to `[A-Za-z0-9_]` with no repeated or edge
/// underscores.
fn sanitize_tool_name(name: &str) -> String {
    let non_alnum = Regex::new(r"[^A-Za-z0-9]+").unwrap();
    let name = non_alnum.replace_all(name, "_");
    name.trim_matches('_').to_string()
}

fn operation_parameters(
    operation: &Operation,
    components: Option<&Components>,
) -> (Map<String, Value>, Vec<String>) {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for parameter in &operation.parameters {
        let ReferenceOr::Item(parameter) = parameter else {
            continue;
        };
        let data = match parameter {
            Parameter::Query { parameter_data, .. } | Parameter::Path { parameter_data, .. } => {
                parameter_data
            }
            // Header and cookie parameters do not participate in tool input.
            Parameter::Header { .. } | Parameter::Cookie { .. } => continue,
        };
        if data.required {
            required.push(data.name.clone());
        }
        properties.insert(data.name.clone(), resolve_parameter_schema(data, components));
    }

    (properties, required)
}

fn operation_request_body(
    operation: &Operation,
    components: Option<&Components>,
) -> Option<Value> {
    match operation.request_body.as_ref()? {
        ReferenceOr::Item(body) => schema_from_json_content(&body.content, components),
        // Body-level $refs are expected to be pre-resolved by the loader.
        ReferenceOr::Reference { .. } => None,
    }
}

fn operation_response_body(
    operation: &Operation,
    components: Option<&Components>,
) -> Option<Value> {
    let (_, response) = operation
        .responses
        .responses
        .iter()
        .find(|(code, _)| is_success_status(code))?;
    match response {
        ReferenceOr::Item(response) => schema_from_json_content(&response.content, components),
        ReferenceOr::Reference { .. } => None,
    }
}

fn is_success_status(code: &StatusCode) -> bool {
    let code = match code {
        StatusCode::Code(n) => n.to_string(),
        StatusCode::Range(n) => format!("{n}XX"),
    };
    // Lexical window over the status string: "201" and "2XX" qualify,
    // "404" and "default" do not.
    code.as_str() >= "200" && code.as_str() < "300"
}

fn schema_from_json_content<'a>(
    content: impl IntoIterator<Item = (&'a String, &'a MediaType)>,
    components: Option<&Components>,
) -> Option<Value> {
    let media_type = content
        .into_iter()
        .find_map(|(key, value)| key.contains("json").then_some(value))?;
    let schema = media_type.schema.as_ref()?;
    let mut visited = HashSet::new();
    Some(resolve_schema(schema, components, &mut visited))
}

fn merge_input_schema(
    parameters: Map<String, Value>,
    required: Vec<String>,
    request_body: Option<Value>,
) -> Value {
    match (parameters.is_empty(), request_body) {
        // Both sources: keep them apart as two sibling properties.
        (false, Some(body)) => json!({
            "type": "object",
            "properties": {
                "parameters": {
                    "type": "object",
                    "properties": parameters,
                    "required": required,
                },
                "requestBody": body,
            },
        }),
        // Parameters only: the flat object of parameter schemas.
        (false, None) => {
            let mut schema = Map::new();
            schema.insert("type".to_string(), json!("object"));
            schema.insert("properties".to_string(), Value::Object(parameters));
            if !required.is_empty() {
                schema.insert("required".to_string(), json!(required));
            }
            Value::Object(schema)
        }
        // Body only: hoist the body's own properties/required to the top.
        (true, Some(body)) => {
            let mut schema = Map::new();
            schema.insert("type".to_string(), json!("object"));
            let properties = body
                .get("properties")
                .cloned()
                .unwrap_or_else(|| json!({}));
            schema.insert("properties".to_string(), properties);
            if let Some(required) = body.get("required") {
                schema.insert("required".to_string(), required.clone());
            }
            Value::Object(schema)
        }
        (true, None) => json!({"type": "object", "properties": {}}),
    }
}
