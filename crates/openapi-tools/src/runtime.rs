//! Tool catalog runtime.
//!
//! [`ToolCatalog`] is the immutable, process-wide catalog built once from a
//! parsed spec during startup. Each entry carries its own URL template and
//! HTTP method; invocations share one HTTP client and no other state, so the
//! hosting runtime may dispatch them concurrently.

use crate::catalog::{HttpMethod, ToolDefinition, extract_operations, synthesize_tool};
use crate::error::{Result, ToolsetError};
use crate::filter::OperationFilter;
use openapiv3::OpenAPI;
use reqwest::Client;
use rmcp::model::{CallToolResult, Content, JsonObject, Tool, ToolAnnotations};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// Immutable tool catalog over one source spec.
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    title: String,
    version: String,
    tools: Vec<ToolDefinition>,
    client: Client,
}

impl ToolCatalog {
    /// Build the catalog from a parsed spec, applying an optional operation
    /// filter. An empty result is valid; a spec without `servers` is not.
    ///
    /// # Errors
    ///
    /// Fails when the spec declares no `servers` entry: without a base URL no
    /// tool can be dispatched, so the build fails loudly rather than produce
    /// unusable tools.
    pub fn from_spec(spec: &OpenAPI, filter: Option<&OperationFilter>) -> Result<Self> {
        let base_url = spec
            .servers
            .first()
            .map(|server| server.url.as_str())
            .ok_or_else(|| {
                ToolsetError::Spec("spec declares no servers; cannot build tool URLs".to_string())
            })?;
        let components = spec.components.as_ref();

        let mut tools: Vec<ToolDefinition> = Vec::new();
        let mut names: HashSet<String> = HashSet::new();
        for op in extract_operations(spec) {
            if let Some(filter) = filter
                && !filter.matches(&op)
            {
                continue;
            }
            let mut tool = synthesize_tool(base_url, &op, components);
            tool.name = reserve_unique_name(&mut names, &tool.name);
            tools.push(tool);
        }

        tracing::info!(
            count = tools.len(),
            title = %spec.info.title,
            "built tool catalog from OpenAPI spec"
        );

        Ok(Self {
            title: fallback_if_blank(&spec.info.title, "openapi-mcp-server"),
            version: fallback_if_blank(&spec.info.version, "1.0.0"),
            tools,
            client: Client::new(),
        })
    }

    /// Spec `info.title`, used as the MCP server identity.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Spec `info.version`, used as the MCP server version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// MCP `Tool` views of the catalog entries.
    #[must_use]
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools
            .iter()
            .map(|t| {
                let schema = t
                    .input_schema
                    .as_object()
                    .cloned()
                    .unwrap_or_else(JsonObject::new);
                let mut tool = Tool::new(t.name.clone(), t.description.clone(), Arc::new(schema));
                tool.output_schema = t
                    .output_schema
                    .as_ref()
                    .and_then(Value::as_object)
                    .cloned()
                    .map(Arc::new);
                tool.annotations = Some(annotations_for(t));
                tool
            })
            .collect()
    }

    /// Execute a tool call, returning the raw response body as text content.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool name is unknown, the expanded URL is
    /// invalid, or the outbound request fails at the transport level.
    pub async fn call_tool(&self, name: &str, arguments: &JsonObject) -> Result<CallToolResult> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| ToolsetError::Runtime(format!("tool not found: {name}")))?;

        let text = self
            .invoke(&tool.url_template, tool.method, arguments)
            .await?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    async fn invoke(
        &self,
        url_template: &str,
        method: HttpMethod,
        arguments: &JsonObject,
    ) -> Result<String> {
        let expanded = expand_uri_template(url_template, arguments);
        let url = Url::parse(&expanded).map_err(|_| ToolsetError::InvalidUrl(expanded))?;

        tracing::debug!(%url, method = method.as_str(), "dispatching tool call");

        let response = self
            .client
            .request(method.to_http(), url)
            .send()
            .await
            .map_err(|e| ToolsetError::Http(e.to_string()))?;
        response
            .text()
            .await
            .map_err(|e| ToolsetError::Http(e.to_string()))
    }
}

/// Expand `{key}` placeholders from scalar argument values.
///
/// Placeholders without a matching string/number/boolean argument are left
/// untouched; objects, arrays and nulls never reach the URL.
fn expand_uri_template(template: &str, arguments: &JsonObject) -> String {
    let mut expanded = template.to_string();
    for (key, value) in arguments {
        let substituted = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null | Value::Array(_) | Value::Object(_) => continue,
        };
        expanded = expanded.replace(&format!("{{{key}}}"), &substituted);
    }
    expanded
}

/// GET tools are safe to call; everything else carries no hints.
fn annotations_for(tool: &ToolDefinition) -> ToolAnnotations {
    if tool.read_only {
        ToolAnnotations {
            title: None,
            read_only_hint: Some(true),
            destructive_hint: Some(false),
            idempotent_hint: None,
            open_world_hint: None,
        }
    } else {
        ToolAnnotations {
            title: None,
            read_only_hint: None,
            destructive_hint: None,
            idempotent_hint: None,
            open_world_hint: None,
        }
    }
}

fn fallback_if_blank(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Two operations may sanitize to the same tool name; suffix the later one
/// instead of overwriting the earlier.
fn reserve_unique_name(names: &mut HashSet<String>, base: &str) -> String {
    if names.insert(base.to_string()) {
        return base.to_string();
    }

    let mut counter = 1;
    loop {
        let candidate = format!("{base}_{counter}");
        if names.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}
