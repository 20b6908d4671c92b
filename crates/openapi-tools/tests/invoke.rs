//! End-to-end dispatch tests against a loopback HTTP server.

use axum::Router;
use axum::http::{Method, Uri};
use axum::routing::any;
use openapi_mcp_tools::error::ToolsetError;
use openapi_mcp_tools::runtime::ToolCatalog;
use openapiv3::OpenAPI;
use rmcp::model::JsonObject;
use serde_json::{Value, json};
use tokio::net::TcpListener;

async fn echo_handler(method: Method, uri: Uri) -> String {
    format!("{} {}", method.as_str(), uri.path())
}

/// Serve an echo handler on an ephemeral loopback port; returns the base URL
/// and a shutdown sender.
async fn spawn_echo_server() -> anyhow::Result<(String, tokio::sync::oneshot::Sender<()>)> {
    let app = Router::new().route("/{*path}", any(echo_handler));
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = shutdown_rx.await;
    });
    tokio::spawn(async move { server.await });

    Ok((format!("http://{addr}"), shutdown_tx))
}

fn catalog_for(base_url: &str) -> ToolCatalog {
    let spec: OpenAPI = serde_json::from_value(json!({
        "openapi": "3.0.0",
        "info": {"title": "Echo", "version": "1.0.0"},
        "servers": [{"url": base_url}],
        "paths": {
            "/pets/{id}": {
                "get": {
                    "operationId": "getPet",
                    "parameters": [{
                        "name": "id",
                        "in": "path",
                        "required": true,
                        "schema": {"type": "string"}
                    }],
                    "responses": {}
                },
                "delete": {
                    "operationId": "deletePet",
                    "parameters": [{
                        "name": "id",
                        "in": "path",
                        "required": true,
                        "schema": {"type": "string"}
                    }],
                    "responses": {}
                }
            }
        }
    }))
    .expect("valid spec");

    ToolCatalog::from_spec(&spec, None).expect("catalog")
}

fn arguments(value: Value) -> JsonObject {
    value.as_object().cloned().expect("object arguments")
}

fn result_text(result: &rmcp::model::CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|content| content.as_text().map(|t| t.text.clone()))
        .collect()
}

#[tokio::test]
async fn dispatch_expands_path_placeholders_and_returns_raw_body() -> anyhow::Result<()> {
    let (base_url, shutdown) = spawn_echo_server().await?;
    let catalog = catalog_for(&base_url);

    let result = catalog
        .call_tool("getPet", &arguments(json!({"id": "42"})))
        .await?;
    assert_eq!(result_text(&result), "GET /pets/42");

    let _ = shutdown.send(());
    Ok(())
}

#[tokio::test]
async fn dispatch_uses_the_operation_method() -> anyhow::Result<()> {
    let (base_url, shutdown) = spawn_echo_server().await?;
    let catalog = catalog_for(&base_url);

    let result = catalog
        .call_tool("deletePet", &arguments(json!({"id": 7})))
        .await?;
    assert_eq!(result_text(&result), "DELETE /pets/7");

    let _ = shutdown.send(());
    Ok(())
}

#[tokio::test]
async fn unknown_tool_is_a_runtime_error() -> anyhow::Result<()> {
    let (base_url, shutdown) = spawn_echo_server().await?;
    let catalog = catalog_for(&base_url);

    let err = catalog
        .call_tool("nope", &arguments(json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolsetError::Runtime(_)));

    let _ = shutdown.send(());
    Ok(())
}

#[tokio::test]
async fn invalid_expanded_url_fails_only_that_invocation() {
    // A relative server URL can never expand into a parseable absolute URL.
    let catalog = catalog_for("not-a-base-url");

    let err = catalog
        .call_tool("getPet", &arguments(json!({"id": "1"})))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolsetError::InvalidUrl(_)));
}

#[tokio::test]
async fn transport_failures_surface_as_http_errors() {
    // Nothing listens on this port (reserved, unassigned in practice).
    let catalog = catalog_for("http://127.0.0.1:9");

    let err = catalog
        .call_tool("getPet", &arguments(json!({"id": "1"})))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolsetError::Http(_)));
}
