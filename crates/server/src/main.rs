//! `openapi-mcp`: serve an `OpenAPI` description as MCP tools over stdio.

mod server;

use anyhow::Context as _;
use clap::Parser;
use openapi_mcp_tools::filter::OperationFilter;
use openapi_mcp_tools::loader::load_spec;
use openapi_mcp_tools::runtime::ToolCatalog;
use rmcp::ServiceExt as _;
use rmcp::transport::stdio;
use server::ApiServer;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Run an MCP server exposing the operations of an `OpenAPI` spec as tools.
#[derive(Debug, Parser)]
#[command(name = "openapi-mcp", version, about = "Run OpenAPI MCP server")]
struct Cli {
    /// File path or URL of the OpenAPI spec.
    spec: String,

    /// Include operations with these ids (comma separated).
    #[arg(long, value_delimiter = ',')]
    include_operation_id: Option<Vec<String>>,

    /// Include operations with these HTTP methods (comma separated).
    #[arg(long, value_delimiter = ',')]
    include_http_method: Option<Vec<String>>,

    /// Include operations with these paths (comma separated).
    #[arg(long, value_delimiter = ',')]
    include_path: Option<Vec<String>>,

    /// Include operations with these tags (comma separated).
    #[arg(long, value_delimiter = ',')]
    include_tag: Option<Vec<String>>,
}

impl Cli {
    fn filter(&self) -> Option<OperationFilter> {
        if self.include_operation_id.is_none()
            && self.include_http_method.is_none()
            && self.include_path.is_none()
            && self.include_tag.is_none()
        {
            return None;
        }
        Some(OperationFilter {
            operation_ids: self.include_operation_id.clone(),
            http_methods: self.include_http_method.clone(),
            paths: self.include_path.clone(),
            tags: self.include_tag.clone(),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the MCP transport; logs must go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let spec = load_spec(&cli.spec).await.context("load OpenAPI spec")?;
    let catalog =
        ToolCatalog::from_spec(&spec, cli.filter().as_ref()).context("build tool catalog")?;
    tracing::info!(
        tools = catalog.tools().len(),
        spec = %cli.spec,
        "serving tool catalog over stdio"
    );

    let service = ApiServer::new(Arc::new(catalog))
        .serve(stdio())
        .await
        .context("start MCP stdio server")?;
    service.waiting().await.context("serve MCP session")?;

    Ok(())
}
