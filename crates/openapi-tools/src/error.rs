//! Error types for `openapi-mcp-tools`.

use thiserror::Error;

/// Main error type for `OpenAPI` tool translation and dispatch.
#[derive(Error, Debug)]
pub enum ToolsetError {
    /// Structural problems with the source spec that prevent a catalog build
    /// (e.g. an empty `servers` list).
    #[error("OpenAPI error: {0}")]
    Spec(String),

    #[error("failed to fetch spec from '{url}': {message}")]
    SpecFetch { url: String, message: String },

    #[error("failed to read spec file '{path}': {source}")]
    SpecReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse OpenAPI spec from '{location}': {source}")]
    SpecParse {
        location: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// The expanded URI template is not a structurally valid URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Outbound HTTP transport failures.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Per-invocation runtime errors (unknown tool name).
    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Result type alias for `OpenAPI` tooling operations.
pub type Result<T> = std::result::Result<T, ToolsetError>;
