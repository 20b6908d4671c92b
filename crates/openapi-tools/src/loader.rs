//! `OpenAPI` spec loading.
//!
//! The catalog itself only consumes a parsed [`OpenAPI`] graph; this module is
//! the collaborator that produces one from a URL or a file path.

use crate::error::{Result, ToolsetError};
use openapiv3::OpenAPI;
use reqwest::Client;

/// Load and parse an `OpenAPI` spec from a URL or file path.
///
/// # Errors
///
/// Returns an error if the location cannot be fetched/read, or if the
/// document does not parse as `OpenAPI`.
pub async fn load_spec(location: &str) -> Result<OpenAPI> {
    let content = if location.starts_with("http://") || location.starts_with("https://") {
        tracing::info!("fetching OpenAPI spec from {location}");
        let client = Client::new();
        let response = client
            .get(location)
            .send()
            .await
            .map_err(|e| ToolsetError::SpecFetch {
                url: location.to_string(),
                message: e.to_string(),
            })?;
        response.text().await.map_err(|e| ToolsetError::SpecFetch {
            url: location.to_string(),
            message: e.to_string(),
        })?
    } else {
        tracing::info!("loading OpenAPI spec from {location}");
        std::fs::read_to_string(location).map_err(|e| ToolsetError::SpecReadFile {
            path: location.to_string(),
            source: e,
        })?
    };

    // JSON is a valid subset of YAML, so one parser covers both formats.
    serde_yaml::from_str(&content).map_err(|e| ToolsetError::SpecParse {
        location: location.to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::load_spec;
    use crate::error::ToolsetError;

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let err = load_spec("/definitely/not/here.yaml").await.unwrap_err();
        assert!(matches!(err, ToolsetError::SpecReadFile { .. }));
    }

    #[tokio::test]
    async fn unparseable_content_is_a_parse_error() {
        let dir = std::env::temp_dir();
        let path = dir.join("openapi-mcp-tools-bad-spec.yaml");
        std::fs::write(&path, ": not: [valid: openapi").expect("write fixture");

        let err = load_spec(path.to_str().expect("utf-8 path"))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolsetError::SpecParse { .. }));

        let _ = std::fs::remove_file(&path);
    }
}
