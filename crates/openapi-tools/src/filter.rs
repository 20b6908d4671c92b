//! Operation filtering.
//!
//! A filter narrows which operations become tools. Criteria combine with AND
//! across categories and OR within one category; a filter with no criteria at
//! all matches every operation.

use crate::catalog::ExtractedOperation;
use serde::Deserialize;

/// Declarative criteria selecting a subset of the operation list.
///
/// Used once per catalog build; never persisted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationFilter {
    /// Exact operation ids to include.
    #[serde(default)]
    pub operation_ids: Option<Vec<String>>,

    /// HTTP methods to include (case-insensitive).
    #[serde(default)]
    pub http_methods: Option<Vec<String>>,

    /// Paths to include (case-insensitive exact match, no wildcards).
    #[serde(default)]
    pub paths: Option<Vec<String>>,

    /// Tags to include; operations without tags never match this criterion.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl OperationFilter {
    #[must_use]
    pub fn matches(&self, op: &ExtractedOperation<'_>) -> bool {
        if let Some(ids) = &self.operation_ids {
            let Some(id) = op
                .operation
                .operation_id
                .as_deref()
                .filter(|id| !id.trim().is_empty())
            else {
                return false;
            };
            if !ids.iter().any(|candidate| candidate == id) {
                return false;
            }
        }

        if let Some(methods) = &self.http_methods
            && !methods
                .iter()
                .any(|method| method.eq_ignore_ascii_case(op.method.as_str()))
        {
            return false;
        }

        if let Some(paths) = &self.paths
            && !paths.iter().any(|path| path.eq_ignore_ascii_case(op.path))
        {
            return false;
        }

        if let Some(tags) = &self.tags
            && !op
                .operation
                .tags
                .iter()
                .any(|tag| tags.iter().any(|candidate| candidate == tag))
        {
            return false;
        }

        true
    }
}
