//! OpenAPI -> MCP tool translation.
//!
//! This crate converts a parsed `OpenAPI` description into an immutable catalog
//! of MCP tools and dispatches tool invocations to the underlying HTTP API.
//!
//! It intentionally contains **no** transport wiring and **no** argument
//! validation; the hosting MCP runtime owns both.

pub mod catalog;
pub mod error;
pub mod filter;
pub mod loader;
pub mod resolver;
pub mod runtime;
