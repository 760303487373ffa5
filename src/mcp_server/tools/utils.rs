//! Common utilities for MCP tools

use rmcp::{
    ErrorData,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::project::ProjectError;

/// Helper function to serialize JSON content and handle errors gracefully
pub fn serialize_result<T: Serialize>(content: &T) -> String {
    serde_json::to_string_pretty(content)
        .unwrap_or_else(|e| format!("Error serializing result: {e}"))
}

/// Deserialize tool arguments, reporting bad input as invalid params
pub fn parse_arguments<T: DeserializeOwned>(arguments: &str) -> Result<T, ErrorData> {
    serde_json::from_str(arguments).map_err(|e| {
        ErrorData::invalid_params(format!("Failed to parse arguments: {}", e), None)
    })
}

/// Successful result with a plain text body
pub fn text_result(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

/// Successful result with a pretty-printed JSON body
pub fn json_result<T: Serialize>(content: &T) -> CallToolResult {
    CallToolResult::success(vec![Content::text(serialize_result(content))])
}

/// Report a filesystem or lookup failure as a tool-level error.
///
/// The call still succeeds at the protocol level; the client gets the
/// description with `is_error` set.
pub fn tool_error(error: &ProjectError) -> CallToolResult {
    warn!("Tool failed: {}", error);
    CallToolResult::error(vec![Content::text(format!("Error: {error}"))])
}
