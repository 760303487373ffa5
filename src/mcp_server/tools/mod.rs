//! MCP tool implementations
//!
//! Each tool is a deserializable parameter struct whose `call_tool` runs the
//! operation against the shared [`ProjectManager`].

pub mod build_tools;
pub mod file_tools;
pub mod project_tools;
pub mod utils;

use async_trait::async_trait;
use rmcp::{ErrorData, model::CallToolResult};
use serde::de::DeserializeOwned;

use crate::project::ProjectManager;

#[async_trait]
pub trait McpTool: DeserializeOwned + Send + Sync {
    async fn call_tool(&self, manager: &ProjectManager) -> Result<CallToolResult, ErrorData>;
}
