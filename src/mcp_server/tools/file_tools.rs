//! Project file tools

use async_trait::async_trait;
use rmcp::{ErrorData, model::CallToolResult};
use tracing::{info, instrument};

use super::McpTool;
use super::utils::{json_result, text_result, tool_error};
use crate::project::ProjectManager;

/// List files of a project relative to its root.
///
/// Gradle caches, VCS metadata and build output directories are skipped.
#[derive(Debug, ::serde::Deserialize)]
pub struct ListProjectFilesTool {
    /// File extension to filter by (e.g., "kt", "java", "xml")
    #[serde(default)]
    pub file_type: Option<String>,

    /// Project to list. DEFAULT: the current project.
    #[serde(default)]
    pub project_name: Option<String>,
}

#[async_trait]
impl McpTool for ListProjectFilesTool {
    #[instrument(name = "list_project_files", skip(self, manager))]
    async fn call_tool(&self, manager: &ProjectManager) -> Result<CallToolResult, ErrorData> {
        match manager
            .list_files(self.project_name.as_deref(), self.file_type.as_deref())
            .await
        {
            Ok(files) => {
                info!("Listed {} files", files.len());
                Ok(json_result(&files))
            }
            Err(e) => Ok(tool_error(&e)),
        }
    }
}

/// Read a UTF-8 text file of a project.
#[derive(Debug, ::serde::Deserialize)]
pub struct ReadProjectFileTool {
    /// Path relative to the project root, as returned by list_project_files
    pub path: String,

    /// Project to read from. DEFAULT: the current project.
    #[serde(default)]
    pub project_name: Option<String>,
}

#[async_trait]
impl McpTool for ReadProjectFileTool {
    #[instrument(name = "read_project_file", skip(self, manager))]
    async fn call_tool(&self, manager: &ProjectManager) -> Result<CallToolResult, ErrorData> {
        match manager
            .read_file(&self.path, self.project_name.as_deref())
            .await
        {
            Ok(content) => Ok(text_result(content)),
            Err(e) => Ok(tool_error(&e)),
        }
    }
}
