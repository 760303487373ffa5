//! Project discovery and selection tools

use async_trait::async_trait;
use rmcp::{ErrorData, model::CallToolResult};
use tracing::{info, instrument};

use super::McpTool;
use super::utils::{json_result, text_result, tool_error};
use crate::project::ProjectManager;

/// List every Android Studio project in the configured projects directory.
///
/// A project is a direct subdirectory containing `build.gradle`,
/// `build.gradle.kts`, `settings.gradle` or `settings.gradle.kts`.
#[derive(Debug, ::serde::Deserialize)]
pub struct GetProjectListTool {}

#[async_trait]
impl McpTool for GetProjectListTool {
    #[instrument(name = "get_project_list", skip(self, manager))]
    async fn call_tool(&self, manager: &ProjectManager) -> Result<CallToolResult, ErrorData> {
        match manager.list_projects().await {
            Ok(projects) => {
                info!("Found {} projects", projects.len());
                Ok(json_result(&projects))
            }
            Err(e) => Ok(tool_error(&e)),
        }
    }
}

/// Report the active project: the selected one, or the first project found.
#[derive(Debug, ::serde::Deserialize)]
pub struct GetCurrentProjectTool {}

#[async_trait]
impl McpTool for GetCurrentProjectTool {
    #[instrument(name = "get_current_project", skip(self, manager))]
    async fn call_tool(&self, manager: &ProjectManager) -> Result<CallToolResult, ErrorData> {
        match manager.current_project().await {
            Ok(project) => Ok(text_result(project)),
            Err(e) => Ok(tool_error(&e)),
        }
    }
}

/// Make a project the active one for subsequent calls.
///
/// Unknown names are answered with an explanatory message rather than a
/// failure, and leave the previous selection in place.
#[derive(Debug, ::serde::Deserialize)]
pub struct SetCurrentProjectTool {
    /// The name of the project to set as active
    pub project_name: String,
}

#[async_trait]
impl McpTool for SetCurrentProjectTool {
    #[instrument(name = "set_current_project", skip(self, manager))]
    async fn call_tool(&self, manager: &ProjectManager) -> Result<CallToolResult, ErrorData> {
        match manager.select_project(&self.project_name).await {
            Ok(outcome) => Ok(text_result(outcome.to_string())),
            Err(e) => Ok(tool_error(&e)),
        }
    }
}

/// Outline of a project's modules and build variants.
#[derive(Debug, ::serde::Deserialize)]
pub struct GetProjectStructureTool {
    /// Project to inspect. DEFAULT: the current project.
    #[serde(default)]
    pub project_name: Option<String>,
}

#[async_trait]
impl McpTool for GetProjectStructureTool {
    #[instrument(name = "get_project_structure", skip(self, manager))]
    async fn call_tool(&self, manager: &ProjectManager) -> Result<CallToolResult, ErrorData> {
        match manager
            .project_structure(self.project_name.as_deref())
            .await
        {
            Ok(structure) => Ok(text_result(structure.to_string())),
            Err(e) => Ok(tool_error(&e)),
        }
    }
}
