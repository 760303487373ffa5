//! Gradle build tools

use async_trait::async_trait;
use rmcp::{ErrorData, model::CallToolResult};
use serde_json::json;
use tracing::{info, instrument};

use super::McpTool;
use super::utils::{json_result, text_result, tool_error};
use crate::project::{ProjectError, ProjectManager};

/// Run a Gradle task in a project and return its console output.
///
/// The project's `gradlew` wrapper is used when present, the system Gradle
/// otherwise. A failing build is reported as an error carrying Gradle's stderr.
#[derive(Debug, ::serde::Deserialize)]
pub struct RunBuildTaskTool {
    /// The Gradle task to run (e.g., "assembleDebug", "test")
    pub task: String,

    /// Project to build. DEFAULT: the current project.
    #[serde(default)]
    pub project_name: Option<String>,
}

#[async_trait]
impl McpTool for RunBuildTaskTool {
    #[instrument(name = "run_build_task", skip(self, manager))]
    async fn call_tool(&self, manager: &ProjectManager) -> Result<CallToolResult, ErrorData> {
        match manager
            .run_task(&self.task, self.project_name.as_deref())
            .await
        {
            Ok(output) => {
                info!("Gradle task '{}' completed", self.task);
                Ok(text_result(output))
            }
            Err(ProjectError::Gradle(e)) => Err(ErrorData::internal_error(
                e.to_string(),
                Some(json!({
                    "task": self.task,
                    "stderr": e.stderr(),
                })),
            )),
            Err(e) => Ok(tool_error(&e)),
        }
    }
}

/// List the Gradle tasks a project offers (`gradle tasks --all`).
///
/// Discovery is best effort: an empty list means Gradle could not be run.
#[derive(Debug, ::serde::Deserialize)]
pub struct ListBuildTasksTool {
    /// Project to inspect. DEFAULT: the current project.
    #[serde(default)]
    pub project_name: Option<String>,
}

#[async_trait]
impl McpTool for ListBuildTasksTool {
    #[instrument(name = "list_build_tasks", skip(self, manager))]
    async fn call_tool(&self, manager: &ProjectManager) -> Result<CallToolResult, ErrorData> {
        match manager.list_tasks(self.project_name.as_deref()).await {
            Ok(tasks) => Ok(json_result(&tasks)),
            Err(e) => Ok(tool_error(&e)),
        }
    }
}
