//! Android MCP Server Handler
//!
//! Implements the rmcp `ServerHandler` trait manually. Tool listing and
//! routing both come from the [`ToolCatalog`], so protocol handling stays
//! separate from the project operations.

use rmcp::{
    ErrorData,
    handler::server::ServerHandler,
    model::{CallToolRequestParam, CallToolResult, ListToolsResult, ServerCapabilities, ServerInfo},
    service::RequestContext,
    service::RoleServer,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Level, info};

use super::catalog::ToolCatalog;
use crate::log_mcp_message;
use crate::log_timing;
use crate::project::ProjectManager;

/// Android MCP Server Handler
#[derive(Clone)]
pub struct AndroidServerHandler {
    manager: Arc<ProjectManager>,
    catalog: Arc<ToolCatalog>,
}

impl AndroidServerHandler {
    pub fn new(manager: ProjectManager) -> Self {
        let catalog = ToolCatalog::standard();
        info!(
            "Registered tools: {}",
            catalog.names().collect::<Vec<_>>().join(", ")
        );
        Self {
            manager: Arc::new(manager),
            catalog: Arc::new(catalog),
        }
    }

    /// Route a tool call by name. `arguments` is the raw JSON object.
    pub async fn dispatch(&self, name: &str, arguments: String) -> Result<CallToolResult, ErrorData> {
        let Some(tool) = self.catalog.get(name) else {
            return Err(ErrorData::invalid_params(
                format!("Unknown tool: {}", name),
                None,
            ));
        };

        let start = Instant::now();
        log_mcp_message!(Level::INFO, "incoming", tool.name, &arguments);

        let result = (tool.handler)(&self.manager, arguments).await;

        match &result {
            Ok(result) => {
                log_mcp_message!(Level::INFO, "outgoing", tool.name, result);
            }
            Err(error) => {
                log_mcp_message!(Level::WARN, "outgoing", tool.name, error);
            }
        }
        log_timing!(Level::DEBUG, tool.name, start.elapsed());

        result
    }
}

impl ServerHandler for AndroidServerHandler {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(format!(
                "Android Studio MCP Server - Lists and inspects Android projects under {} and runs Gradle tasks in them. Use get_project_list and set_current_project first; other tools default to the current project.",
                self.manager.projects_base_dir().display()
            )),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    #[allow(refining_impl_trait)]
    fn list_tools(
        &self,
        _request: Option<rmcp::model::PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Pin<Box<dyn Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_>> {
        let tools = self.catalog.tools();
        Box::pin(async move {
            Ok(ListToolsResult {
                tools,
                ..Default::default()
            })
        })
    }

    #[allow(refining_impl_trait)]
    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Pin<Box<dyn Future<Output = Result<CallToolResult, ErrorData>> + Send + '_>> {
        let name = request.name.clone();
        let arguments = match request.arguments {
            Some(obj) => serde_json::to_string(&obj).unwrap_or_else(|_| "{}".to_string()),
            None => "{}".to_string(),
        };
        let handler = self.clone();

        Box::pin(async move { handler.dispatch(&name, arguments).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradle::{GradleError, TaskRunner};
    use crate::project::manager::PLACEHOLDER_PROJECT;
    use crate::test_utils::fixtures::ProjectsDir;
    use async_trait::async_trait;
    use rmcp::model::RawContent;
    use std::path::{Path, PathBuf};

    #[cfg(feature = "test-logging")]
    #[ctor::ctor]
    fn init_test_logging() {
        crate::test_utils::logging::init();
    }

    /// Answers every task with a fixed result
    struct FixedRunner(Result<&'static str, &'static str>);

    #[async_trait]
    impl TaskRunner for FixedRunner {
        async fn run_task(&self, _project_dir: &Path, task: &str) -> Result<String, GradleError> {
            self.0
                .map(str::to_string)
                .map_err(|stderr| GradleError::TaskFailed {
                    task: task.to_string(),
                    stderr: stderr.to_string(),
                })
        }
    }

    fn handler(projects: &ProjectsDir, runner: FixedRunner) -> AndroidServerHandler {
        AndroidServerHandler::new(ProjectManager::with_runner(
            PathBuf::from("/opt/android-studio"),
            projects.path().to_path_buf(),
            Arc::new(runner),
        ))
    }

    fn text_of(result: &CallToolResult) -> String {
        result
            .content
            .iter()
            .filter_map(|content| match &content.raw {
                RawContent::Text(text) => Some(text.text.clone()),
                _ => None,
            })
            .collect()
    }

    fn is_error(result: &CallToolResult) -> bool {
        result.is_error.unwrap_or(false)
    }

    #[tokio::test]
    async fn test_project_list_and_selection_flow() {
        let projects = ProjectsDir::new();
        projects.android_project("AppOne");
        projects.android_project("AppTwo");
        projects.plain_dir("NotAProject");
        let handler = handler(&projects, FixedRunner(Ok("")));

        let result = handler.dispatch("get_project_list", "{}".into()).await.unwrap();
        let mut listed: Vec<String> = serde_json::from_str(&text_of(&result)).unwrap();
        listed.sort();
        assert_eq!(listed, vec!["AppOne", "AppTwo"]);

        let result = handler
            .dispatch("set_current_project", r#"{"project_name":"AppTwo"}"#.into())
            .await
            .unwrap();
        assert_eq!(text_of(&result), "Set current project to AppTwo");

        let result = handler
            .dispatch("get_current_project", "{}".into())
            .await
            .unwrap();
        assert_eq!(text_of(&result), "AppTwo");
    }

    #[tokio::test]
    async fn test_unknown_project_is_a_message_not_a_failure() {
        let projects = ProjectsDir::new();
        projects.android_project("AppOne");
        let handler = handler(&projects, FixedRunner(Ok("")));

        let result = handler
            .dispatch("set_current_project", r#"{"project_name":"Nope"}"#.into())
            .await
            .unwrap();
        assert!(!is_error(&result));
        assert_eq!(text_of(&result), "Error: Project 'Nope' not found");
    }

    #[tokio::test]
    async fn test_current_project_placeholder() {
        let projects = ProjectsDir::new();
        let handler = handler(&projects, FixedRunner(Ok("")));

        let result = handler
            .dispatch("get_current_project", "{}".into())
            .await
            .unwrap();
        assert_eq!(text_of(&result), PLACEHOLDER_PROJECT);
    }

    #[tokio::test]
    async fn test_list_project_files_with_filter() {
        let projects = ProjectsDir::new();
        projects.android_project("AppOne");
        let handler = handler(&projects, FixedRunner(Ok("")));

        let result = handler
            .dispatch("list_project_files", r#"{"file_type":"xml"}"#.into())
            .await
            .unwrap();
        let files: Vec<String> = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("activity_main.xml"));
    }

    #[tokio::test]
    async fn test_io_failures_are_tool_errors() {
        let projects = ProjectsDir::new();
        let handler = AndroidServerHandler::new(ProjectManager::with_runner(
            PathBuf::from("/opt/android-studio"),
            projects.path().join("missing"),
            Arc::new(FixedRunner(Ok(""))),
        ));

        let result = handler.dispatch("get_project_list", "{}".into()).await.unwrap();
        assert!(is_error(&result));
        assert!(text_of(&result).starts_with("Error: Failed to read projects directory"));

        let result = handler
            .dispatch("list_project_files", r#"{"project_name":"Ghost"}"#.into())
            .await
            .unwrap();
        assert!(is_error(&result));
    }

    #[tokio::test]
    async fn test_project_structure() {
        let projects = ProjectsDir::new();
        projects.android_project("AppOne");
        let handler = handler(&projects, FixedRunner(Ok("")));

        let result = handler
            .dispatch("get_project_structure", "{}".into())
            .await
            .unwrap();
        let text = text_of(&result);
        assert!(text.starts_with("Project: AppOne\n"));
        assert!(text.contains("+-- app (Module)"));
        assert!(text.contains("+-- release"));
    }

    #[tokio::test]
    async fn test_run_build_task_returns_output() {
        let projects = ProjectsDir::new();
        projects.android_project("AppOne");
        let handler = handler(&projects, FixedRunner(Ok("BUILD SUCCESSFUL in 2s")));

        let result = handler
            .dispatch("run_build_task", r#"{"task":"assembleDebug"}"#.into())
            .await
            .unwrap();
        assert_eq!(text_of(&result), "BUILD SUCCESSFUL in 2s");
    }

    #[tokio::test]
    async fn test_failed_build_is_a_protocol_error() {
        let projects = ProjectsDir::new();
        projects.android_project("AppOne");
        let handler = handler(&projects, FixedRunner(Err("Task failed")));

        let error = handler
            .dispatch("run_build_task", r#"{"task":"assembleDebug"}"#.into())
            .await
            .unwrap_err();
        assert!(error.message.contains("Task failed"));
        let data = error.data.unwrap();
        assert_eq!(data["stderr"], "Task failed");
        assert_eq!(data["task"], "assembleDebug");
    }

    #[tokio::test]
    async fn test_list_build_tasks() {
        let projects = ProjectsDir::new();
        projects.android_project("AppOne");
        let handler = handler(
            &projects,
            FixedRunner(Ok("assembleDebug - Assembles debug.\nlint - Runs lint.\n")),
        );

        let result = handler
            .dispatch("list_build_tasks", "{}".into())
            .await
            .unwrap();
        let tasks: Vec<String> = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(tasks, vec!["assembleDebug", "lint"]);
    }

    #[tokio::test]
    async fn test_read_project_file() {
        let projects = ProjectsDir::new();
        projects.android_project("AppOne");
        let handler = handler(&projects, FixedRunner(Ok("")));

        let result = handler
            .dispatch(
                "read_project_file",
                r#"{"path":"settings.gradle.kts","project_name":"AppOne"}"#.into(),
            )
            .await
            .unwrap();
        assert!(text_of(&result).contains("include(\":app\")"));
    }

    #[tokio::test]
    async fn test_missing_required_argument() {
        let projects = ProjectsDir::new();
        let handler = handler(&projects, FixedRunner(Ok("")));

        let error = handler
            .dispatch("run_build_task", "{}".into())
            .await
            .unwrap_err();
        assert!(error.message.contains("Failed to parse arguments"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let projects = ProjectsDir::new();
        let handler = handler(&projects, FixedRunner(Ok("")));

        let error = handler
            .dispatch("delete_everything", "{}".into())
            .await
            .unwrap_err();
        assert!(error.message.contains("Unknown tool: delete_everything"));
    }
}
