//! Tool catalog: every MCP tool as a data record
//!
//! A [`ToolSpec`] carries the tool's name, description, ordered parameter
//! declarations and handler. The catalog is built once at startup and serves
//! both `tools/list` (via the generated JSON schemas) and `tools/call` routing.

use rmcp::{
    ErrorData,
    model::{CallToolResult, Tool},
};
use serde_json::{Map, Value, json};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::tools::McpTool;
use super::tools::build_tools::{ListBuildTasksTool, RunBuildTaskTool};
use super::tools::file_tools::{ListProjectFilesTool, ReadProjectFileTool};
use super::tools::project_tools::{
    GetCurrentProjectTool, GetProjectListTool, GetProjectStructureTool, SetCurrentProjectTool,
};
use super::tools::utils::parse_arguments;
use crate::project::ProjectManager;

type JsonObject = Map<String, Value>;

pub type ToolFuture<'a> =
    Pin<Box<dyn Future<Output = Result<CallToolResult, ErrorData>> + Send + 'a>>;

/// Parses raw JSON arguments and runs the tool
pub type ToolHandler = fn(&ProjectManager, String) -> ToolFuture<'_>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
}

impl ParamType {
    fn json_type(self) -> &'static str {
        match self {
            ParamType::String => "string",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub param_type: ParamType,
    pub required: bool,
    pub description: &'static str,
}

impl ParamSpec {
    const fn required(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            param_type: ParamType::String,
            required: true,
            description,
        }
    }

    const fn optional(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            param_type: ParamType::String,
            required: false,
            description,
        }
    }
}

#[derive(Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
    pub handler: ToolHandler,
}

impl ToolSpec {
    /// JSON schema describing the tool's arguments
    pub fn input_schema(&self) -> JsonObject {
        let properties: JsonObject = self
            .params
            .iter()
            .map(|param| {
                (
                    param.name.to_string(),
                    json!({
                        "type": param.param_type.json_type(),
                        "description": param.description,
                    }),
                )
            })
            .collect();

        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|param| param.required)
            .map(|param| param.name)
            .collect();

        let mut schema = JsonObject::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), json!(required));
        }
        schema
    }

    pub fn to_tool(&self) -> Tool {
        Tool::new(self.name, self.description, Arc::new(self.input_schema()))
    }
}

/// Deserialize arguments into `T` and run it
fn run<T: McpTool + 'static>(manager: &ProjectManager, arguments: String) -> ToolFuture<'_> {
    Box::pin(async move {
        let tool: T = parse_arguments(&arguments)?;
        tool.call_tool(manager).await
    })
}

const PROJECT_NAME_PARAM: ParamSpec = ParamSpec::optional(
    "project_name",
    "Project to operate on. DEFAULT: the current project.",
);

const SET_CURRENT_PROJECT_PARAMS: &[ParamSpec] = &[ParamSpec::required(
    "project_name",
    "The name of the project to set as active",
)];

const LIST_PROJECT_FILES_PARAMS: &[ParamSpec] = &[
    ParamSpec::optional(
        "file_type",
        "File extension to filter by (e.g., 'kt', 'java', 'xml')",
    ),
    PROJECT_NAME_PARAM,
];

const RUN_BUILD_TASK_PARAMS: &[ParamSpec] = &[
    ParamSpec::required(
        "task",
        "The Gradle task to run (e.g., 'assembleDebug', 'test')",
    ),
    PROJECT_NAME_PARAM,
];

const READ_PROJECT_FILE_PARAMS: &[ParamSpec] = &[
    ParamSpec::required(
        "path",
        "Path relative to the project root, as returned by list_project_files",
    ),
    PROJECT_NAME_PARAM,
];

const PROJECT_ONLY_PARAMS: &[ParamSpec] = &[PROJECT_NAME_PARAM];

/// Ordered collection of the server's tools
pub struct ToolCatalog {
    tools: Vec<ToolSpec>,
}

impl ToolCatalog {
    pub fn new(tools: Vec<ToolSpec>) -> Self {
        Self { tools }
    }

    /// The Android project tools
    pub fn standard() -> Self {
        Self::new(vec![
            ToolSpec {
                name: "get_project_list",
                description: "Get a list of all Android Studio projects in the configured projects directory.",
                params: &[],
                handler: run::<GetProjectListTool>,
            },
            ToolSpec {
                name: "get_current_project",
                description: "Get the currently active Android Studio project.",
                params: &[],
                handler: run::<GetCurrentProjectTool>,
            },
            ToolSpec {
                name: "set_current_project",
                description: "Set the current active Android Studio project.",
                params: SET_CURRENT_PROJECT_PARAMS,
                handler: run::<SetCurrentProjectTool>,
            },
            ToolSpec {
                name: "list_project_files",
                description: "List files in the current project, optionally filtered by file type.",
                params: LIST_PROJECT_FILES_PARAMS,
                handler: run::<ListProjectFilesTool>,
            },
            ToolSpec {
                name: "get_project_structure",
                description: "Get the structure of the current project, including modules and build variants.",
                params: PROJECT_ONLY_PARAMS,
                handler: run::<GetProjectStructureTool>,
            },
            ToolSpec {
                name: "run_build_task",
                description: "Run a build task in the current project.",
                params: RUN_BUILD_TASK_PARAMS,
                handler: run::<RunBuildTaskTool>,
            },
            ToolSpec {
                name: "list_build_tasks",
                description: "List the Gradle tasks available in the current project.",
                params: PROJECT_ONLY_PARAMS,
                handler: run::<ListBuildTasksTool>,
            },
            ToolSpec {
                name: "read_project_file",
                description: "Read a text file from the current project.",
                params: READ_PROJECT_FILE_PARAMS,
                handler: run::<ReadProjectFileTool>,
            },
        ])
    }

    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    pub fn tools(&self) -> Vec<Tool> {
        self.tools.iter().map(ToolSpec::to_tool).collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tools.iter().map(|tool| tool.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_order() {
        let names: Vec<_> = ToolCatalog::standard().names().collect();
        assert_eq!(
            names,
            vec![
                "get_project_list",
                "get_current_project",
                "set_current_project",
                "list_project_files",
                "get_project_structure",
                "run_build_task",
                "list_build_tasks",
                "read_project_file",
            ]
        );
    }

    #[test]
    fn test_schema_declares_required_params() {
        let catalog = ToolCatalog::standard();

        let schema = catalog.get("run_build_task").unwrap().input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["task"]));
        assert_eq!(schema["properties"]["task"]["type"], "string");
        assert!(schema["properties"].get("project_name").is_some());

        let schema = catalog.get("get_project_list").unwrap().input_schema();
        assert!(schema.get("required").is_none());
        assert_eq!(schema["properties"], json!({}));
    }

    #[test]
    fn test_optional_params_are_not_required() {
        let catalog = ToolCatalog::standard();
        let schema = catalog.get("list_project_files").unwrap().input_schema();
        assert!(schema.get("required").is_none());
        assert_eq!(
            schema["properties"].as_object().unwrap().len(),
            2,
            "file_type and project_name"
        );
    }

    #[test]
    fn test_unknown_tool() {
        assert!(ToolCatalog::standard().get("delete_project").is_none());
    }

    #[test]
    fn test_tools_carry_schema() {
        let tools = ToolCatalog::standard().tools();
        assert_eq!(tools.len(), 8);
        let set_current = tools
            .iter()
            .find(|tool| tool.name == "set_current_project")
            .unwrap();
        assert_eq!(
            set_current.input_schema.get("required"),
            Some(&json!(["project_name"]))
        );
    }
}
