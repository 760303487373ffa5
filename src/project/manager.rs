//! Android project registry
//!
//! Projects are the subdirectories of the base directory that contain a Gradle
//! build descriptor. Nothing is cached: every call re-reads the filesystem. The
//! only state is the name of the currently selected project.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::config::ServerConfig;
use crate::gradle::{GradleInvoker, TaskRunner};
use crate::io::{DEFAULT_IGNORED_DIRS, filter_by_extension, list_files};
use crate::project::{ProjectError, ProjectStructure};

/// Files whose presence marks a directory as a Gradle project root
pub const BUILD_DESCRIPTORS: [&str; 4] = [
    "build.gradle",
    "build.gradle.kts",
    "settings.gradle",
    "settings.gradle.kts",
];

/// Reported as current project when nothing is selected and no project exists
pub const PLACEHOLDER_PROJECT: &str = "SampleProject1";

/// Result of a selection attempt. An unknown name is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected(String),
    NotFound(String),
}

impl fmt::Display for SelectOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectOutcome::Selected(name) => write!(f, "Set current project to {name}"),
            SelectOutcome::NotFound(name) => write!(f, "Error: Project '{name}' not found"),
        }
    }
}

pub struct ProjectManager {
    /// Android Studio installation directory
    android_studio_path: PathBuf,
    /// Directory containing the projects
    projects_base_dir: PathBuf,
    /// Directory names skipped when listing project files
    ignored_dirs: Vec<String>,
    /// Runs Gradle tasks
    runner: Arc<dyn TaskRunner>,
    /// Name of the selected project, if any
    current_project: Mutex<Option<String>>,
}

impl ProjectManager {
    /// Create a manager that runs tasks through real Gradle processes
    pub fn new(config: &ServerConfig) -> Self {
        let invoker = GradleInvoker::new(config.gradle_path.clone())
            .with_android_studio(&config.android_studio_path);

        Self::with_runner(
            config.android_studio_path.clone(),
            config.projects_base_dir.clone(),
            Arc::new(invoker),
        )
    }

    /// Create a manager with a custom task runner
    pub fn with_runner(
        android_studio_path: PathBuf,
        projects_base_dir: PathBuf,
        runner: Arc<dyn TaskRunner>,
    ) -> Self {
        Self {
            android_studio_path,
            projects_base_dir,
            ignored_dirs: DEFAULT_IGNORED_DIRS.iter().map(|d| d.to_string()).collect(),
            runner,
            current_project: Mutex::new(None),
        }
    }

    pub fn android_studio_path(&self) -> &Path {
        &self.android_studio_path
    }

    pub fn projects_base_dir(&self) -> &Path {
        &self.projects_base_dir
    }

    /// Names of all projects in the base directory, in filesystem order
    #[instrument(name = "list_projects", skip(self))]
    pub async fn list_projects(&self) -> Result<Vec<String>, ProjectError> {
        let unreadable = |source| ProjectError::BaseDirUnreadable {
            path: self.projects_base_dir.clone(),
            source,
        };

        let mut entries = tokio::fs::read_dir(&self.projects_base_dir)
            .await
            .map_err(unreadable)?;

        let mut projects = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to read entry in projects directory: {}", e);
                    break;
                }
            };

            let path = entry.path();
            if !is_dir(&path).await {
                continue;
            }

            for descriptor in BUILD_DESCRIPTORS {
                if is_file(&path.join(descriptor)).await {
                    projects.push(entry.file_name().to_string_lossy().into_owned());
                    break;
                }
            }
        }

        debug!(
            "Found {} projects in {}",
            projects.len(),
            self.projects_base_dir.display()
        );
        Ok(projects)
    }

    /// Make `name` the current project if it exists
    pub async fn select_project(&self, name: &str) -> Result<SelectOutcome, ProjectError> {
        if !self.list_projects().await?.iter().any(|project| project == name) {
            info!("Cannot select unknown project '{}'", name);
            return Ok(SelectOutcome::NotFound(name.to_string()));
        }

        *self.current_project.lock().await = Some(name.to_string());
        info!("Current project set to '{}'", name);
        Ok(SelectOutcome::Selected(name.to_string()))
    }

    /// The selected project, else the first project found, else [`PLACEHOLDER_PROJECT`]
    pub async fn current_project(&self) -> Result<String, ProjectError> {
        if let Some(selected) = self.current_project.lock().await.clone() {
            return Ok(selected);
        }

        Ok(self
            .list_projects()
            .await?
            .into_iter()
            .next()
            .unwrap_or_else(|| PLACEHOLDER_PROJECT.to_string()))
    }

    /// Files of a project relative to its root, optionally filtered by extension
    #[instrument(name = "list_project_files", skip(self))]
    pub async fn list_files(
        &self,
        project: Option<&str>,
        file_type: Option<&str>,
    ) -> Result<Vec<String>, ProjectError> {
        let (name, project_dir) = self.resolve_project(project).await?;

        let ignored_dirs = self.ignored_dirs.clone();
        let files = tokio::task::spawn_blocking(move || {
            list_files(&project_dir, &project_dir, ignored_dirs.as_slice())
        })
        .await?
        .map_err(|source| ProjectError::ListFiles {
            project: name,
            source,
        })?;

        Ok(match file_type.filter(|t| !t.is_empty()) {
            Some(file_type) => filter_by_extension(files, file_type),
            None => files,
        })
    }

    /// Module and build-variant outline of a project
    pub async fn project_structure(
        &self,
        project: Option<&str>,
    ) -> Result<ProjectStructure, ProjectError> {
        let (name, project_dir) = self.resolve_project(project).await?;
        Ok(tokio::task::spawn_blocking(move || ProjectStructure::scan(&name, &project_dir)).await?)
    }

    /// Run a Gradle task and return its output
    #[instrument(name = "run_gradle_task", skip(self))]
    pub async fn run_task(&self, task: &str, project: Option<&str>) -> Result<String, ProjectError> {
        let (name, project_dir) = self.resolve_project(project).await?;
        info!("Running Gradle task '{}' in project '{}'", task, name);
        Ok(self.runner.run_task(&project_dir, task).await?)
    }

    /// Tasks offered by a project; empty if discovery fails
    pub async fn list_tasks(&self, project: Option<&str>) -> Result<Vec<String>, ProjectError> {
        let (_, project_dir) = self.resolve_project(project).await?;
        Ok(self.runner.list_tasks(&project_dir).await)
    }

    /// Read a text file inside a project
    pub async fn read_file(
        &self,
        relative_path: &str,
        project: Option<&str>,
    ) -> Result<String, ProjectError> {
        let (name, project_dir) = self.resolve_project(project).await?;

        let outside = || ProjectError::PathOutsideProject {
            project: name.clone(),
            path: relative_path.to_string(),
        };

        let requested = Path::new(relative_path);
        if requested.is_absolute()
            || requested
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(outside());
        }

        let path = project_dir.join(requested);
        let read_error = |source| ProjectError::ReadFile {
            path: path.clone(),
            source,
        };

        // Symlinks may still point elsewhere
        let canonical_root = project_dir.canonicalize().map_err(read_error)?;
        let canonical = path.canonicalize().map_err(read_error)?;
        if !canonical.starts_with(&canonical_root) {
            return Err(outside());
        }

        tokio::fs::read_to_string(&canonical)
            .await
            .map_err(read_error)
    }

    /// Name and directory of the requested project, or of the current one
    async fn resolve_project(
        &self,
        project: Option<&str>,
    ) -> Result<(String, PathBuf), ProjectError> {
        let name = match project.filter(|p| !p.is_empty()) {
            Some(name) => name.to_string(),
            None => self.current_project().await?,
        };

        let mut components = Path::new(&name).components();
        if !matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) {
            return Err(ProjectError::InvalidProjectName { name });
        }

        let project_dir = self.projects_base_dir.join(&name);
        Ok((name, project_dir))
    }
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|metadata| metadata.is_dir())
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|metadata| metadata.is_file())
}
