//! Gradle invocation for Android projects
//!
//! A project's own wrapper script (`gradlew`) always wins over the system
//! Gradle, since it pins the Gradle version the project was written for.

use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Wrapper script name for the current platform
#[cfg(windows)]
pub const WRAPPER_SCRIPT: &str = "gradlew.bat";
#[cfg(not(windows))]
pub const WRAPPER_SCRIPT: &str = "gradlew";

/// Task used to discover the tasks a project offers
pub const TASK_LIST_TASK: &str = "tasks --all";

// "assembleDebug - Assembles main outputs for the debug variant."
static TASK_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9]*( - .+)?$").expect("task line pattern is valid")
});

#[derive(Debug, Error)]
pub enum GradleError {
    #[error("Empty Gradle task")]
    EmptyTask,

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Gradle error: {stderr}")]
    TaskFailed { task: String, stderr: String },

    #[error("Gradle task '{task}' exited with {status}")]
    ExitStatus { task: String, status: String },
}

impl GradleError {
    /// Captured stderr of a failed task, if any
    pub fn stderr(&self) -> Option<&str> {
        match self {
            GradleError::TaskFailed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

/// Executable chosen for a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GradleExecutable {
    /// `gradlew` found in the project directory
    Wrapper(PathBuf),
    /// Gradle resolved from `PATH` or configured explicitly
    System(String),
}

impl GradleExecutable {
    fn program(&self) -> &std::ffi::OsStr {
        match self {
            GradleExecutable::Wrapper(path) => path.as_os_str(),
            GradleExecutable::System(command) => std::ffi::OsStr::new(command),
        }
    }

    fn display(&self) -> String {
        match self {
            GradleExecutable::Wrapper(path) => path.display().to_string(),
            GradleExecutable::System(command) => command.clone(),
        }
    }
}

/// Runs build tasks in a project directory
#[async_trait]
pub trait TaskRunner: Send + Sync {
    /// Run `task` in `project_dir` and return its captured stdout
    async fn run_task(&self, project_dir: &Path, task: &str) -> Result<String, GradleError>;

    /// Best-effort task discovery: any failure yields an empty list
    async fn list_tasks(&self, project_dir: &Path) -> Vec<String> {
        match self.run_task(project_dir, TASK_LIST_TASK).await {
            Ok(output) => parse_task_list(&output),
            Err(e) => {
                warn!(
                    "Error getting Gradle tasks for {}: {}",
                    project_dir.display(),
                    e
                );
                Vec::new()
            }
        }
    }
}

/// Extract task names from `gradle tasks` output
pub fn parse_task_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| TASK_LINE_REGEX.is_match(line))
        .filter_map(|line| line.split(" - ").next())
        .map(|name| name.trim().to_string())
        .collect()
}

/// Gradle runner backed by real subprocesses
#[derive(Debug, Clone)]
pub struct GradleInvoker {
    /// Fallback executable when the project has no wrapper
    system_gradle: String,
    /// JDK handed to Gradle as `JAVA_HOME`
    java_home: Option<PathBuf>,
}

impl GradleInvoker {
    pub fn new(system_gradle: impl Into<String>) -> Self {
        Self {
            system_gradle: system_gradle.into(),
            java_home: None,
        }
    }

    /// Use the JDK bundled with an Android Studio installation, unless
    /// `JAVA_HOME` is already set or the installation has no bundled JDK.
    pub fn with_android_studio(mut self, android_studio_path: &Path) -> Self {
        if std::env::var_os("JAVA_HOME").is_some() {
            return self;
        }
        self.java_home = bundled_jdk(android_studio_path);
        if let Some(jdk) = &self.java_home {
            info!("Using Android Studio bundled JDK: {}", jdk.display());
        }
        self
    }

    /// Pick the wrapper script if the project has one, the system Gradle otherwise.
    ///
    /// The wrapper path is absolute: the child runs inside `project_dir`, where
    /// a relative path would be resolved a second time.
    pub fn resolve_executable(&self, project_dir: &Path) -> GradleExecutable {
        let wrapper = project_dir.join(WRAPPER_SCRIPT);
        let wrapper = std::path::absolute(&wrapper).unwrap_or(wrapper);
        if wrapper.is_file() {
            GradleExecutable::Wrapper(wrapper)
        } else {
            GradleExecutable::System(self.system_gradle.clone())
        }
    }
}

#[async_trait]
impl TaskRunner for GradleInvoker {
    #[instrument(name = "gradle_run_task", skip(self))]
    async fn run_task(&self, project_dir: &Path, task: &str) -> Result<String, GradleError> {
        let args: Vec<&str> = task.split_whitespace().collect();
        if args.is_empty() {
            return Err(GradleError::EmptyTask);
        }

        let executable = self.resolve_executable(project_dir);
        info!("Running '{}' with {}", task, executable.display());

        let mut command = Command::new(executable.program());
        command
            .args(&args)
            .current_dir(project_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(java_home) = &self.java_home {
            command.env("JAVA_HOME", java_home);
        }

        let output = command.output().await.map_err(|source| GradleError::Spawn {
            program: executable.display(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            debug!("Gradle task '{}' failed with {}", task, output.status);
            return Err(if stderr.trim().is_empty() {
                GradleError::ExitStatus {
                    task: task.to_string(),
                    status: output.status.to_string(),
                }
            } else {
                GradleError::TaskFailed {
                    task: task.to_string(),
                    stderr,
                }
            });
        }

        if !stderr.trim().is_empty() {
            warn!("Gradle warning: {}", stderr.trim_end());
        }

        Ok(stdout)
    }
}

/// Locate the JDK shipped inside an Android Studio installation
fn bundled_jdk(android_studio_path: &Path) -> Option<PathBuf> {
    [
        android_studio_path.join("jbr"),
        android_studio_path.join("Contents/jbr/Contents/Home"),
    ]
    .into_iter()
    .find(|candidate| candidate.is_dir())
}
