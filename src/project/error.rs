use std::path::PathBuf;
use thiserror::Error;

use crate::gradle::GradleError;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Failed to read projects directory {path}: {source}")]
    BaseDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid project name: '{name}'")]
    InvalidProjectName { name: String },

    #[error("Failed to list files of project '{project}': {source}")]
    ListFiles {
        project: String,
        #[source]
        source: walkdir::Error,
    },

    #[error("Path is outside project '{project}': {path}")]
    PathOutsideProject { project: String, path: String },

    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Gradle(#[from] GradleError),

    #[error("Background task failed: {0}")]
    Background(#[from] tokio::task::JoinError),
}
