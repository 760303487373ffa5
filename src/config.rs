//! Server configuration loaded from `config.yml`
//!
//! ```yaml
//! android_studio:
//!   path: /opt/android-studio
//! projects:
//!   base_dir: ~/AndroidStudioProjects
//! gradle:
//!   path: gradle
//! ```
//!
//! Every key is optional. A missing or malformed file never stops the server:
//! a warning is logged and the platform defaults are used instead.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Config file looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "config.yml";

/// Gradle executable used when a project has no wrapper script
pub const DEFAULT_GRADLE_COMMAND: &str = "gradle";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// On-disk layout of `config.yml`
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    android_studio: AndroidStudioSection,
    #[serde(default)]
    projects: ProjectsSection,
    #[serde(default)]
    gradle: GradleSection,
}

#[derive(Debug, Default, Deserialize)]
struct AndroidStudioSection {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ProjectsSection {
    base_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct GradleSection {
    path: Option<String>,
}

/// Resolved configuration, immutable after startup
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Android Studio installation directory
    pub android_studio_path: PathBuf,
    /// Directory whose subdirectories are the Android projects
    pub projects_base_dir: PathBuf,
    /// Gradle executable used when a project has no wrapper
    pub gradle_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            android_studio_path: default_android_studio_path(),
            projects_base_dir: default_projects_base_dir(),
            gradle_path: DEFAULT_GRADLE_COMMAND.to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration, falling back to defaults on any problem.
    ///
    /// `path` defaults to [`DEFAULT_CONFIG_FILE`] in the working directory.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        match Self::from_file(&path) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                config
            }
            Err(ConfigError::NotFound { path }) => {
                warn!(
                    "{} not found. Using default configuration.",
                    path.display()
                );
                Self::default()
            }
            Err(e) => {
                warn!("Error loading config file: {}. Using default configuration.", e);
                Self::default()
            }
        }
    }

    /// Strictly load a config file; missing keys still take defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not to a struct
        let file: FileConfig = if content.trim().is_empty() {
            FileConfig::default()
        } else {
            serde_yaml::from_str(content)?
        };

        let defaults = Self::default();
        Ok(Self {
            android_studio_path: file
                .android_studio
                .path
                .map(|p| expand_tilde(&p))
                .unwrap_or(defaults.android_studio_path),
            projects_base_dir: file
                .projects
                .base_dir
                .map(|p| expand_tilde(&p))
                .unwrap_or(defaults.projects_base_dir),
            gradle_path: file
                .gradle
                .path
                .filter(|p| !p.trim().is_empty())
                .unwrap_or(defaults.gradle_path),
        })
    }

    /// Apply command line and environment overrides on top of the file values
    pub fn with_overrides(
        mut self,
        android_studio_path: Option<PathBuf>,
        projects_base_dir: Option<PathBuf>,
        gradle_path: Option<String>,
    ) -> Self {
        if let Some(path) = android_studio_path {
            self.android_studio_path = expand_tilde(&path);
        }
        if let Some(dir) = projects_base_dir {
            self.projects_base_dir = expand_tilde(&dir);
        }
        if let Some(gradle) = gradle_path {
            self.gradle_path = gradle;
        }
        self
    }
}

/// Expand a leading `~` to the user's home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

fn default_android_studio_path() -> PathBuf {
    if cfg!(target_os = "macos") {
        PathBuf::from("/Applications/Android Studio.app")
    } else if cfg!(windows) {
        PathBuf::from(r"C:\Program Files\Android\Android Studio")
    } else {
        PathBuf::from("/opt/android-studio")
    }
}

fn default_projects_base_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join("AndroidStudioProjects")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_full_config() {
        let yaml = r#"
android_studio:
  path: /custom/studio
projects:
  base_dir: /work/android
gradle:
  path: /usr/local/bin/gradle
"#;
        let config = ServerConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.android_studio_path, PathBuf::from("/custom/studio"));
        assert_eq!(config.projects_base_dir, PathBuf::from("/work/android"));
        assert_eq!(config.gradle_path, "/usr/local/bin/gradle");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = "projects:\n  base_dir: /work/android\n";
        let config = ServerConfig::from_yaml(yaml).unwrap();
        let defaults = ServerConfig::default();

        assert_eq!(config.projects_base_dir, PathBuf::from("/work/android"));
        assert_eq!(config.android_studio_path, defaults.android_studio_path);
        assert_eq!(config.gradle_path, DEFAULT_GRADLE_COMMAND);
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = ServerConfig::from_yaml("   \n").unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yml");
        std::fs::write(&path, "projects: [unclosed").unwrap();

        let result = ServerConfig::from_file(&path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_load_falls_back_on_errors() {
        let temp_dir = TempDir::new().unwrap();

        let missing = temp_dir.path().join("missing.yml");
        assert_eq!(ServerConfig::load(Some(&missing)), ServerConfig::default());

        let malformed = temp_dir.path().join("bad.yml");
        std::fs::write(&malformed, "android_studio: {path: [1, 2}").unwrap();
        assert_eq!(ServerConfig::load(Some(&malformed)), ServerConfig::default());
    }

    #[test]
    fn test_load_reads_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yml");
        std::fs::write(&path, "projects:\n  base_dir: /srv/projects\n").unwrap();

        let config = ServerConfig::load(Some(&path));
        assert_eq!(config.projects_base_dir, PathBuf::from("/srv/projects"));
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::default().with_overrides(
            Some(PathBuf::from("/studio")),
            None,
            Some("gradle-8".to_string()),
        );
        assert_eq!(config.android_studio_path, PathBuf::from("/studio"));
        assert_eq!(
            config.projects_base_dir,
            ServerConfig::default().projects_base_dir
        );
        assert_eq!(config.gradle_path, "gradle-8");
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(
            expand_tilde(Path::new("/absolute/path")),
            PathBuf::from("/absolute/path")
        );
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_tilde(Path::new("~/AndroidStudioProjects")),
                home.join("AndroidStudioProjects")
            );
        }
    }
}
