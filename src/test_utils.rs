//! Test utilities and global setup
//!
//! Provides test logging, Android project fixtures and helpers for fake
//! Gradle wrapper scripts.

/// Test logging utilities
#[cfg(all(test, feature = "test-logging"))]
pub mod logging {
    use std::sync::Once;
    use tracing_subscriber::{EnvFilter, fmt};

    static INIT: Once = Once::new();

    /// Initialize test logging globally - safe to call multiple times
    ///
    /// Respects `RUST_LOG`, defaulting to debug for this crate and info for tokio.
    /// Enable with `cargo test --features test-logging`.
    pub fn init() {
        INIT.call_once(|| {
            let env_filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("debug,tokio=info"));

            fmt()
                .with_env_filter(env_filter)
                .with_test_writer()
                .with_target(true)
                .compact()
                .try_init()
                .ok();
        });
    }
}

/// Gradle executable for integration tests: `GRADLE_PATH` or `gradle`
#[cfg(all(test, feature = "gradle-integration-tests"))]
pub fn get_test_gradle_path() -> String {
    std::env::var("GRADLE_PATH").unwrap_or_else(|_| "gradle".to_string())
}

/// On-disk Android project layouts
#[cfg(test)]
pub mod fixtures {
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A temporary projects base directory
    pub struct ProjectsDir {
        _temp_dir: TempDir, // Keeps the directory alive until drop
        pub root: PathBuf,
    }

    impl ProjectsDir {
        pub fn new() -> Self {
            let temp_dir = TempDir::new().expect("create temp dir");
            let root = temp_dir.path().to_path_buf();
            Self {
                _temp_dir: temp_dir,
                root,
            }
        }

        /// Write `content` to `relative` under the base directory, creating parents
        pub fn write(&self, relative: &str, content: &str) -> PathBuf {
            let path = self.root.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("create parent dirs");
            }
            fs::write(&path, content).expect("write fixture file");
            path
        }

        /// Create a minimal single-module Android project named `name`
        pub fn android_project(&self, name: &str) -> PathBuf {
            self.write(
                &format!("{name}/settings.gradle.kts"),
                &format!("rootProject.name = \"{name}\"\ninclude(\":app\")\n"),
            );
            self.write(
                &format!("{name}/app/build.gradle.kts"),
                "plugins {\n    id(\"com.android.application\")\n}\n",
            );
            self.write(
                &format!("{name}/app/src/main/java/com/example/MainActivity.kt"),
                "class MainActivity\n",
            );
            self.write(
                &format!("{name}/app/src/main/res/layout/activity_main.xml"),
                "<LinearLayout/>\n",
            );
            self.root.join(name)
        }

        /// Create a directory that is not a project
        pub fn plain_dir(&self, name: &str) -> PathBuf {
            let path = self.root.join(name);
            fs::create_dir_all(&path).expect("create dir");
            path
        }

        pub fn path(&self) -> &Path {
            &self.root
        }
    }
}

/// Fake Gradle wrapper scripts
#[cfg(all(test, unix))]
pub mod scripts {
    use crate::gradle::{GradleError, GradleInvoker, TaskRunner};
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use std::time::Duration;

    /// ETXTBSY: another thread forked while the script was still open for writing
    const TEXT_FILE_BUSY: i32 = 26;

    /// Write an executable `/bin/sh` script
    pub fn write_script(path: &Path, body: &str) {
        std::fs::write(path, format!("#!/bin/sh\n{body}\n")).expect("write script");
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
            .expect("chmod script");
    }

    /// Run a task, retrying while the freshly written script is busy
    pub async fn run_with_retry(
        invoker: &GradleInvoker,
        project_dir: &Path,
        task: &str,
    ) -> Result<String, GradleError> {
        let mut attempts = 0;
        loop {
            match invoker.run_task(project_dir, task).await {
                Err(GradleError::Spawn { ref source, .. })
                    if source.raw_os_error() == Some(TEXT_FILE_BUSY) && attempts < 10 =>
                {
                    attempts += 1;
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
                result => return result,
            }
        }
    }
}
