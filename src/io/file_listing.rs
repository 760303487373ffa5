//! Recursive file listing relative to a base directory

use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Directory names skipped by default: Gradle caches, VCS metadata and build output
pub const DEFAULT_IGNORED_DIRS: &[&str] = &["node_modules", ".gradle", ".git", "build", "bin"];

/// List every file under `directory` as a path relative to `base_dir`.
///
/// Traversal is depth-first in file-name order. Directories whose name is in
/// `ignored_dirs` are neither listed nor descended into. Symlinks are not
/// followed and are reported like regular files.
///
/// Fails if `directory` or any visited subdirectory cannot be read.
pub fn list_files<S: AsRef<str>>(
    directory: &Path,
    base_dir: &Path,
    ignored_dirs: &[S],
) -> Result<Vec<String>, walkdir::Error> {
    let is_ignored = |entry: &DirEntry| {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && ignored_dirs
                .iter()
                .any(|ignored| entry.file_name().to_str() == Some(ignored.as_ref()))
    };

    let mut files = Vec::new();
    for entry in WalkDir::new(directory)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_ignored(entry))
    {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(base_dir).unwrap_or(path);
        files.push(relative.to_string_lossy().into_owned());
    }

    Ok(files)
}

/// Keep only entries whose file name ends with `.<extension>`.
///
/// A leading dot in `extension` is accepted, so `"kt"` and `".kt"` are equivalent.
pub fn filter_by_extension(files: Vec<String>, extension: &str) -> Vec<String> {
    let suffix = format!(".{}", extension.trim_start_matches('.'));
    files
        .into_iter()
        .filter(|file| {
            Path::new(file)
                .file_name()
                .is_some_and(|name| name.to_string_lossy().ends_with(&suffix))
        })
        .collect()
}
