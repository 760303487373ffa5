//! Filesystem helpers that are independent of the MCP and Gradle layers

pub mod file_listing;

pub use file_listing::{DEFAULT_IGNORED_DIRS, filter_by_extension, list_files};
