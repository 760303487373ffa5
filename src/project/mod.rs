//! Android project discovery and management
//!
//! The [`ProjectManager`] owns the projects base directory and the current
//! project selection; [`ProjectStructure`] summarizes a project's modules.

pub mod error;
pub mod manager;
pub mod structure;

pub use error::ProjectError;
pub use manager::ProjectManager;
pub use structure::ProjectStructure;
