//! MCP Server implementation module
//!
//! Contains the server handler, the tool catalog and the tools that expose
//! Android project operations over the Model Context Protocol.

pub mod catalog;
pub mod server;
pub mod tools;

// Re-export main components for easier access
pub use server::AndroidServerHandler;
