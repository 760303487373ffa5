mod config;
mod gradle;
mod io;
mod logging;
mod mcp_server;
mod project;

#[cfg(test)]
mod test_utils;

use clap::Parser;
use config::ServerConfig;
use logging::{LogConfig, init_logging};
use mcp_server::AndroidServerHandler;
use project::ProjectManager;

use rmcp::service::serve_server;
use std::path::PathBuf;
use tokio::io::{stdin, stdout};
use tracing::{info, warn};

/// CLI arguments for the MCP Android server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file (defaults to config.yml in the working directory)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory containing the Android projects (overrides projects.base_dir)
    #[arg(long, value_name = "DIR")]
    projects_dir: Option<PathBuf>,

    /// Android Studio installation directory (overrides android_studio.path)
    #[arg(long, value_name = "DIR")]
    android_studio_path: Option<PathBuf>,

    /// Gradle executable used when a project has no wrapper (overrides GRADLE_PATH env var)
    #[arg(long, value_name = "PATH")]
    gradle_path: Option<String>,

    /// Log level (overrides RUST_LOG env var)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Log file path (overrides MCP_LOG_FILE env var)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

/// Resolve the Gradle override from CLI args and environment
fn resolve_gradle_path(gradle_path_arg: Option<String>) -> Option<String> {
    // Priority: CLI arg > GRADLE_PATH env var > config file
    gradle_path_arg.or_else(|| std::env::var("GRADLE_PATH").ok())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_config = LogConfig::from_env().with_overrides(args.log_level, args.log_file);

    if let Err(e) = init_logging(log_config) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    let config = ServerConfig::load(args.config.as_deref()).with_overrides(
        args.android_studio_path,
        args.projects_dir,
        resolve_gradle_path(args.gradle_path),
    );

    let manager = ProjectManager::new(&config);

    info!(
        "Starting Android MCP Server with projects directory: {}",
        manager.projects_base_dir().display()
    );
    info!("Android Studio: {}", manager.android_studio_path().display());
    info!("Using gradle: {}", config.gradle_path);

    if !manager.projects_base_dir().is_dir() {
        warn!(
            "Projects directory {} does not exist; project tools will report errors",
            manager.projects_base_dir().display()
        );
    }

    let handler = AndroidServerHandler::new(manager);

    // Create stdio transport
    let transport = (stdin(), stdout());

    info!("Android MCP Server ready and listening for requests");

    let server = serve_server(handler, transport).await?;

    // Wait for server to finish
    let quit_reason = server.waiting().await?;
    info!("Server shutdown: {:?}", quit_reason);

    Ok(())
}
