//! dbx-bridge - A small client for Databricks workspaces.

use std::sync::Arc;

use dbx_bridge::api::MockWorkspaceApi;
use dbx_bridge::cli::Cli;
use dbx_bridge::client::WorkspaceClient;
use dbx_bridge::commands::{self, error_envelope};
use dbx_bridge::config::{Config, WorkspaceConfig};
use dbx_bridge::error::Result;
use dbx_bridge::logging;
use serde_json::Value;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Initialize logging (stdout is reserved for the JSON result)
    if cli.log_file {
        logging::init_file_logging();
    } else {
        logging::init_stderr_logging();
    }

    // Run the command and turn the outcome into an envelope
    let (envelope, success) = match run(&cli).await {
        Ok(output) => (output.to_envelope(), output.is_success()),
        Err(e) => {
            error!("{}: {}", e.category(), e);
            (error_envelope(&e), false)
        }
    };

    print_envelope(&envelope);
    if !success {
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<commands::CommandOutput> {
    let client = if cli.mock {
        info!("Using in-memory mock workspace");
        WorkspaceClient::new(Arc::new(MockWorkspaceApi::new()), "https://mock.workspace")
    } else {
        // Load configuration file
        let config_path = cli.config_path();
        info!("Loading config from: {}", config_path.display());
        let config = Config::load_from_file(&config_path)?;

        // Build workspace settings with precedence:
        // 1. CLI arguments (highest)
        // 2. Named profile from config
        // 3. Default profile from config
        // 4. Environment variables
        let workspace = resolve_workspace(cli, &config)?;
        info!("Workspace: {}", workspace.display_string());
        WorkspaceClient::connect(&workspace)?
    };

    commands::execute(&client, &cli.command).await
}

/// Resolves the final workspace settings from CLI args, config file, and environment.
fn resolve_workspace(cli: &Cli, config: &Config) -> Result<WorkspaceConfig> {
    // Named profile over the default profile
    let mut workspace = config.layered_profile(cli.profile_name())?;

    // CLI overrides win over any profile
    workspace.merge(&cli.to_workspace_config());

    // Apply environment variable defaults
    workspace.apply_env_defaults();

    Ok(workspace)
}

fn print_envelope(envelope: &Value) {
    match serde_json::to_string_pretty(envelope) {
        Ok(text) => println!("{}", text),
        Err(e) => println!("{{\"success\": false, \"error\": \"{}\"}}", e),
    }
}
