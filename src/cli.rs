//! Command-line argument parsing for dbx-bridge.

use crate::config::WorkspaceConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// A small client for Databricks workspaces.
#[derive(Parser, Debug)]
#[command(name = "dbx-bridge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Workspace URL (overrides profile and DATABRICKS_HOST)
    #[arg(short = 'H', long, value_name = "HOST", global = true)]
    pub host: Option<String>,

    /// Use named profile from config
    #[arg(short = 'p', long, value_name = "NAME", global = true)]
    pub profile: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Use an in-memory workspace (for testing)
    #[arg(long, global = true)]
    pub mock: bool,

    /// Write logs to the state directory instead of stderr
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Workspace operations.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Check the host and token by fetching the current user
    TestConnection,

    /// Upload a local file to the workspace
    Upload {
        /// Local file to read
        local: PathBuf,
        /// Target workspace path
        remote: String,
        /// Fail if the target already exists
        #[arg(long)]
        no_overwrite: bool,
    },

    /// Create a notebook from a local source template
    CreateNotebook {
        /// Target workspace path
        remote: String,
        /// Local template file
        template: PathBuf,
        /// Fail if the target already exists
        #[arg(long)]
        no_overwrite: bool,
    },

    /// List a workspace directory
    List {
        /// Workspace directory
        #[arg(default_value = "/")]
        path: String,
    },

    /// Download a workspace file
    Export {
        /// Workspace path to export
        remote: String,
        /// Write the content to this file instead of embedding it in the output
        #[arg(short = 'o', long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Run a SQL statement on a SQL warehouse
    Sql {
        /// Statement text
        query: String,
        /// Warehouse to run on (defaults to profile, then the first warehouse)
        #[arg(short = 'w', long, value_name = "ID")]
        warehouse_id: Option<String>,
    },

    /// List clusters
    Clusters,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Converts CLI arguments to a WorkspaceConfig overlay.
    ///
    /// Only fields given on the command line are set.
    pub fn to_workspace_config(&self) -> WorkspaceConfig {
        WorkspaceConfig {
            host: self.host.clone(),
            ..Default::default()
        }
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::Config::default_path)
    }

    /// Returns the named profile to use, if specified.
    pub fn profile_name(&self) -> Option<&str> {
        self.profile.as_deref()
    }
}
