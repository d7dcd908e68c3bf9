//! Command handlers.
//!
//! Maps each CLI command onto a [`WorkspaceClient`] operation. Local file
//! reads and writes happen here so the client stays byte-oriented.

pub mod output;

pub use output::{error_envelope, CommandOutput};

use tracing::info;

use crate::cli::Command;
use crate::client::WorkspaceClient;
use crate::error::{BridgeError, Result};

/// Runs one command against the workspace.
pub async fn execute(client: &WorkspaceClient, command: &Command) -> Result<CommandOutput> {
    match command {
        Command::TestConnection => Ok(CommandOutput::Connection(client.test_connection().await?)),

        Command::Upload {
            local,
            remote,
            no_overwrite,
        } => {
            let content = tokio::fs::read(local).await.map_err(|e| {
                BridgeError::io(format!("Failed to read {}: {}", local.display(), e))
            })?;
            info!("Uploading {} ({} bytes) to {}", local.display(), content.len(), remote);
            let outcome = client.upload_file(&content, remote, !no_overwrite).await?;
            Ok(CommandOutput::Upload(outcome))
        }

        Command::CreateNotebook {
            remote,
            template,
            no_overwrite,
        } => {
            let text = tokio::fs::read_to_string(template).await.map_err(|e| {
                BridgeError::io(format!("Failed to read {}: {}", template.display(), e))
            })?;
            let outcome = client.create_notebook(remote, &text, !no_overwrite).await?;
            Ok(CommandOutput::Upload(outcome))
        }

        Command::List { path } => Ok(CommandOutput::Files(
            client.list_workspace_files(path).await?,
        )),

        Command::Export { remote, output } => {
            let content = client.export_file(remote).await?;
            let written_to = match (&content, output) {
                (Some(bytes), Some(local)) => {
                    tokio::fs::write(local, bytes).await.map_err(|e| {
                        BridgeError::io(format!("Failed to write {}: {}", local.display(), e))
                    })?;
                    Some(local.clone())
                }
                _ => None,
            };
            Ok(CommandOutput::Export {
                path: remote.clone(),
                content,
                written_to,
            })
        }

        Command::Sql {
            query,
            warehouse_id,
        } => Ok(CommandOutput::Sql(
            client.execute_sql(query, warehouse_id.as_deref()).await?,
        )),

        Command::Clusters => Ok(CommandOutput::Clusters(client.get_clusters().await?)),
    }
}
