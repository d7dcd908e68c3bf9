//! Workspace client facade.
//!
//! Each operation forwards to one or two [`WorkspaceApi`] calls and shapes the
//! reply into a domain type. Failures always come back as [`BridgeError`].

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::api::{
    ExecuteStatementRequest, HttpWorkspaceApi, ImportRequest, StatementState, WorkspaceApi,
    WorkspaceFormat,
};
use crate::config::WorkspaceConfig;
use crate::error::{BridgeError, Result};
use crate::normalize::{normalize, RowRecord, SchemaLocation};

/// How long the statement endpoint waits before returning.
pub const STATEMENT_WAIT_TIMEOUT: &str = "30s";

/// Result of a connection test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionInfo {
    pub user: Option<String>,
    pub workspace_url: String,
}

/// Result of an upload or notebook creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadOutcome {
    pub path: String,
    pub message: String,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkspaceFile {
    pub path: String,
    /// Object type name, `"unknown"` when the service omits it.
    pub object_type: String,
    pub language: Option<String>,
}

/// Rows of a finished statement plus the identifiers it ran under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlOutcome {
    pub data: Vec<RowRecord>,
    pub statement_id: Option<String>,
    pub warehouse_id: String,
}

/// Summary of one cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub cluster_id: String,
    pub cluster_name: Option<String>,
    /// Cluster state, `"unknown"` when the service omits it.
    pub state: String,
    pub node_type_id: Option<String>,
}

/// Client for one workspace.
#[derive(Clone)]
pub struct WorkspaceClient {
    api: Arc<dyn WorkspaceApi>,
    workspace_url: String,
    default_warehouse_id: Option<String>,
}

impl WorkspaceClient {
    /// Creates a client over any API implementation.
    pub fn new(api: Arc<dyn WorkspaceApi>, workspace_url: impl Into<String>) -> Self {
        Self {
            api,
            workspace_url: workspace_url.into(),
            default_warehouse_id: None,
        }
    }

    /// Sets the warehouse used when `execute_sql` is given none.
    pub fn with_default_warehouse(mut self, warehouse_id: Option<String>) -> Self {
        self.default_warehouse_id = warehouse_id.filter(|w| !w.is_empty());
        self
    }

    /// Creates an HTTP-backed client from a workspace config.
    pub fn connect(config: &WorkspaceConfig) -> Result<Self> {
        let api = HttpWorkspaceApi::new(config.to_http_config()?)?;
        let client = Self::new(Arc::new(api), config.workspace_url()?)
            .with_default_warehouse(config.warehouse_id.clone());
        Ok(client)
    }

    /// Returns the workspace URL this client reports.
    pub fn workspace_url(&self) -> &str {
        &self.workspace_url
    }

    /// Checks the token by asking who it belongs to.
    pub async fn test_connection(&self) -> Result<ConnectionInfo> {
        let user = self.api.current_user().await.inspect_err(|e| {
            error!("Connection test failed: {}", e);
        })?;

        Ok(ConnectionInfo {
            user: user.user_name,
            workspace_url: self.workspace_url.clone(),
        })
    }

    /// Uploads raw bytes to a workspace path.
    pub async fn upload_file(
        &self,
        content: &[u8],
        workspace_path: &str,
        overwrite: bool,
    ) -> Result<UploadOutcome> {
        self.import(content, workspace_path, overwrite)
            .await
            .inspect_err(|e| error!("File upload failed: {}", e))?;

        Ok(UploadOutcome {
            path: workspace_path.to_string(),
            message: format!("File uploaded successfully to {}", workspace_path),
        })
    }

    /// Creates a notebook from source text.
    pub async fn create_notebook(
        &self,
        notebook_path: &str,
        template_content: &str,
        overwrite: bool,
    ) -> Result<UploadOutcome> {
        self.import(template_content.as_bytes(), notebook_path, overwrite)
            .await
            .inspect_err(|e| error!("Notebook creation failed: {}", e))?;

        Ok(UploadOutcome {
            path: notebook_path.to_string(),
            message: format!("Notebook created successfully at {}", notebook_path),
        })
    }

    async fn import(&self, content: &[u8], path: &str, overwrite: bool) -> Result<()> {
        let request = ImportRequest {
            path: path.to_string(),
            format: WorkspaceFormat::Auto,
            content: STANDARD.encode(content),
            overwrite,
        };
        self.api.import(&request).await
    }

    /// Lists the objects directly under a workspace directory.
    pub async fn list_workspace_files(&self, path: &str) -> Result<Vec<WorkspaceFile>> {
        let objects = self
            .api
            .list(path)
            .await
            .inspect_err(|e| error!("Failed to list workspace files: {}", e))?;

        Ok(objects
            .into_iter()
            .map(|obj| WorkspaceFile {
                path: obj.path,
                object_type: obj
                    .object_type
                    .map(|t| t.as_str().to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
                language: obj.language.map(|l| l.as_str().to_string()),
            })
            .collect())
    }

    /// Downloads a workspace object.
    ///
    /// Returns `None` when the service sends no content. Whitespace inside the
    /// base64 payload is ignored. Content that is not valid base64 is returned
    /// as its raw UTF-8 bytes.
    pub async fn export_file(&self, workspace_path: &str) -> Result<Option<Vec<u8>>> {
        let exported = self
            .api
            .export(workspace_path, WorkspaceFormat::Auto)
            .await
            .inspect_err(|e| error!("Failed to export file from {}: {}", workspace_path, e))?;

        let content = match exported.content {
            Some(content) if !content.is_empty() => content,
            _ => {
                warn!("No content returned from workspace export: {}", workspace_path);
                return Ok(None);
            }
        };

        // Line-wrapped payloads are still valid base64
        let compact: Vec<u8> = content
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();

        match STANDARD.decode(&compact) {
            Ok(bytes) => {
                info!(
                    "Successfully exported file from {} ({} bytes)",
                    workspace_path,
                    bytes.len()
                );
                Ok(Some(bytes))
            }
            Err(decode_error) => {
                warn!("Base64 decode failed, using content as-is: {}", decode_error);
                Ok(Some(content.into_bytes()))
            }
        }
    }

    /// Runs a statement on a SQL warehouse and normalizes its rows.
    ///
    /// Without an explicit or configured warehouse, the first warehouse the
    /// workspace lists is used.
    pub async fn execute_sql(&self, sql: &str, warehouse_id: Option<&str>) -> Result<SqlOutcome> {
        self.run_statement(sql, warehouse_id)
            .await
            .inspect_err(|e| error!("Failed to execute SQL query: {}", e))
    }

    async fn run_statement(&self, sql: &str, warehouse_id: Option<&str>) -> Result<SqlOutcome> {
        // Explicit argument, then configured default, then first listed
        let warehouse_id = match warehouse_id
            .filter(|w| !w.is_empty())
            .map(str::to_owned)
            .or_else(|| self.default_warehouse_id.clone())
        {
            Some(id) => id,
            None => self.first_warehouse().await?,
        };

        info!("Executing SQL query on warehouse {}", warehouse_id);
        let request = ExecuteStatementRequest {
            warehouse_id: warehouse_id.clone(),
            statement: sql.to_string(),
            wait_timeout: STATEMENT_WAIT_TIMEOUT.to_string(),
        };
        let response = self.api.execute_statement(&request).await?;

        // Anything short of SUCCEEDED within the wait window is a failure
        let state = response.state();
        if state != StatementState::Succeeded {
            let mut message = format!("Query failed with state: {}", state);
            if let Some(detail) = response.error_message() {
                message.push_str(&format!(", Error: {}", detail));
            }
            return Err(BridgeError::Statement {
                state: state.to_string(),
                message,
                statement_id: response.statement_id,
            });
        }

        // No rows is an empty result, not an error
        let data = match response.result.as_ref().and_then(|r| r.data_array.as_deref()) {
            Some(rows) if !rows.is_empty() => {
                let schema = SchemaLocation::from_response(&response).into_schema();
                normalize(rows, schema.as_ref())?
            }
            _ => Vec::new(),
        };

        info!("SQL query executed successfully, {} rows returned", data.len());
        Ok(SqlOutcome {
            data,
            statement_id: response.statement_id,
            warehouse_id,
        })
    }

    async fn first_warehouse(&self) -> Result<String> {
        let warehouses = self.api.list_warehouses().await?;
        let first = warehouses
            .into_iter()
            .next()
            .ok_or_else(|| BridgeError::config("No SQL warehouses available"))?;
        info!("Using warehouse: {}", first.id);
        Ok(first.id)
    }

    /// Lists the clusters of the workspace.
    pub async fn get_clusters(&self) -> Result<Vec<ClusterSummary>> {
        let clusters = self
            .api
            .list_clusters()
            .await
            .inspect_err(|e| error!("Failed to get clusters: {}", e))?;

        Ok(clusters
            .into_iter()
            .map(|c| ClusterSummary {
                cluster_id: c.cluster_id,
                cluster_name: c.cluster_name,
                state: c.state.unwrap_or_else(|| "unknown".to_string()),
                node_type_id: c.node_type_id,
            })
            .collect())
    }
}
