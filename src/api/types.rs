//! Wire types for the workspace REST API.
//!
//! Field names follow the JSON bodies of the 2.0 endpoints. Almost every
//! field is optional because the service omits empty values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Response of `GET /api/2.0/preview/scim/v2/Me`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CurrentUser {
    #[serde(rename = "userName", default)]
    pub user_name: Option<String>,

    #[serde(rename = "displayName", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Workspace object formats accepted by import and export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkspaceFormat {
    #[default]
    Auto,
    Source,
    Html,
    Jupyter,
    Dbc,
    RMarkdown,
    Raw,
}

impl WorkspaceFormat {
    /// Returns the format as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "AUTO",
            Self::Source => "SOURCE",
            Self::Html => "HTML",
            Self::Jupyter => "JUPYTER",
            Self::Dbc => "DBC",
            Self::RMarkdown => "R_MARKDOWN",
            Self::Raw => "RAW",
        }
    }
}

/// Body of `POST /api/2.0/workspace/import`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportRequest {
    pub path: String,
    pub format: WorkspaceFormat,
    /// Base64-encoded object content.
    pub content: String,
    pub overwrite: bool,
}

/// Response of `GET /api/2.0/workspace/export`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExportResponse {
    /// Base64-encoded object content.
    #[serde(default)]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

/// Kind of a workspace object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectType {
    Notebook,
    Directory,
    Library,
    File,
    Repo,
    Dashboard,
    #[serde(other)]
    Other,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Notebook => "NOTEBOOK",
            Self::Directory => "DIRECTORY",
            Self::Library => "LIBRARY",
            Self::File => "FILE",
            Self::Repo => "REPO",
            Self::Dashboard => "DASHBOARD",
            Self::Other => "OTHER",
        }
    }
}

/// Notebook language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Language {
    Python,
    Scala,
    Sql,
    R,
    #[serde(other)]
    Other,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "PYTHON",
            Self::Scala => "SCALA",
            Self::Sql => "SQL",
            Self::R => "R",
            Self::Other => "OTHER",
        }
    }
}

/// One entry of `GET /api/2.0/workspace/list`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectInfo {
    pub path: String,

    #[serde(default)]
    pub object_type: Option<ObjectType>,

    #[serde(default)]
    pub language: Option<Language>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListObjectsResponse {
    #[serde(default)]
    pub objects: Option<Vec<ObjectInfo>>,
}

/// A SQL warehouse from `GET /api/2.0/sql/warehouses`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Warehouse {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListWarehousesResponse {
    #[serde(default)]
    pub warehouses: Option<Vec<Warehouse>>,
}

/// Body of `POST /api/2.0/sql/statements`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecuteStatementRequest {
    pub warehouse_id: String,
    pub statement: String,
    pub wait_timeout: String,
}

/// Lifecycle state of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatementState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Canceled,
    Closed,
    #[serde(other)]
    Unknown,
}

impl StatementState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Canceled => "CANCELED",
            Self::Closed => "CLOSED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for StatementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error detail attached to a failed statement or an API error body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServiceError {
    #[serde(default)]
    pub error_code: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatementStatus {
    pub state: StatementState,

    #[serde(default)]
    pub error: Option<ServiceError>,
}

/// Column descriptor inside a result schema.
///
/// `name` is optional on the wire; a nameless column makes the whole
/// schema unusable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ColumnDescriptor {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResultSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_count: Option<usize>,

    #[serde(default)]
    pub columns: Option<Vec<ColumnDescriptor>>,
}

impl ResultSchema {
    /// Builds a schema descriptor from column names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<ColumnDescriptor> = names
            .into_iter()
            .enumerate()
            .map(|(i, n)| ColumnDescriptor {
                name: Some(n.into()),
                type_name: None,
                position: Some(i),
            })
            .collect();
        Self {
            column_count: Some(columns.len()),
            columns: Some(columns),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResultManifest {
    #[serde(default)]
    pub schema: Option<ResultSchema>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_row_count: Option<u64>,
}

/// Inline result data.
///
/// Rows stay as raw JSON here so a malformed row can be reported by
/// position instead of failing the whole response body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResultData {
    #[serde(default)]
    pub data_array: Option<Vec<serde_json::Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<ResultSchema>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
}

/// Response of `POST /api/2.0/sql/statements`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatementResponse {
    #[serde(default)]
    pub statement_id: Option<String>,

    #[serde(default)]
    pub status: Option<StatementStatus>,

    #[serde(default)]
    pub manifest: Option<ResultManifest>,

    #[serde(default)]
    pub result: Option<ResultData>,
}

impl StatementResponse {
    /// Returns the reported state, or `Unknown` when the status is missing.
    pub fn state(&self) -> StatementState {
        self.status
            .as_ref()
            .map(|s| s.state)
            .unwrap_or(StatementState::Unknown)
    }

    /// Error message attached to the status, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.error.as_ref())
            .and_then(|e| e.message.as_deref())
    }
}

/// A cluster from `GET /api/2.0/clusters/list`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClusterInfo {
    pub cluster_id: String,

    #[serde(default)]
    pub cluster_name: Option<String>,

    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub node_type_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListClustersResponse {
    #[serde(default)]
    pub clusters: Option<Vec<ClusterInfo>>,
}
