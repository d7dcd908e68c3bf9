//! Workspace REST API layer.
//!
//! Provides a trait-based interface over the raw REST calls, so the client
//! facade can run against a live workspace or the in-memory mock.

mod http;
mod mock;
pub mod types;

pub use http::{normalize_host, HttpConfig, HttpWorkspaceApi, DEFAULT_TIMEOUT_SECS};
pub use mock::MockWorkspaceApi;
pub use types::{
    ClusterInfo, CurrentUser, ExecuteStatementRequest, ExportResponse, ImportRequest, ObjectInfo,
    StatementResponse, StatementState, Warehouse, WorkspaceFormat,
};

use crate::error::Result;
use async_trait::async_trait;

/// Trait defining the raw workspace REST operations.
///
/// One method per endpoint; no response shaping happens here.
#[async_trait]
pub trait WorkspaceApi: Send + Sync {
    /// `GET /api/2.0/preview/scim/v2/Me`
    async fn current_user(&self) -> Result<CurrentUser>;

    /// `POST /api/2.0/workspace/import`
    async fn import(&self, request: &ImportRequest) -> Result<()>;

    /// `GET /api/2.0/workspace/export`
    async fn export(&self, path: &str, format: WorkspaceFormat) -> Result<ExportResponse>;

    /// `GET /api/2.0/workspace/list`
    async fn list(&self, path: &str) -> Result<Vec<ObjectInfo>>;

    /// `GET /api/2.0/sql/warehouses`
    async fn list_warehouses(&self) -> Result<Vec<Warehouse>>;

    /// `POST /api/2.0/sql/statements`
    async fn execute_statement(
        &self,
        request: &ExecuteStatementRequest,
    ) -> Result<StatementResponse>;

    /// `GET /api/2.0/clusters/list`
    async fn list_clusters(&self) -> Result<Vec<ClusterInfo>>;
}
