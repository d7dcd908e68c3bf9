//! HTTP implementation of the workspace API.
//!
//! Talks to the 2.0 REST endpoints with a bearer token.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::api::types::{
    ClusterInfo, CurrentUser, ExecuteStatementRequest, ExportResponse, ImportRequest,
    ListClustersResponse, ListObjectsResponse, ListWarehousesResponse, ObjectInfo,
    ServiceError, StatementResponse, Warehouse, WorkspaceFormat,
};
use crate::api::WorkspaceApi;
use crate::error::{BridgeError, Result};

/// Default timeout for API requests. Must exceed the statement wait timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Workspace URL, with or without scheme.
    pub host: String,
    /// Personal access token.
    pub token: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl HttpConfig {
    /// Creates a new config with the given host and token.
    pub fn new(host: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            token: token.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Workspace API client over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpWorkspaceApi {
    base_url: Url,
    token: String,
    client: Client,
}

impl HttpWorkspaceApi {
    /// Creates a new HTTP client with the given configuration.
    pub fn new(config: HttpConfig) -> Result<Self> {
        let base_url = normalize_host(&config.host)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BridgeError::connection(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            token: config.token,
            client,
        })
    }

    /// Returns the workspace base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| BridgeError::internal(format!("Invalid endpoint {}: {}", path, e)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);
        self.send(self.client.get(url).query(query)).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);
        self.send(self.client.post(url).json(body)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .bearer_auth(&self.token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Self::request_error(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BridgeError::connection(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Self::parse_error(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| BridgeError::api(status.as_u16(), format!("Failed to parse response: {}", e)))
    }

    /// Maps an error response to a BridgeError.
    fn parse_error(status: StatusCode, body: &str) -> BridgeError {
        let detail = serde_json::from_str::<ServiceError>(body)
            .ok()
            .and_then(|e| match (e.error_code, e.message) {
                (Some(code), Some(msg)) => Some(format!("{}: {}", code, msg)),
                (None, Some(msg)) => Some(msg),
                (Some(code), None) => Some(code),
                (None, None) => None,
            });

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let msg = detail.unwrap_or_else(|| "Check your DATABRICKS_TOKEN.".to_string());
            return BridgeError::auth(format!("Authentication failed. {}", msg));
        }

        match detail {
            Some(msg) => BridgeError::api(status.as_u16(), msg),
            None => BridgeError::api(status.as_u16(), body.trim().to_string()),
        }
    }

    fn request_error(e: &reqwest::Error) -> BridgeError {
        if e.is_timeout() {
            BridgeError::connection("Request timed out. Try again.")
        } else if e.is_connect() {
            BridgeError::connection("Failed to connect to workspace. Check the host and your network.")
        } else {
            BridgeError::connection(format!("Request failed: {}", e))
        }
    }
}

/// Turns a configured host into a base URL.
///
/// Adds `https://` when no scheme is given and drops any path.
pub fn normalize_host(host: &str) -> Result<Url> {
    let host = host.trim().trim_end_matches('/');
    if host.is_empty() {
        return Err(BridgeError::config("Databricks host is empty"));
    }

    let with_scheme = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    };

    let mut url = Url::parse(&with_scheme)
        .map_err(|e| BridgeError::config(format!("Invalid Databricks host '{}': {}", host, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(BridgeError::config(format!(
            "Invalid scheme '{}'. Expected 'https'",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(BridgeError::config(format!("Invalid Databricks host '{}'", host)));
    }

    url.set_path("/");
    url.set_query(None);
    Ok(url)
}

#[async_trait]
impl WorkspaceApi for HttpWorkspaceApi {
    async fn current_user(&self) -> Result<CurrentUser> {
        self.get("api/2.0/preview/scim/v2/Me", &[]).await
    }

    async fn import(&self, request: &ImportRequest) -> Result<()> {
        let _: IgnoredAny = self.post("api/2.0/workspace/import", request).await?;
        Ok(())
    }

    async fn export(&self, path: &str, format: WorkspaceFormat) -> Result<ExportResponse> {
        self.get(
            "api/2.0/workspace/export",
            &[("path", path), ("format", format.as_str())],
        )
        .await
    }

    async fn list(&self, path: &str) -> Result<Vec<ObjectInfo>> {
        let response: ListObjectsResponse =
            self.get("api/2.0/workspace/list", &[("path", path)]).await?;
        Ok(response.objects.unwrap_or_default())
    }

    async fn list_warehouses(&self) -> Result<Vec<Warehouse>> {
        let response: ListWarehousesResponse = self.get("api/2.0/sql/warehouses", &[]).await?;
        Ok(response.warehouses.unwrap_or_default())
    }

    async fn execute_statement(
        &self,
        request: &ExecuteStatementRequest,
    ) -> Result<StatementResponse> {
        self.post("api/2.0/sql/statements", request).await
    }

    async fn list_clusters(&self) -> Result<Vec<ClusterInfo>> {
        let response: ListClustersResponse = self.get("api/2.0/clusters/list", &[]).await?;
        Ok(response.clusters.unwrap_or_default())
    }
}
