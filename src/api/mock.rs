//! Mock workspace API for testing.
//!
//! Provides an in-memory workspace for headless runs and tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::api::types::{
    ClusterInfo, CurrentUser, ExecuteStatementRequest, ExportResponse, ImportRequest, Language,
    ObjectInfo, ObjectType, ResultData, ResultManifest, ResultSchema, StatementResponse, StatementState,
    StatementStatus, Warehouse, WorkspaceFormat,
};
use crate::api::WorkspaceApi;
use crate::error::{BridgeError, Result};

/// Headers that mark an imported source file as a notebook.
const NOTEBOOK_HEADERS: &[&str] = &[
    "# Databricks notebook source",
    "-- Databricks notebook source",
    "// Databricks notebook source",
];

#[derive(Debug, Clone)]
struct StoredObject {
    /// Base64 content exactly as imported.
    content: String,
    language: Option<Language>,
}

/// An in-memory workspace.
///
/// Statements return a canned response when one is set; otherwise a
/// `SELECT` yields a single row echoing the statement.
#[derive(Debug)]
pub struct MockWorkspaceApi {
    user_name: String,
    objects: Mutex<BTreeMap<String, StoredObject>>,
    warehouses: Vec<Warehouse>,
    clusters: Vec<ClusterInfo>,
    statement_response: Option<StatementResponse>,
    executed: Mutex<Vec<ExecuteStatementRequest>>,
    failure: Option<String>,
}

impl MockWorkspaceApi {
    /// Creates a mock workspace with one running warehouse and no files.
    pub fn new() -> Self {
        Self {
            user_name: "mock.user@example.com".to_string(),
            objects: Mutex::new(BTreeMap::new()),
            warehouses: vec![Warehouse {
                id: "mock-warehouse".to_string(),
                name: Some("Mock Warehouse".to_string()),
                state: Some("RUNNING".to_string()),
            }],
            clusters: Vec::new(),
            statement_response: None,
            executed: Mutex::new(Vec::new()),
            failure: None,
        }
    }

    /// Sets the user returned by `current_user`.
    pub fn with_user(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = user_name.into();
        self
    }

    /// Replaces the available warehouses.
    pub fn with_warehouses(mut self, warehouses: Vec<Warehouse>) -> Self {
        self.warehouses = warehouses;
        self
    }

    /// Replaces the available clusters.
    pub fn with_clusters(mut self, clusters: Vec<ClusterInfo>) -> Self {
        self.clusters = clusters;
        self
    }

    /// Returns this response for every statement.
    pub fn with_statement_response(mut self, response: StatementResponse) -> Self {
        self.statement_response = Some(response);
        self
    }

    /// Stores an object whose base64 content is taken verbatim.
    pub fn with_raw_object(self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.lock_objects().insert(
            path.into(),
            StoredObject {
                content: content.into(),
                language: None,
            },
        );
        self
    }

    /// Makes every call fail with a connection error.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Statements executed so far.
    pub fn executed_statements(&self) -> Vec<ExecuteStatementRequest> {
        self.executed
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }

    fn check_failure(&self) -> Result<()> {
        match &self.failure {
            Some(msg) => Err(BridgeError::connection(msg.clone())),
            None => Ok(()),
        }
    }

    fn lock_objects(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, StoredObject>> {
        self.objects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn not_found(path: &str) -> BridgeError {
        BridgeError::api(
            404,
            format!("RESOURCE_DOES_NOT_EXIST: Path ({}) doesn't exist.", path),
        )
    }

    fn notebook_language(path: &str, decoded: &[u8]) -> Option<Language> {
        let text = String::from_utf8_lossy(decoded);
        if !NOTEBOOK_HEADERS.iter().any(|h| text.starts_with(h)) {
            return None;
        }
        let ext = split_extension(path).map(|(_, ext)| ext.to_lowercase());
        match ext.as_deref() {
            Some("py") => Some(Language::Python),
            Some("sql") => Some(Language::Sql),
            Some("scala") => Some(Language::Scala),
            Some("r") => Some(Language::R),
            _ => Some(Language::Other),
        }
    }

    /// Notebooks drop their extension on import, like the real service.
    fn stored_path(path: &str, language: Option<Language>) -> String {
        match (language, split_extension(path)) {
            (Some(_), Some((stem, _))) => stem.to_string(),
            _ => path.to_string(),
        }
    }

    fn default_statement_response(request: &ExecuteStatementRequest) -> StatementResponse {
        let is_select = request
            .statement
            .trim_start()
            .to_uppercase()
            .starts_with("SELECT");

        let (schema, rows) = if is_select {
            (
                ResultSchema::from_names(["result"]),
                vec![serde_json::json!([format!(
                    "Mock result for: {}",
                    request.statement
                )])],
            )
        } else {
            (ResultSchema::from_names(Vec::<String>::new()), Vec::new())
        };

        StatementResponse {
            statement_id: Some("mock-statement".to_string()),
            status: Some(StatementStatus {
                state: StatementState::Succeeded,
                error: None,
            }),
            manifest: Some(ResultManifest {
                total_row_count: Some(rows.len() as u64),
                schema: Some(schema),
            }),
            result: Some(ResultData {
                row_count: Some(rows.len() as u64),
                data_array: Some(rows),
                schema: None,
            }),
        }
    }
}

impl Default for MockWorkspaceApi {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits `dir/name.ext` into `("dir/name", "ext")`, looking only at the last segment.
fn split_extension(path: &str) -> Option<(&str, &str)> {
    let name_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    let dot = path[name_start..].rfind('.')?;
    if dot == 0 {
        return None;
    }
    let split = name_start + dot;
    Some((&path[..split], &path[split + 1..]))
}

fn parent_of(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some(("", _)) | None => "/",
        Some((parent, _)) => parent,
    }
}

#[async_trait]
impl WorkspaceApi for MockWorkspaceApi {
    async fn current_user(&self) -> Result<CurrentUser> {
        self.check_failure()?;
        Ok(CurrentUser {
            user_name: Some(self.user_name.clone()),
            display_name: None,
        })
    }

    async fn import(&self, request: &ImportRequest) -> Result<()> {
        self.check_failure()?;

        let decoded = STANDARD.decode(&request.content).map_err(|e| {
            BridgeError::api(400, format!("INVALID_PARAMETER_VALUE: bad content: {}", e))
        })?;
        let language = Self::notebook_language(&request.path, &decoded);
        let path = Self::stored_path(&request.path, language);

        let mut objects = self.lock_objects();
        if !request.overwrite && objects.contains_key(&path) {
            return Err(BridgeError::api(
                400,
                format!("RESOURCE_ALREADY_EXISTS: Path ({}) already exists.", path),
            ));
        }
        objects.insert(
            path,
            StoredObject {
                content: request.content.clone(),
                language,
            },
        );
        Ok(())
    }

    async fn export(&self, path: &str, _format: WorkspaceFormat) -> Result<ExportResponse> {
        self.check_failure()?;
        let objects = self.lock_objects();
        let object = objects.get(path).ok_or_else(|| Self::not_found(path))?;
        Ok(ExportResponse {
            content: Some(object.content.clone()),
            file_type: None,
        })
    }

    async fn list(&self, path: &str) -> Result<Vec<ObjectInfo>> {
        self.check_failure()?;
        let dir = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };

        let objects = self.lock_objects();
        let mut entries: Vec<ObjectInfo> = Vec::new();
        let mut found_dir = dir == "/";

        for (stored, object) in objects.iter() {
            if parent_of(stored) == dir {
                found_dir = true;
                entries.push(ObjectInfo {
                    path: stored.clone(),
                    object_type: Some(if object.language.is_some() {
                        ObjectType::Notebook
                    } else {
                        ObjectType::File
                    }),
                    language: object.language,
                    object_id: None,
                });
                continue;
            }

            // Intermediate directories are implied by nested paths.
            let prefix = if dir == "/" { "/".to_string() } else { format!("{}/", dir) };
            if let Some(rest) = stored.strip_prefix(&prefix) {
                found_dir = true;
                if let Some((child, _)) = rest.split_once('/') {
                    let child_path = format!("{}{}", prefix, child);
                    if !entries.iter().any(|e| e.path == child_path) {
                        entries.push(ObjectInfo {
                            path: child_path,
                            object_type: Some(ObjectType::Directory),
                            language: None,
                            object_id: None,
                        });
                    }
                }
            }
        }

        if !found_dir {
            return Err(Self::not_found(path));
        }
        Ok(entries)
    }

    async fn list_warehouses(&self) -> Result<Vec<Warehouse>> {
        self.check_failure()?;
        Ok(self.warehouses.clone())
    }

    async fn execute_statement(
        &self,
        request: &ExecuteStatementRequest,
    ) -> Result<StatementResponse> {
        self.check_failure()?;
        if let Ok(mut executed) = self.executed.lock() {
            executed.push(request.clone());
        }
        Ok(self
            .statement_response
            .clone()
            .unwrap_or_else(|| Self::default_statement_response(request)))
    }

    async fn list_clusters(&self) -> Result<Vec<ClusterInfo>> {
        self.check_failure()?;
        Ok(self.clusters.clone())
    }
}
