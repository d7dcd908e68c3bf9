//! Command output and the JSON envelope printed by the CLI.
//!
//! Every invocation prints one JSON object with a `success` flag. Successful
//! outputs add their payload fields next to it; failures add `error` and,
//! for failed statements, `statement_id`.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Map, Value};
use std::path::PathBuf;

use crate::client::{ClusterSummary, ConnectionInfo, SqlOutcome, UploadOutcome, WorkspaceFile};
use crate::error::BridgeError;

/// Output from a command handler.
#[derive(Debug, Clone)]
pub enum CommandOutput {
    /// Connection test result.
    Connection(ConnectionInfo),

    /// Upload or notebook creation result.
    Upload(UploadOutcome),

    /// Directory listing.
    Files(Vec<WorkspaceFile>),

    /// Exported content.
    Export {
        /// Workspace path that was exported.
        path: String,
        /// Content, or None when the workspace returned nothing.
        content: Option<Vec<u8>>,
        /// Local file the content was written to, if any.
        written_to: Option<PathBuf>,
    },

    /// Normalized statement result.
    Sql(SqlOutcome),

    /// Cluster listing.
    Clusters(Vec<ClusterSummary>),
}

impl CommandOutput {
    /// Returns true if the output should be reported as success.
    ///
    /// An export with no content is reported as a failure.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Export { content: None, .. })
    }

    /// Builds the JSON envelope for this output.
    pub fn to_envelope(&self) -> Value {
        let payload = match self {
            Self::Connection(info) => to_object(info),
            Self::Upload(outcome) => to_object(outcome),
            Self::Files(files) => object([("files", json!(files))]),
            Self::Export {
                path,
                content: None,
                ..
            } => object([(
                "error",
                json!(format!("No content returned from workspace export: {}", path)),
            )]),
            Self::Export {
                path,
                content: Some(bytes),
                written_to,
            } => {
                let mut fields = object([("path", json!(path)), ("size", json!(bytes.len()))]);
                match written_to {
                    Some(local) => {
                        fields.insert("written_to".into(), json!(local.display().to_string()));
                    }
                    None => {
                        fields.insert("content_base64".into(), json!(STANDARD.encode(bytes)));
                    }
                }
                fields
            }
            Self::Sql(outcome) => to_object(outcome),
            Self::Clusters(clusters) => object([("clusters", json!(clusters))]),
        };

        envelope(self.is_success(), payload)
    }
}

/// Builds the failure envelope for an error.
pub fn error_envelope(err: &BridgeError) -> Value {
    let mut payload = object([("error", json!(err.to_string()))]);
    if let Some(statement_id) = err.statement_id() {
        payload.insert("statement_id".into(), json!(statement_id));
    }
    envelope(false, payload)
}

fn envelope(success: bool, payload: Map<String, Value>) -> Value {
    let mut map = Map::new();
    map.insert("success".into(), Value::Bool(success));
    map.extend(payload);
    Value::Object(map)
}

fn object<const N: usize>(fields: [(&str, Value); N]) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn to_object<T: serde::Serialize>(value: &T) -> Map<String, Value> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        Ok(other) => object([("value", other)]),
        Err(e) => object([("error", json!(format!("Failed to serialize output: {}", e)))]),
    }
}
