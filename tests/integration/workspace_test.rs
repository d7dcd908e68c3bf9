//! Workspace file and cluster operations against the mock workspace.

use std::sync::Arc;

use dbx_bridge::api::{ClusterInfo, MockWorkspaceApi};
use dbx_bridge::cli::{Cli, Command};
use dbx_bridge::client::WorkspaceClient;
use dbx_bridge::commands;
use clap::Parser;
use pretty_assertions::assert_eq;
use serde_json::json;

fn client_with(api: MockWorkspaceApi) -> WorkspaceClient {
    WorkspaceClient::new(Arc::new(api), "https://mock.workspace")
}

#[tokio::test]
async fn test_notebook_lifecycle() {
    let client = client_with(MockWorkspaceApi::new());

    client
        .create_notebook(
            "/Users/me/pipeline.py",
            "# Databricks notebook source\nprint('hi')\n",
            true,
        )
        .await
        .unwrap();
    client
        .upload_file(b"id,name\n1,a\n", "/Users/me/data/input.csv", true)
        .await
        .unwrap();

    let listing = client.list_workspace_files("/Users/me").await.unwrap();
    let summary: Vec<_> = listing
        .iter()
        .map(|f| (f.path.as_str(), f.object_type.as_str(), f.language.as_deref()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("/Users/me/data", "DIRECTORY", None),
            ("/Users/me/pipeline", "NOTEBOOK", Some("PYTHON")),
        ]
    );

    let exported = client.export_file("/Users/me/pipeline").await.unwrap().unwrap();
    assert!(String::from_utf8(exported).unwrap().contains("print('hi')"));
}

#[tokio::test]
async fn test_overwrite_flag_is_forwarded() {
    let client = client_with(MockWorkspaceApi::new());
    client.upload_file(b"v1", "/Shared/f.txt", false).await.unwrap();

    let err = client.upload_file(b"v2", "/Shared/f.txt", false).await.unwrap_err();
    assert_eq!(err.category(), "API Error");

    client.upload_file(b"v2", "/Shared/f.txt", true).await.unwrap();
    let exported = client.export_file("/Shared/f.txt").await.unwrap();
    assert_eq!(exported, Some(b"v2".to_vec()));
}

#[tokio::test]
async fn test_list_missing_directory_is_error() {
    let client = client_with(MockWorkspaceApi::new());
    let err = client.list_workspace_files("/Users/ghost").await.unwrap_err();
    assert!(err.to_string().contains("RESOURCE_DOES_NOT_EXIST"));
}

#[tokio::test]
async fn test_clusters_command_envelope() {
    let api = MockWorkspaceApi::new().with_clusters(vec![ClusterInfo {
        cluster_id: "0923-1".to_string(),
        cluster_name: Some("shared".to_string()),
        state: Some("TERMINATED".to_string()),
        node_type_id: Some("Standard_DS3_v2".to_string()),
    }]);
    let client = client_with(api);
    let cli = Cli::parse_from(["dbx-bridge", "--mock", "clusters"]);
    assert_eq!(cli.command, Command::Clusters);

    let output = commands::execute(&client, &cli.command).await.unwrap();

    assert_eq!(
        output.to_envelope(),
        json!({
            "success": true,
            "clusters": [{
                "cluster_id": "0923-1",
                "cluster_name": "shared",
                "state": "TERMINATED",
                "node_type_id": "Standard_DS3_v2"
            }]
        })
    );
}

#[tokio::test]
async fn test_failures_become_error_envelopes() {
    let client = client_with(MockWorkspaceApi::new().failing("connection refused"));

    let err = client.test_connection().await.unwrap_err();
    let envelope = commands::error_envelope(&err);

    assert_eq!(
        envelope,
        json!({"success": false, "error": "Connection error: connection refused"})
    );
}
