//! Live workspace tests.
//!
//! These tests require DATABRICKS_HOST and DATABRICKS_TOKEN. SQL also needs
//! at least one warehouse (or DATABRICKS_WAREHOUSE_ID).

use dbx_bridge::client::WorkspaceClient;
use dbx_bridge::config::WorkspaceConfig;

/// Helper to create a client from the environment.
fn get_test_client() -> Option<WorkspaceClient> {
    let mut config = WorkspaceConfig::default();
    config.apply_env_defaults();
    config.credentials().ok()?;
    WorkspaceClient::connect(&config).ok()
}

#[tokio::test]
async fn test_live_connection() {
    let Some(client) = get_test_client() else {
        eprintln!("Skipping test: DATABRICKS_HOST/DATABRICKS_TOKEN not set");
        return;
    };

    let info = client.test_connection().await.unwrap();
    assert!(info.user.is_some());
    assert!(info.workspace_url.starts_with("https://"));
}

#[tokio::test]
async fn test_live_list_root() {
    let Some(client) = get_test_client() else {
        eprintln!("Skipping test: DATABRICKS_HOST/DATABRICKS_TOKEN not set");
        return;
    };

    let files = client.list_workspace_files("/").await.unwrap();
    assert!(files.iter().any(|f| f.path == "/Users" || f.path == "/Shared"));
}

#[tokio::test]
async fn test_live_select() {
    let Some(client) = get_test_client() else {
        eprintln!("Skipping test: DATABRICKS_HOST/DATABRICKS_TOKEN not set");
        return;
    };

    let outcome = client
        .execute_sql("SELECT 1 AS num, 'hello' AS greeting", None)
        .await
        .unwrap();

    assert_eq!(outcome.data.len(), 1);
    let keys: Vec<_> = outcome.data[0].keys().collect();
    assert_eq!(keys, vec!["num", "greeting"]);
}
