//! Statement execution and row normalization through the client.

use std::sync::Arc;

use dbx_bridge::api::types::{
    ColumnDescriptor, ResultData, ResultManifest, ResultSchema, StatementStatus,
};
use dbx_bridge::api::{MockWorkspaceApi, StatementResponse, StatementState};
use dbx_bridge::client::WorkspaceClient;
use dbx_bridge::commands;
use pretty_assertions::assert_eq;
use serde_json::json;

fn succeeded(
    direct: Option<ResultSchema>,
    manifest: Option<ResultSchema>,
    rows: Vec<serde_json::Value>,
) -> StatementResponse {
    StatementResponse {
        statement_id: Some("01ef-aaaa".to_string()),
        status: Some(StatementStatus {
            state: StatementState::Succeeded,
            error: None,
        }),
        manifest: manifest.map(|schema| ResultManifest {
            schema: Some(schema),
            total_row_count: None,
        }),
        result: Some(ResultData {
            data_array: Some(rows),
            schema: direct,
            row_count: None,
        }),
    }
}

async fn run(response: StatementResponse) -> serde_json::Value {
    let api = MockWorkspaceApi::new().with_statement_response(response);
    let client = WorkspaceClient::new(Arc::new(api), "https://mock.workspace");
    let outcome = client.execute_sql("SELECT * FROM t", Some("wh-1")).await.unwrap();
    serde_json::to_value(&outcome).unwrap()
}

#[tokio::test]
async fn test_result_from_json_body() {
    let body = r#"{
        "statement_id": "01ef-bbbb",
        "status": {"state": "SUCCEEDED"},
        "manifest": {
            "format": "JSON_ARRAY",
            "schema": {"column_count": 3, "columns": [
                {"name": "order_id", "type_name": "LONG", "position": 0},
                {"name": "amount", "type_name": "DECIMAL", "position": 1},
                {"name": "note", "type_name": "STRING", "position": 2}
            ]}
        },
        "result": {"chunk_index": 0, "row_offset": 0, "row_count": 2,
                   "data_array": [["1", "9.99", null], ["2", "0.50", "gift"]]}
    }"#;
    let response: StatementResponse = serde_json::from_str(body).unwrap();

    let outcome = run(response).await;

    assert_eq!(
        outcome,
        json!({
            "data": [
                {"order_id": "1", "amount": "9.99", "note": null},
                {"order_id": "2", "amount": "0.50", "note": "gift"}
            ],
            "statement_id": "01ef-bbbb",
            "warehouse_id": "wh-1"
        })
    );
}

#[tokio::test]
async fn test_key_order_follows_columns() {
    let response = succeeded(
        None,
        Some(ResultSchema::from_names(["z", "y", "x"])),
        vec![json!(["1", "2", "3"])],
    );
    let outcome = run(response).await;
    let row = serde_json::to_string(&outcome["data"][0]).unwrap();
    assert_eq!(row, r#"{"z":"1","y":"2","x":"3"}"#);
}

#[tokio::test]
async fn test_direct_schema_preferred() {
    let response = succeeded(
        Some(ResultSchema::from_names(["direct"])),
        Some(ResultSchema::from_names(["nested"])),
        vec![json!(["v"])],
    );
    let outcome = run(response).await;
    assert_eq!(outcome["data"], json!([{"direct": "v"}]));
}

#[tokio::test]
async fn test_partial_schema_falls_back_entirely() {
    let broken = ResultSchema {
        column_count: Some(2),
        columns: Some(vec![
            ColumnDescriptor {
                name: Some("id".to_string()),
                ..Default::default()
            },
            ColumnDescriptor::default(),
        ]),
    };
    let response = succeeded(None, Some(broken), vec![json!(["1", "2"])]);

    let outcome = run(response).await;

    assert_eq!(outcome["data"], json!([{"col_0": "1", "col_1": "2"}]));
}

#[tokio::test]
async fn test_short_schema_names_extra_columns() {
    let response = succeeded(
        None,
        Some(ResultSchema::from_names(["id"])),
        vec![json!(["1", "a", true])],
    );
    let outcome = run(response).await;
    assert_eq!(
        outcome["data"],
        json!([{"id": "1", "col_1": "a", "col_2": true}])
    );
}

#[tokio::test]
async fn test_failed_statement_envelope() {
    let response: StatementResponse = serde_json::from_str(
        r#"{"statement_id": "01ef-cccc",
            "status": {"state": "FAILED", "error": {"message": "[PARSE_SYNTAX_ERROR] near 'SELEC'"}}}"#,
    )
    .unwrap();
    let api = MockWorkspaceApi::new().with_statement_response(response);
    let client = WorkspaceClient::new(Arc::new(api), "https://mock.workspace");

    let err = client.execute_sql("SELEC 1", None).await.unwrap_err();

    assert_eq!(
        commands::error_envelope(&err),
        json!({
            "success": false,
            "error": "Query failed with state: FAILED, Error: [PARSE_SYNTAX_ERROR] near 'SELEC'",
            "statement_id": "01ef-cccc"
        })
    );
}

#[tokio::test]
async fn test_join_with_shared_column_keeps_every_value() {
    let response = succeeded(
        None,
        Some(ResultSchema::from_names(["id", "name", "id", "total"])),
        vec![json!(["7", "ada", "7", "12.50"])],
    );
    let outcome = run(response).await;
    let row = serde_json::to_string(&outcome["data"][0]).unwrap();
    assert_eq!(row, r#"{"id":"7","name":"ada","col_2":"7","total":"12.50"}"#);
}
