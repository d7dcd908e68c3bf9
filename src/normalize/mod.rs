//! Statement result normalization.
//!
//! Turns the positional rows of a statement result into [`RowRecord`]s keyed
//! by column name. The schema can sit on the result itself or in the
//! response manifest, and may be missing or malformed; [`SchemaLocation`]
//! resolves it once so [`normalize`] only ever sees an optional schema.

mod types;

pub use types::{synthetic_name, ColumnSchema, Row, RowRecord, Scalar};

use std::borrow::Cow;

use tracing::{debug, warn};

use crate::api::types::{ResultSchema, StatementResponse};
use crate::error::{BridgeError, Result};

/// Where a usable column schema was found.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaLocation {
    /// `result.schema`
    Direct(ColumnSchema),
    /// `manifest.schema`
    Nested(ColumnSchema),
    /// No schema, or the first schema present was malformed.
    Absent,
}

impl SchemaLocation {
    /// Resolves the schema from its two possible locations.
    ///
    /// The first location that is present decides the outcome. A malformed
    /// schema there is discarded whole and yields `Absent`; it does not fall
    /// through to the other location.
    pub fn resolve(direct: Option<&ResultSchema>, nested: Option<&ResultSchema>) -> Self {
        if let Some(schema) = direct {
            return match column_schema(schema) {
                Ok(columns) => {
                    debug!("Found schema with {} columns", columns.len());
                    Self::Direct(columns)
                }
                Err(reason) => {
                    warn!("Schema extraction failed: {}", reason);
                    Self::Absent
                }
            };
        }

        if let Some(schema) = nested {
            return match column_schema(schema) {
                Ok(columns) => {
                    debug!("Found manifest schema with {} columns", columns.len());
                    Self::Nested(columns)
                }
                Err(reason) => {
                    warn!("Manifest schema extraction failed: {}", reason);
                    Self::Absent
                }
            };
        }

        Self::Absent
    }

    /// Resolves the schema of a statement response.
    pub fn from_response(response: &StatementResponse) -> Self {
        Self::resolve(
            response.result.as_ref().and_then(|r| r.schema.as_ref()),
            response.manifest.as_ref().and_then(|m| m.schema.as_ref()),
        )
    }

    /// The resolved schema, if any.
    pub fn into_schema(self) -> Option<ColumnSchema> {
        match self {
            Self::Direct(schema) | Self::Nested(schema) => Some(schema),
            Self::Absent => None,
        }
    }
}

/// Extracts column names, failing if any column is unnamed.
fn column_schema(schema: &ResultSchema) -> std::result::Result<ColumnSchema, String> {
    let columns = schema
        .columns
        .as_ref()
        .ok_or_else(|| "schema has no column list".to_string())?;

    let names = columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            col.name
                .clone()
                .ok_or_else(|| format!("column {i} has no name"))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(ColumnSchema::new(names))
}

/// Names every value of every row.
///
/// Without a schema, names come from the arity of the first row. Row
/// positions past the end of the schema get synthetic names.
pub fn normalize_rows(rows: &[Row], schema: Option<&ColumnSchema>) -> Vec<RowRecord> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };

    let columns = match schema {
        Some(schema) => Cow::Borrowed(schema),
        None => {
            let synthetic = ColumnSchema::synthetic(first.len());
            debug!("Using generic column names: {:?}", synthetic.names());
            Cow::Owned(synthetic)
        }
    };

    rows.iter()
        .map(|row| RowRecord::from_row(&columns, row))
        .collect()
}

/// Decodes raw `data_array` rows and normalizes them.
///
/// Fails on the first row that is not an array of scalars; no partial result
/// is returned.
pub fn normalize(
    rows: &[serde_json::Value],
    schema: Option<&ColumnSchema>,
) -> Result<Vec<RowRecord>> {
    let decoded = rows
        .iter()
        .enumerate()
        .map(|(index, row)| decode_row(index, row))
        .collect::<Result<Vec<_>>>()?;

    Ok(normalize_rows(&decoded, schema))
}

fn decode_row(index: usize, row: &serde_json::Value) -> Result<Row> {
    let cells = row.as_array().ok_or_else(|| {
        BridgeError::normalization(format!("row {index} is not an array of values"))
    })?;

    cells
        .iter()
        .enumerate()
        .map(|(col, cell)| {
            Scalar::from_json(cell).ok_or_else(|| {
                BridgeError::normalization(format!(
                    "row {index}, column {col}: expected a scalar value"
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{ColumnDescriptor, ResultData, ResultManifest};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn keys(record: &RowRecord) -> Vec<&str> {
        record.keys().collect()
    }

    #[test]
    fn test_example_rows_with_schema() {
        let rows = vec![json!([1, "a"]), json!([2, "b"])];
        let schema = ColumnSchema::new(["id", "name"]);

        let records = normalize(&rows, Some(&schema)).unwrap();

        assert_eq!(
            serde_json::to_value(&records).unwrap(),
            json!([{"id": 1, "name": "a"}, {"id": 2, "name": "b"}])
        );
    }

    #[test]
    fn test_schema_names_used_for_every_row() {
        let rows: Vec<Row> = vec![
            vec!["1".into(), "x".into(), Scalar::Null],
            vec!["2".into(), "y".into(), true.into()],
        ];
        let schema = ColumnSchema::new(["id", "label", "flag"]);

        let records = normalize_rows(&rows, Some(&schema));

        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(keys(record), vec!["id", "label", "flag"]);
        }
    }

    #[test]
    fn test_no_schema_uses_synthetic_names() {
        let rows: Vec<Row> = vec![vec![1.into(), 2.into(), 3.into()]];
        let records = normalize_rows(&rows, None);
        assert_eq!(keys(&records[0]), vec!["col_0", "col_1", "col_2"]);
    }

    #[test]
    fn test_empty_rows() {
        assert!(normalize_rows(&[], None).is_empty());
        let schema = ColumnSchema::new(["a"]);
        assert!(normalize(&[], Some(&schema)).unwrap().is_empty());
    }

    #[test]
    fn test_short_schema_names_excess_positions() {
        let rows: Vec<Row> = vec![vec![1.into(), 2.into(), 3.into()]];
        let schema = ColumnSchema::new(["id"]);

        let records = normalize_rows(&rows, Some(&schema));

        assert_eq!(keys(&records[0]), vec!["id", "col_1", "col_2"]);
        assert_eq!(records[0].get("col_2"), Some(&Scalar::Int(3)));
    }

    #[test]
    fn test_longer_rows_than_first_row_without_schema() {
        let rows: Vec<Row> = vec![vec![1.into()], vec![2.into(), 3.into()]];
        let records = normalize_rows(&rows, None);
        assert_eq!(keys(&records[1]), vec!["col_0", "col_1"]);
    }

    #[test]
    fn test_renormalizing_records_is_identity() {
        let rows: Vec<Row> = vec![
            vec![1.into(), "a".into()],
            vec![2.into(), Scalar::Null],
        ];
        let schema = ColumnSchema::new(["id", "name"]);
        let records = normalize_rows(&rows, Some(&schema));

        for record in &records {
            let again = normalize_rows(
                &[record.values()],
                Some(&ColumnSchema::from_record(record)),
            );
            assert_eq!(again, vec![record.clone()]);
        }
    }

    #[test]
    fn test_malformed_row_aborts() {
        let rows = vec![json!([1, "a"]), json!("not a row")];
        let err = normalize(&rows, None).unwrap_err();
        assert_eq!(err.category(), "Normalization Error");
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_nested_cell_aborts() {
        let rows = vec![json!([1, {"nested": true}])];
        let err = normalize(&rows, None).unwrap_err();
        assert!(err.to_string().contains("row 0, column 1"));
    }

    #[test]
    fn test_direct_schema_wins_over_manifest() {
        let direct = ResultSchema::from_names(["direct"]);
        let nested = ResultSchema::from_names(["nested"]);

        let location = SchemaLocation::resolve(Some(&direct), Some(&nested));

        assert_eq!(location, SchemaLocation::Direct(ColumnSchema::new(["direct"])));
    }

    #[test]
    fn test_manifest_schema_used_when_direct_missing() {
        let nested = ResultSchema::from_names(["a", "b"]);
        let location = SchemaLocation::resolve(None, Some(&nested));
        assert_eq!(location, SchemaLocation::Nested(ColumnSchema::new(["a", "b"])));
    }

    #[test]
    fn test_malformed_schema_discarded_whole() {
        let schema = ResultSchema {
            column_count: Some(2),
            columns: Some(vec![
                ColumnDescriptor {
                    name: Some("id".to_string()),
                    ..Default::default()
                },
                ColumnDescriptor::default(),
            ]),
        };

        let location = SchemaLocation::resolve(Some(&schema), None);
        assert_eq!(location, SchemaLocation::Absent);

        let rows = vec![json!([1, 2])];
        let records = normalize(&rows, location.into_schema().as_ref()).unwrap();
        assert_eq!(keys(&records[0]), vec!["col_0", "col_1"]);
    }

    #[test]
    fn test_malformed_direct_schema_does_not_fall_through() {
        let broken = ResultSchema {
            column_count: Some(1),
            columns: Some(vec![ColumnDescriptor::default()]),
        };
        let good = ResultSchema::from_names(["id"]);

        let location = SchemaLocation::resolve(Some(&broken), Some(&good));

        assert_eq!(location, SchemaLocation::Absent);
    }

    #[test]
    fn test_key_count_matches_arity_when_names_collide() {
        let rows: Vec<Row> = vec![vec![10.into(), 20.into(), 30.into()]];

        // Schema name equal to a later synthetic name
        let records = normalize_rows(&rows, Some(&ColumnSchema::new(["col_2"])));
        assert_eq!(records[0].len(), rows[0].len());
        assert_eq!(records[0].values(), rows[0]);

        // Duplicate names from a join
        let records = normalize_rows(&rows, Some(&ColumnSchema::new(["id", "id", "id"])));
        assert_eq!(keys(&records[0]), vec!["id", "col_1", "col_2"]);
        assert_eq!(records[0].values(), rows[0]);
    }

    #[test]
    fn test_schema_without_columns_is_absent() {
        let schema = ResultSchema::default();
        assert_eq!(SchemaLocation::resolve(None, Some(&schema)), SchemaLocation::Absent);
        assert_eq!(SchemaLocation::resolve(None, None), SchemaLocation::Absent);
    }

    #[test]
    fn test_from_response() {
        let response = StatementResponse {
            manifest: Some(ResultManifest {
                schema: Some(ResultSchema::from_names(["n"])),
                total_row_count: Some(1),
            }),
            result: Some(ResultData {
                data_array: Some(vec![json!(["5"])]),
                ..Default::default()
            }),
            ..Default::default()
        };

        let schema = SchemaLocation::from_response(&response).into_schema();
        assert_eq!(schema, Some(ColumnSchema::new(["n"])));
    }
}
