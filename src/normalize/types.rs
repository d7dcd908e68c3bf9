//! Row and schema types for normalized statement results.
//!
//! A statement result arrives as positional rows of scalars; these types
//! carry it through normalization into name-keyed, order-preserving records.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A single scalar cell from a statement result.
///
/// Serializes as the plain JSON value (`null`, `true`, `42`, `"text"`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Scalar {
    /// NULL value.
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// Signed integer (up to i64).
    Int(i64),

    /// Floating point number.
    Float(f64),

    /// Text value. `JSON_ARRAY` results encode every non-null cell this way.
    String(String),
}

impl Scalar {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Converts a JSON value into a scalar.
    ///
    /// Returns `None` for arrays and objects, which cannot appear as a cell.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(Scalar::Null),
            serde_json::Value::Bool(b) => Some(Scalar::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Scalar::Int)
                .or_else(|| n.as_f64().map(Scalar::Float)),
            serde_json::Value::String(s) => Some(Scalar::String(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }

    /// Attempts to convert the value to a string representation.
    pub fn to_display_string(&self) -> String {
        match self {
            Scalar::Null => "NULL".to_string(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::String(s) => s.clone(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(v as i64)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::String(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::String(v.to_string())
    }
}

impl<T> From<Option<T>> for Scalar
where
    T: Into<Scalar>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Scalar::Null,
        }
    }
}

/// A positional row of scalars.
pub type Row = Vec<Scalar>;

/// Returns the synthetic name for the column at `index`.
pub fn synthetic_name(index: usize) -> String {
    format!("col_{index}")
}

/// Ordered column names describing the positions of a row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnSchema {
    names: Vec<String>,
}

impl ColumnSchema {
    /// Creates a schema from column names in positional order.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates the `col_0 … col_{n-1}` schema for rows of the given arity.
    pub fn synthetic(arity: usize) -> Self {
        Self {
            names: (0..arity).map(synthetic_name).collect(),
        }
    }

    /// Builds a schema from the keys of an already normalized record.
    pub fn from_record(record: &RowRecord) -> Self {
        Self::new(record.keys())
    }

    /// Column name at `index`, if the schema covers it.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// All column names in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One normalized result row: column name to value, in column order.
///
/// Serializes as a JSON object whose keys keep column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowRecord {
    entries: Vec<(String, Scalar)>,
}

impl RowRecord {
    /// Builds a record by naming each positional value.
    ///
    /// Positions beyond the schema get their synthetic `col_i` name. A name
    /// already taken earlier in the row is replaced by the position's
    /// synthetic name, or by a numbered form of the name (`id_1`, `id_2`, ...)
    /// when that is taken too, so every value keeps its own key.
    pub fn from_row(schema: &ColumnSchema, row: &[Scalar]) -> Self {
        let mut record = Self {
            entries: Vec::with_capacity(row.len()),
        };
        for (i, value) in row.iter().enumerate() {
            let name = match schema.name(i) {
                Some(name) => record.free_name(name, i),
                None => record.free_name(&synthetic_name(i), i),
            };
            record.entries.push((name, value.clone()));
        }
        record
    }

    fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == name)
    }

    /// First unused name for position `index`, preferring `name`.
    fn free_name(&self, name: &str, index: usize) -> String {
        if !self.contains(name) {
            return name.to_string();
        }
        let synthetic = synthetic_name(index);
        if !self.contains(&synthetic) {
            return synthetic;
        }
        (1..)
            .map(|n| format!("{name}_{n}"))
            .find(|candidate| !self.contains(candidate))
            .unwrap_or(synthetic)
    }

    /// Looks up a value by column name.
    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Column names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Values in column order.
    pub fn values(&self) -> Row {
        self.entries.iter().map(|(_, v)| v.clone()).collect()
    }

    /// Iterates over `(name, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for RowRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
