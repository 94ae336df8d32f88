use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use crate::error::{DdlError, Result};

/// Named fields a metadata row may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    SchemaName,
    TableName,
    TableComment,
    ColumnName,
    ColumnDataType,
    ColumnRequired,
    ColumnLength,
    ColumnDefault,
    ColumnComment,
    ColumnAutoIncrement,
    ColumnPrimaryKey,
    /// Index or foreign key name
    KeyName,
    UniqueIndex,
    LookupSchemaName,
    LookupTableName,
    LookupColumnName,
    OnUpdate,
    OnDelete,
}

impl Field {
    pub const ALL: [Field; 18] = [
        Field::SchemaName,
        Field::TableName,
        Field::TableComment,
        Field::ColumnName,
        Field::ColumnDataType,
        Field::ColumnRequired,
        Field::ColumnLength,
        Field::ColumnDefault,
        Field::ColumnComment,
        Field::ColumnAutoIncrement,
        Field::ColumnPrimaryKey,
        Field::KeyName,
        Field::UniqueIndex,
        Field::LookupSchemaName,
        Field::LookupTableName,
        Field::LookupColumnName,
        Field::OnUpdate,
        Field::OnDelete,
    ];

    /// Key used for this field in JSON rows
    pub const fn key(self) -> &'static str {
        match self {
            Field::SchemaName => "schema_name",
            Field::TableName => "table_name",
            Field::TableComment => "table_comment",
            Field::ColumnName => "column_name",
            Field::ColumnDataType => "data_type",
            Field::ColumnRequired => "required",
            Field::ColumnLength => "length",
            Field::ColumnDefault => "default",
            Field::ColumnComment => "column_comment",
            Field::ColumnAutoIncrement => "auto_increment",
            Field::ColumnPrimaryKey => "primary_key",
            Field::KeyName => "key_name",
            Field::UniqueIndex => "unique_index",
            Field::LookupSchemaName => "lookup_schema_name",
            Field::LookupTableName => "lookup_table_name",
            Field::LookupColumnName => "lookup_column_name",
            Field::OnUpdate => "on_update",
            Field::OnDelete => "on_delete",
        }
    }

    /// Resolve a JSON key, accepting snake_case or camelCase spelling
    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|field| field.key() == key || to_camel_case(field.key()) == key)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One flat record from a metadata source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: HashMap<Field, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, mostly for assembling rows in code
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    /// Raw field text; absent fields read as the empty string
    pub fn get(&self, field: Field) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    /// Field text, or `None` when absent or empty
    pub fn value(&self, field: Field) -> Option<&str> {
        Some(self.get(field)).filter(|v| !v.is_empty())
    }

    /// Interpret a field as a flag
    pub fn flag(&self, field: Field) -> bool {
        is_truthy(self.get(field))
    }

    pub fn is_empty(&self) -> bool {
        self.values.values().all(|v| v.is_empty())
    }
}

/// Flag semantics for row fields
pub fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty()
        || ["0", "false", "no", "n", "off"]
            .iter()
            .any(|falsy| value.eq_ignore_ascii_case(falsy)))
}

/// Parse a JSON line into a row. `line_number` is only used for errors.
pub fn parse_record(line: &str, line_number: usize) -> Result<Row> {
    let json: Value = serde_json::from_str(line)
        .map_err(|e| DdlError::parse(line_number, format!("invalid JSON: {}", e)))?;

    let Value::Object(object) = json else {
        return Err(DdlError::parse(line_number, "expected a JSON object"));
    };

    let mut row = Row::new();

    for (key, value) in &object {
        let Some(field) = Field::from_key(key) else {
            tracing::debug!(line = line_number, key = %key, "ignoring unknown row key");
            continue;
        };

        if let Some(text) = extract_value(value, field, line_number)? {
            row.set(field, text);
        }
    }

    Ok(row)
}

fn extract_value(value: &Value, field: Field, line_number: usize) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(if *b { "1" } else { "" }.to_string())),
        Value::Array(_) | Value::Object(_) => Err(DdlError::parse(
            line_number,
            format!("field `{}` must be a scalar value", field),
        )),
    }
}

/// Convert snake_case to camelCase
fn to_camel_case(s: &str) -> String {
    let mut result = String::new();
    let mut capitalize_next = false;

    for c in s.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }

    result
}
