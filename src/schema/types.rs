use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

use crate::error::{DdlError, Result};

/// Treat empty text as absent
pub(crate) fn non_empty(value: impl Into<String>) -> Option<String> {
    Some(value.into()).filter(|v| !v.is_empty())
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    name: String,
    data_type: String,
    required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    length: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    auto_increment: bool,
}

impl Column {
    /// Create an optional (nullable) column
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            required: false,
            length: None,
            default: None,
            comment: None,
            auto_increment: false,
        }
    }

    pub fn with_required(self, required: bool) -> Self {
        Self { required, ..self }
    }

    /// Length text such as `50` or `10,2`; empty means none
    pub fn with_length(self, length: impl Into<String>) -> Self {
        Self {
            length: non_empty(length),
            ..self
        }
    }

    /// Default value text; empty means none
    pub fn with_default(self, default: impl Into<String>) -> Self {
        Self {
            default: non_empty(default),
            ..self
        }
    }

    pub fn with_comment(self, comment: impl Into<String>) -> Self {
        Self {
            comment: non_empty(comment),
            ..self
        }
    }

    pub fn with_auto_increment(self, auto_increment: bool) -> Self {
        Self {
            auto_increment,
            ..self
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn length(&self) -> Option<&str> {
        self.length.as_deref()
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment
    }
}

/// Mutable table used while folding rows.
///
/// Columns keep insertion order. Every primary key entry must name a column
/// that is already present.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    name: String,
    comment: Option<String>,
    columns: IndexMap<String, Column>,
    primary_key: Vec<String>,
    locked: bool,
}

impl TableBuilder {
    pub fn new(name: impl Into<String>, comment: Option<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DdlError::InvalidIdentity);
        }

        Ok(Self {
            name,
            comment: comment.and_then(non_empty),
            columns: IndexMap::new(),
            primary_key: Vec::new(),
            locked: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    pub fn count_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    pub fn add_column(&mut self, column: Column) -> Result<&mut Self> {
        self.ensure_unlocked()?;

        if self.columns.contains_key(column.name()) {
            return Err(DdlError::DuplicateColumn {
                table: self.name.clone(),
                column: column.name().to_string(),
            });
        }

        self.columns.insert(column.name().to_string(), column);
        Ok(self)
    }

    /// Append a column to the primary key
    pub fn add_primary_key(&mut self, column: &str) -> Result<&mut Self> {
        self.ensure_unlocked()?;
        self.ensure_column(column)?;

        self.primary_key.push(column.to_string());
        Ok(self)
    }

    /// Replace the primary key. Nothing changes if any column is missing.
    pub fn set_primary_key<I, S>(&mut self, columns: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ensure_unlocked()?;

        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        for column in &columns {
            self.ensure_column(column)?;
        }

        self.primary_key = columns;
        Ok(self)
    }

    /// Columns are owned values, so locking the table freezes them too
    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Re-check the primary key against the column set
    pub fn validate(&self) -> Result<()> {
        self.primary_key
            .iter()
            .try_for_each(|column| self.ensure_column(column))
    }

    /// Validate and convert into the immutable table
    pub fn build(self) -> Result<Table> {
        self.validate()?;

        Ok(Table {
            name: self.name,
            comment: self.comment,
            columns: self.columns,
            primary_key: self.primary_key,
        })
    }

    fn ensure_unlocked(&self) -> Result<()> {
        if self.locked {
            return Err(DdlError::immutable(format!("Table '{}'", self.name)));
        }
        Ok(())
    }

    fn ensure_column(&self, column: &str) -> Result<()> {
        if !self.columns.contains_key(column) {
            return Err(DdlError::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            });
        }
        Ok(())
    }
}

/// Finalized table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    columns: IndexMap<String, Column>,
    primary_key: Vec<String>,
}

impl Table {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    pub fn count_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Mutable schema used while folding rows. The empty name is the default schema.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    name: String,
    tables: IndexMap<String, TableBuilder>,
    locked: bool,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: IndexMap::new(),
            locked: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self, name: &str) -> Option<&TableBuilder> {
        self.tables.get(name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut TableBuilder> {
        self.tables.get_mut(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableBuilder> {
        self.tables.values()
    }

    pub fn count_tables(&self) -> usize {
        self.tables.len()
    }

    pub fn add_table(&mut self, table: TableBuilder) -> Result<&mut TableBuilder> {
        if self.locked {
            return Err(DdlError::immutable(format!("Schema '{}'", self.name)));
        }

        if self.tables.contains_key(table.name()) {
            return Err(DdlError::DuplicateTable {
                schema: self.name.clone(),
                table: table.name().to_string(),
            });
        }

        let entry = self.tables.entry(table.name().to_string());
        Ok(entry.or_insert(table))
    }

    /// Lock the schema and every table in it
    pub fn lock(&mut self) {
        self.locked = true;
        self.tables.values_mut().for_each(TableBuilder::lock);
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn build(self) -> Result<Schema> {
        let tables = self
            .tables
            .into_iter()
            .map(|(name, table)| Ok((name, table.build()?)))
            .collect::<Result<_>>()?;

        Ok(Schema {
            name: self.name,
            tables,
        })
    }
}

/// Finalized schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    name: String,
    tables: IndexMap<String, Table>,
}

impl Schema {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn count_tables(&self) -> usize {
        self.tables.len()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> TableBuilder {
        let mut table = TableBuilder::new("users", None).unwrap();
        table
            .add_column(Column::new("id", "INTEGER").with_required(true))
            .unwrap()
            .add_column(Column::new("name", "VARCHAR").with_length("50"))
            .unwrap();
        table
    }

    #[test]
    fn test_empty_table_name_is_rejected() {
        let err = TableBuilder::new("", Some("comment".into())).unwrap_err();
        assert!(matches!(err, DdlError::InvalidIdentity));
    }

    #[test]
    fn test_empty_comment_is_absent() {
        let table = TableBuilder::new("t", Some(String::new())).unwrap();
        assert_eq!(table.comment(), None);
    }

    #[test]
    fn test_column_empty_text_fields_are_absent() {
        let column = Column::new("c", "TEXT")
            .with_length("")
            .with_default("")
            .with_comment("");
        assert_eq!(column.length(), None);
        assert_eq!(column.default_value(), None);
        assert_eq!(column.comment(), None);
    }

    #[test]
    fn test_duplicate_column_is_rejected() {
        let mut table = users();
        let err = table.add_column(Column::new("id", "BIGINT")).unwrap_err();
        assert!(matches!(err, DdlError::DuplicateColumn { .. }));
        assert_eq!(table.column("id").unwrap().data_type(), "INTEGER");
    }

    #[test]
    fn test_columns_keep_insertion_order() {
        let table = users();
        let names: Vec<_> = table.columns().map(Column::name).collect();
        assert_eq!(names, ["id", "name"]);
    }

    #[test]
    fn test_primary_key_aggregates_in_order() {
        let mut table = users();
        table.add_primary_key("name").unwrap();
        table.add_primary_key("id").unwrap();
        assert_eq!(table.primary_key(), ["name", "id"]);
    }

    #[test]
    fn test_primary_key_requires_existing_column() {
        let mut table = users();
        let err = table.add_primary_key("missing").unwrap_err();
        assert!(matches!(err, DdlError::MissingColumn { .. }));
        assert!(table.primary_key().is_empty());
    }

    #[test]
    fn test_set_primary_key_replaces_atomically() {
        let mut table = users();
        table.add_primary_key("id").unwrap();

        assert!(table.set_primary_key(["name", "missing"]).is_err());
        assert_eq!(table.primary_key(), ["id"]);

        table.set_primary_key(["name"]).unwrap();
        assert_eq!(table.primary_key(), ["name"]);
    }

    #[test]
    fn test_lock_is_idempotent() {
        let mut table = users();
        table.lock();
        table.lock();
        assert!(table.is_locked());

        let err = table.add_column(Column::new("extra", "TEXT")).unwrap_err();
        assert!(matches!(err, DdlError::Immutable { .. }));
        assert!(matches!(
            table.add_primary_key("id").unwrap_err(),
            DdlError::Immutable { .. }
        ));
        assert!(matches!(
            table.set_primary_key(["id"]).unwrap_err(),
            DdlError::Immutable { .. }
        ));
        assert_eq!(table.count_columns(), 2);
    }

    #[test]
    fn test_schema_lock_cascades_to_tables() {
        let mut schema = SchemaBuilder::new("public");
        schema.add_table(users()).unwrap();
        schema.lock();

        let table = schema.table_mut("users").unwrap();
        assert!(table.is_locked());
        assert!(table.add_column(Column::new("extra", "TEXT")).is_err());

        let err = schema
            .add_table(TableBuilder::new("other", None).unwrap())
            .unwrap_err();
        assert!(matches!(err, DdlError::Immutable { .. }));
    }

    #[test]
    fn test_schema_rejects_duplicate_table() {
        let mut schema = SchemaBuilder::new("");
        schema.add_table(users()).unwrap();
        let err = schema.add_table(users()).unwrap_err();
        assert!(matches!(err, DdlError::DuplicateTable { .. }));
    }

    #[test]
    fn test_build_preserves_structure() {
        let mut schema = SchemaBuilder::new("");
        schema
            .add_table(users())
            .unwrap()
            .add_primary_key("id")
            .unwrap();

        let schema = schema.build().unwrap();
        assert_eq!(schema.name(), "");
        assert_eq!(schema.count_tables(), 1);

        let table = schema.table("users").unwrap();
        assert_eq!(table.to_string(), "users");
        assert_eq!(table.primary_key(), ["id"]);
        assert_eq!(table.column("name").unwrap().length(), Some("50"));
    }
}
