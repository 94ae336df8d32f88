//! Indexes and foreign keys.
//!
//! Both reference their table by schema and table name only. They arrive on
//! their own row streams and may name tables that were never loaded.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::{DdlError, Result};

/// Referential action for ON UPDATE / ON DELETE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ReferentialAction {
    #[default]
    #[serde(rename = "NO ACTION")]
    NoAction,
    #[serde(rename = "RESTRICT")]
    Restrict,
    #[serde(rename = "CASCADE")]
    Cascade,
    #[serde(rename = "SET NULL")]
    SetNull,
    #[serde(rename = "SET DEFAULT")]
    SetDefault,
}

impl ReferentialAction {
    pub const fn as_sql(self) -> &'static str {
        match self {
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
        }
    }
}

impl FromStr for ReferentialAction {
    type Err = DdlError;

    /// Empty text means `NO ACTION`; words may be split by spaces or underscores
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s
            .split(|c: char| c.is_whitespace() || c == '_')
            .filter(|word| !word.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();

        match normalized.as_str() {
            "" | "NO ACTION" => Ok(ReferentialAction::NoAction),
            "RESTRICT" => Ok(ReferentialAction::Restrict),
            "CASCADE" => Ok(ReferentialAction::Cascade),
            "SET NULL" => Ok(ReferentialAction::SetNull),
            "SET DEFAULT" => Ok(ReferentialAction::SetDefault),
            _ => Err(DdlError::InvalidAction(s.to_string())),
        }
    }
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Mutable index used while folding rows
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    key_name: String,
    unique: bool,
    schema_name: String,
    table_name: String,
    columns: Vec<String>,
    locked: bool,
}

impl IndexBuilder {
    pub fn new(
        key_name: impl Into<String>,
        unique: bool,
        schema_name: impl Into<String>,
        table_name: impl Into<String>,
    ) -> Self {
        Self {
            key_name: key_name.into(),
            unique,
            schema_name: schema_name.into(),
            table_name: table_name.into(),
            columns: Vec::new(),
            locked: false,
        }
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn add_column(&mut self, column: impl Into<String>) -> Result<&mut Self> {
        if self.locked {
            return Err(DdlError::immutable(format!("Index '{}'", self.key_name)));
        }
        self.columns.push(column.into());
        Ok(self)
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn build(self) -> Index {
        Index {
            key_name: self.key_name,
            unique: self.unique,
            schema_name: self.schema_name,
            table_name: self.table_name,
            columns: self.columns,
        }
    }
}

/// Finalized index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Index {
    key_name: String,
    unique: bool,
    schema_name: String,
    table_name: String,
    columns: Vec<String>,
}

impl Index {
    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// Local column and the column it references
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnPair {
    pub column: String,
    pub lookup_column: String,
}

/// Mutable foreign key used while folding rows
#[derive(Debug, Clone)]
pub struct ForeignKeyBuilder {
    key_name: String,
    schema_name: String,
    table_name: String,
    lookup_schema_name: String,
    lookup_table_name: String,
    on_update: ReferentialAction,
    on_delete: ReferentialAction,
    columns: Vec<ColumnPair>,
    locked: bool,
}

impl ForeignKeyBuilder {
    pub fn new(
        key_name: impl Into<String>,
        schema_name: impl Into<String>,
        table_name: impl Into<String>,
        lookup_schema_name: impl Into<String>,
        lookup_table_name: impl Into<String>,
    ) -> Self {
        Self {
            key_name: key_name.into(),
            schema_name: schema_name.into(),
            table_name: table_name.into(),
            lookup_schema_name: lookup_schema_name.into(),
            lookup_table_name: lookup_table_name.into(),
            on_update: ReferentialAction::default(),
            on_delete: ReferentialAction::default(),
            columns: Vec::new(),
            locked: false,
        }
    }

    pub fn with_on_update(self, on_update: ReferentialAction) -> Self {
        Self { on_update, ..self }
    }

    pub fn with_on_delete(self, on_delete: ReferentialAction) -> Self {
        Self { on_delete, ..self }
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn lookup_schema_name(&self) -> &str {
        &self.lookup_schema_name
    }

    pub fn lookup_table_name(&self) -> &str {
        &self.lookup_table_name
    }

    pub fn columns(&self) -> &[ColumnPair] {
        &self.columns
    }

    pub fn add_column(
        &mut self,
        column: impl Into<String>,
        lookup_column: impl Into<String>,
    ) -> Result<&mut Self> {
        if self.locked {
            return Err(DdlError::immutable(format!(
                "Foreign key '{}'",
                self.key_name
            )));
        }
        self.columns.push(ColumnPair {
            column: column.into(),
            lookup_column: lookup_column.into(),
        });
        Ok(self)
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn build(self) -> ForeignKey {
        ForeignKey {
            key_name: self.key_name,
            schema_name: self.schema_name,
            table_name: self.table_name,
            lookup_schema_name: self.lookup_schema_name,
            lookup_table_name: self.lookup_table_name,
            on_update: self.on_update,
            on_delete: self.on_delete,
            columns: self.columns,
        }
    }
}

/// Finalized foreign key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKey {
    key_name: String,
    schema_name: String,
    table_name: String,
    lookup_schema_name: String,
    lookup_table_name: String,
    on_update: ReferentialAction,
    on_delete: ReferentialAction,
    columns: Vec<ColumnPair>,
}

impl ForeignKey {
    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn lookup_schema_name(&self) -> &str {
        &self.lookup_schema_name
    }

    pub fn lookup_table_name(&self) -> &str {
        &self.lookup_table_name
    }

    pub fn on_update(&self) -> ReferentialAction {
        self.on_update
    }

    pub fn on_delete(&self) -> ReferentialAction {
        self.on_delete
    }

    pub fn columns(&self) -> &[ColumnPair] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|pair| pair.column.as_str())
    }

    pub fn lookup_column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|pair| pair.lookup_column.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_referential_actions() {
        assert_eq!("".parse::<ReferentialAction>().unwrap(), ReferentialAction::NoAction);
        assert_eq!("cascade".parse::<ReferentialAction>().unwrap(), ReferentialAction::Cascade);
        assert_eq!("set_null".parse::<ReferentialAction>().unwrap(), ReferentialAction::SetNull);
        assert_eq!(
            " Set  Default ".parse::<ReferentialAction>().unwrap(),
            ReferentialAction::SetDefault
        );
        assert_eq!("NO_ACTION".parse::<ReferentialAction>().unwrap(), ReferentialAction::NoAction);
        assert!(matches!(
            "DROP".parse::<ReferentialAction>(),
            Err(DdlError::InvalidAction(_))
        ));
    }

    #[test]
    fn test_index_lock() {
        let mut index = IndexBuilder::new("idx_name", false, "", "users");
        index.add_column("name").unwrap();
        index.lock();
        index.lock();

        let err = index.add_column("id").unwrap_err();
        assert!(matches!(err, DdlError::Immutable { .. }));

        let index = index.build();
        assert_eq!(index.columns(), ["name"]);
        assert!(!index.is_unique());
    }

    #[test]
    fn test_foreign_key_pairs_keep_order() {
        let mut fk = ForeignKeyBuilder::new("fk_orders_user", "shop", "orders", "auth", "users")
            .with_on_delete(ReferentialAction::Cascade);
        fk.add_column("user_id", "id").unwrap();
        fk.add_column("tenant_id", "tenant").unwrap();

        let fk = fk.build();
        assert_eq!(fk.column_names().collect::<Vec<_>>(), ["user_id", "tenant_id"]);
        assert_eq!(fk.lookup_column_names().collect::<Vec<_>>(), ["id", "tenant"]);
        assert_eq!(fk.on_update(), ReferentialAction::NoAction);
        assert_eq!(fk.on_delete().to_string(), "CASCADE");
    }

    #[test]
    fn test_foreign_key_lock() {
        let mut fk = ForeignKeyBuilder::new("fk", "", "a", "", "b");
        fk.lock();
        assert!(fk.is_locked());
        assert!(matches!(
            fk.add_column("x", "y").unwrap_err(),
            DdlError::Immutable { .. }
        ));
    }
}
