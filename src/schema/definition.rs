use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

use crate::error::{DdlError, Result};

use super::keys::{ForeignKey, ForeignKeyBuilder, Index, IndexBuilder};
use super::types::{Schema, SchemaBuilder, Table, TableBuilder};

/// Non-fatal observation made while finalizing a definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Index or foreign key on a table the table stream never loaded
    UnknownTable {
        key_name: String,
        schema_name: String,
        table_name: String,
    },
    /// Foreign key referencing a table the table stream never loaded
    UnknownLookupTable {
        key_name: String,
        schema_name: String,
        table_name: String,
    },
    /// Key column not present on its (loaded) table
    UnknownColumn {
        key_name: String,
        table_name: String,
        column_name: String,
    },
    /// Index or foreign key without any column rows
    EmptyKey { key_name: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownTable {
                key_name,
                schema_name,
                table_name,
            } => write!(
                f,
                "key '{}' is defined on unknown table '{}'",
                key_name,
                display_name(schema_name, table_name)
            ),
            Diagnostic::UnknownLookupTable {
                key_name,
                schema_name,
                table_name,
            } => write!(
                f,
                "foreign key '{}' references unknown table '{}'",
                key_name,
                display_name(schema_name, table_name)
            ),
            Diagnostic::UnknownColumn {
                key_name,
                table_name,
                column_name,
            } => write!(
                f,
                "key '{}' uses column '{}' which is not found in {}",
                key_name, column_name, table_name
            ),
            Diagnostic::EmptyKey { key_name } => write!(f, "key '{}' has no columns", key_name),
        }
    }
}

fn display_name(schema: &str, table: &str) -> String {
    if schema.is_empty() {
        table.to_string()
    } else {
        format!("{}.{}", schema, table)
    }
}

/// Receives diagnostics produced by [`DefinitionBuilder::finalize`]
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Root aggregate while rows are being folded
#[derive(Debug, Clone, Default)]
pub struct DefinitionBuilder {
    schemas: IndexMap<String, SchemaBuilder>,
    indexes: Vec<IndexBuilder>,
    foreign_keys: Vec<ForeignKeyBuilder>,
    locked: bool,
}

impl DefinitionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema(&self, name: &str) -> Option<&SchemaBuilder> {
        self.schemas.get(name)
    }

    pub fn schema_mut(&mut self, name: &str) -> Option<&mut SchemaBuilder> {
        self.schemas.get_mut(name)
    }

    pub fn schemas(&self) -> impl Iterator<Item = &SchemaBuilder> {
        self.schemas.values()
    }

    pub fn count_schemas(&self) -> usize {
        self.schemas.len()
    }

    pub fn indexes(&self) -> &[IndexBuilder] {
        &self.indexes
    }

    pub fn foreign_keys(&self) -> &[ForeignKeyBuilder] {
        &self.foreign_keys
    }

    pub fn index_mut(&mut self, idx: usize) -> Option<&mut IndexBuilder> {
        self.indexes.get_mut(idx)
    }

    pub fn foreign_key_mut(&mut self, idx: usize) -> Option<&mut ForeignKeyBuilder> {
        self.foreign_keys.get_mut(idx)
    }

    /// Attach a schema; an existing schema of the same name is kept
    pub fn add_schema(&mut self, schema: SchemaBuilder) -> Result<&mut SchemaBuilder> {
        self.ensure_unlocked()?;
        Ok(self
            .schemas
            .entry(schema.name().to_string())
            .or_insert(schema))
    }

    /// Resolve a schema by name, creating it when missing
    pub fn schema_or_insert(&mut self, name: &str) -> Result<&mut SchemaBuilder> {
        if self.schemas.contains_key(name) {
            return Ok(&mut self.schemas[name]);
        }
        tracing::debug!(schema = %name, "creating schema");
        self.add_schema(SchemaBuilder::new(name))
    }

    pub fn add_index(&mut self, index: IndexBuilder) -> Result<&mut IndexBuilder> {
        self.ensure_unlocked()?;
        let idx = self.indexes.len();
        self.indexes.push(index);
        Ok(&mut self.indexes[idx])
    }

    pub fn add_foreign_key(&mut self, foreign_key: ForeignKeyBuilder) -> Result<&mut ForeignKeyBuilder> {
        self.ensure_unlocked()?;
        let idx = self.foreign_keys.len();
        self.foreign_keys.push(foreign_key);
        Ok(&mut self.foreign_keys[idx])
    }

    /// Lock every schema, table, index and foreign key
    pub fn lock(&mut self) {
        self.locked = true;
        self.schemas.values_mut().for_each(SchemaBuilder::lock);
        self.indexes.iter_mut().for_each(IndexBuilder::lock);
        self.foreign_keys.iter_mut().for_each(ForeignKeyBuilder::lock);
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Validate, lock and freeze the graph.
    ///
    /// Primary keys naming missing columns are fatal. Keys that point at
    /// unknown tables or columns, and keys without columns, are reported to
    /// `sink` and logged but do not stop construction.
    pub fn finalize(mut self, mut sink: Option<&mut dyn DiagnosticSink>) -> Result<Definition> {
        for schema in self.schemas.values() {
            schema.tables().try_for_each(TableBuilder::validate)?;
        }

        for diagnostic in self.diagnostics() {
            tracing::warn!("{}", diagnostic);
            if let Some(sink) = sink.as_deref_mut() {
                sink.report(diagnostic);
            }
        }

        self.lock();

        let schemas = self
            .schemas
            .into_iter()
            .map(|(name, schema)| Ok((name, schema.build()?)))
            .collect::<Result<_>>()?;

        let definition = Definition {
            schemas,
            indexes: self.indexes.into_iter().map(IndexBuilder::build).collect(),
            foreign_keys: self
                .foreign_keys
                .into_iter()
                .map(ForeignKeyBuilder::build)
                .collect(),
        };

        tracing::debug!(
            schemas = definition.count_schemas(),
            tables = definition.tables().count(),
            indexes = definition.indexes.len(),
            foreign_keys = definition.foreign_keys.len(),
            "definition finalized"
        );

        Ok(definition)
    }

    fn diagnostics(&self) -> Vec<Diagnostic> {
        let has_tables = self.schemas.values().any(|s| s.count_tables() > 0);
        let find_table = |schema: &str, table: &str| {
            self.schemas.get(schema).and_then(|s| s.table(table))
        };

        let mut diagnostics = Vec::new();

        let mut check_key = |key_name: &str, schema: &str, table: &str, columns: Vec<&str>| {
            if columns.is_empty() {
                diagnostics.push(Diagnostic::EmptyKey {
                    key_name: key_name.to_string(),
                });
            }

            if !has_tables {
                return;
            }

            match find_table(schema, table) {
                None => diagnostics.push(Diagnostic::UnknownTable {
                    key_name: key_name.to_string(),
                    schema_name: schema.to_string(),
                    table_name: table.to_string(),
                }),
                Some(owner) => {
                    for column in columns.into_iter().filter(|c| !owner.has_column(c)) {
                        diagnostics.push(Diagnostic::UnknownColumn {
                            key_name: key_name.to_string(),
                            table_name: table.to_string(),
                            column_name: column.to_string(),
                        });
                    }
                }
            }
        };

        for index in &self.indexes {
            let columns = index.columns().iter().map(String::as_str).collect();
            check_key(index.key_name(), index.schema_name(), index.table_name(), columns);
        }

        for fk in &self.foreign_keys {
            let columns = fk.columns().iter().map(|p| p.column.as_str()).collect();
            check_key(fk.key_name(), fk.schema_name(), fk.table_name(), columns);
        }

        if has_tables {
            for fk in &self.foreign_keys {
                if find_table(fk.lookup_schema_name(), fk.lookup_table_name()).is_none() {
                    diagnostics.push(Diagnostic::UnknownLookupTable {
                        key_name: fk.key_name().to_string(),
                        schema_name: fk.lookup_schema_name().to_string(),
                        table_name: fk.lookup_table_name().to_string(),
                    });
                }
            }
        }

        diagnostics
    }

    fn ensure_unlocked(&self) -> Result<()> {
        if self.locked {
            return Err(DdlError::immutable("Definition"));
        }
        Ok(())
    }
}

/// Finalized, immutable schema definition
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Definition {
    schemas: IndexMap<String, Schema>,
    indexes: Vec<Index>,
    foreign_keys: Vec<ForeignKey>,
}

impl Definition {
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    pub fn schemas(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.values()
    }

    pub fn count_schemas(&self) -> usize {
        self.schemas.len()
    }

    /// Look up a table by schema and table name
    pub fn table(&self, schema: &str, table: &str) -> Option<&Table> {
        self.schema(schema).and_then(|s| s.table(table))
    }

    /// Every table with its owning schema, in insertion order
    pub fn tables(&self) -> impl Iterator<Item = (&Schema, &Table)> {
        self.schemas
            .values()
            .flat_map(|schema| schema.tables().map(move |table| (schema, table)))
    }

    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }
}
