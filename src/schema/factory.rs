//! Folding of flat metadata rows into a [`Definition`].
//!
//! Sources emit denormalized rows where header fields (schema, table, key
//! name) are usually only filled on the row that starts a new group. Blank
//! header fields carry the previous group forward.

use crate::error::Result;
use crate::parser::{Field, MetadataSource, Row, SourceRole};

use super::definition::{Definition, DefinitionBuilder, DiagnosticSink};
use super::keys::{ForeignKeyBuilder, IndexBuilder, ReferentialAction};
use super::types::{Column, TableBuilder};

/// Collects metadata sources and builds a finalized [`Definition`]
#[derive(Default)]
pub struct DefinitionFactory {
    table_sources: Vec<Box<dyn MetadataSource>>,
    index_sources: Vec<Box<dyn MetadataSource>>,
    foreign_key_sources: Vec<Box<dyn MetadataSource>>,
}

impl DefinitionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table_source(&mut self, source: impl MetadataSource + 'static) -> &mut Self {
        self.table_sources.push(tag(source, SourceRole::Table));
        self
    }

    pub fn add_index_source(&mut self, source: impl MetadataSource + 'static) -> &mut Self {
        self.index_sources.push(tag(source, SourceRole::Index));
        self
    }

    pub fn add_foreign_key_source(&mut self, source: impl MetadataSource + 'static) -> &mut Self {
        self.foreign_key_sources
            .push(tag(source, SourceRole::ForeignKey));
        self
    }

    /// Fold tables, then indexes, then foreign keys, and finalize
    pub fn create(&mut self, sink: Option<&mut dyn DiagnosticSink>) -> Result<Definition> {
        let mut definition = DefinitionBuilder::new();

        for source in &mut self.table_sources {
            fold_table_rows(&mut definition, source.read()?)?;
        }

        for source in &mut self.index_sources {
            fold_index_rows(&mut definition, source.read()?)?;
        }

        for source in &mut self.foreign_key_sources {
            fold_foreign_key_rows(&mut definition, source.read()?)?;
        }

        definition.finalize(sink)
    }
}

fn tag(mut source: impl MetadataSource + 'static, role: SourceRole) -> Box<dyn MetadataSource> {
    source.set_role(role);
    Box::new(source)
}

/// Fold schema × table × column rows into schemas, tables and columns
pub fn fold_table_rows<I>(definition: &mut DefinitionBuilder, rows: I) -> Result<()>
where
    I: IntoIterator<Item = Result<Row>>,
{
    let mut current_schema: Option<String> = None;
    // (schema, table) of the last row that named a table
    let mut current_table: Option<(String, String)> = None;

    for row in rows {
        let row = row?;

        let schema_name = row.get(Field::SchemaName);
        if current_schema.is_none() || !schema_name.is_empty() {
            definition.schema_or_insert(schema_name)?;
            current_schema = Some(schema_name.to_string());
        }

        if let (Some(table_name), Some(schema_key)) =
            (row.value(Field::TableName), current_schema.as_deref())
        {
            if let Some(schema) = definition.schema_mut(schema_key) {
                if schema.table(table_name).is_none() {
                    tracing::debug!(schema = %schema_key, table = %table_name, "creating table");
                    let comment = row.value(Field::TableComment).map(str::to_string);
                    schema.add_table(TableBuilder::new(table_name, comment)?)?;
                }
                current_table = Some((schema_key.to_string(), table_name.to_string()));
            }
        }

        let table = match &current_table {
            Some((schema_key, table_name)) => definition
                .schema_mut(schema_key)
                .and_then(|schema| schema.table_mut(table_name)),
            None => None,
        };
        let Some(table) = table else {
            tracing::debug!("skipping row without an owning table");
            continue;
        };

        if let Some(column_name) = row.value(Field::ColumnName) {
            table.add_column(column_from_row(column_name, &row))?;

            if row.flag(Field::ColumnPrimaryKey) {
                table.add_primary_key(column_name)?;
            }
        }
    }

    Ok(())
}

fn column_from_row(name: &str, row: &Row) -> Column {
    Column::new(name, row.get(Field::ColumnDataType))
        .with_required(row.flag(Field::ColumnRequired))
        .with_length(row.get(Field::ColumnLength))
        .with_default(row.get(Field::ColumnDefault))
        .with_comment(row.get(Field::ColumnComment))
        .with_auto_increment(row.flag(Field::ColumnAutoIncrement))
}

/// Fold index rows; a key name starts a new index, column rows extend it
pub fn fold_index_rows<I>(definition: &mut DefinitionBuilder, rows: I) -> Result<()>
where
    I: IntoIterator<Item = Result<Row>>,
{
    let mut current: Option<usize> = None;

    for row in rows {
        let row = row?;

        if let Some(key_name) = row.value(Field::KeyName) {
            definition.add_index(IndexBuilder::new(
                key_name,
                row.flag(Field::UniqueIndex),
                row.get(Field::SchemaName),
                row.get(Field::TableName),
            ))?;
            current = Some(definition.indexes().len() - 1);
        }

        let Some(idx) = current else {
            tracing::debug!("skipping index row before the first key name");
            continue;
        };

        if let (Some(column_name), Some(index)) =
            (row.value(Field::ColumnName), definition.index_mut(idx))
        {
            index.add_column(column_name)?;
        }
    }

    Ok(())
}

/// Fold foreign key rows; a key name starts a new key, column rows add pairs
pub fn fold_foreign_key_rows<I>(definition: &mut DefinitionBuilder, rows: I) -> Result<()>
where
    I: IntoIterator<Item = Result<Row>>,
{
    let mut current: Option<usize> = None;

    for row in rows {
        let row = row?;

        if let Some(key_name) = row.value(Field::KeyName) {
            let on_update: ReferentialAction = row.get(Field::OnUpdate).parse()?;
            let on_delete: ReferentialAction = row.get(Field::OnDelete).parse()?;

            definition.add_foreign_key(
                ForeignKeyBuilder::new(
                    key_name,
                    row.get(Field::SchemaName),
                    row.get(Field::TableName),
                    row.get(Field::LookupSchemaName),
                    row.get(Field::LookupTableName),
                )
                .with_on_update(on_update)
                .with_on_delete(on_delete),
            )?;
            current = Some(definition.foreign_keys().len() - 1);
        }

        let Some(idx) = current else {
            tracing::debug!("skipping foreign key row before the first key name");
            continue;
        };

        if let (Some(column_name), Some(foreign_key)) =
            (row.value(Field::ColumnName), definition.foreign_key_mut(idx))
        {
            foreign_key.add_column(column_name, row.get(Field::LookupColumnName))?;
        }
    }

    Ok(())
}
