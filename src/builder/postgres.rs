//! DDL for PostgreSQL.

use std::borrow::Cow;

use crate::error::{DdlError, Result};
use crate::schema::{Column, Definition, ForeignKey, Index, Schema, Table};

use super::common::{
    create_foreign_key_sql, create_index_sql, drop_section, is_character_type, qualified_name,
    quote_list, quote_with, type_matches, NUMERIC_TYPE_KEYWORDS,
};
use super::{BuilderConfig, DialectBuilder};

/// PostgreSQL builder. Identifiers use double quotes and auto-increment
/// columns become `SERIAL` types.
#[derive(Debug, Clone, Default)]
pub struct PostgresBuilder {
    config: BuilderConfig,
}

impl PostgresBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    /// `add_empty_string = true`, `\n` line endings, four-space indent, UTF-8
    pub fn default_config() -> BuilderConfig {
        BuilderConfig::default()
    }

    pub fn quote_identifier(&self, name: &str) -> String {
        quote_with(name, '"')
    }

    pub fn quote_string(&self, text: &str) -> String {
        quote_with(text, '\'')
    }

    pub fn is_numeric_type(&self, data_type: &str) -> bool {
        type_matches(data_type, NUMERIC_TYPE_KEYWORDS)
    }

    fn qualified(&self, schema: &str, table: &str) -> String {
        qualified_name(schema, table, |name| self.quote_identifier(name))
    }

    /// Data type as rendered, with auto-increment mapped onto the serial types
    fn column_type<'a>(&self, column: &'a Column) -> Result<Cow<'a, str>> {
        let data_type = column.data_type();
        if !column.is_auto_increment() {
            return Ok(Cow::Borrowed(data_type));
        }

        let upper = data_type.to_ascii_uppercase();
        if upper.contains("SERIAL") {
            return Ok(Cow::Borrowed(data_type));
        }

        if !self.is_numeric_type(data_type) {
            return Err(DdlError::UnsupportedAutoIncrement {
                column: column.name().to_string(),
                data_type: data_type.to_string(),
            });
        }

        let serial = if upper.contains("BIGINT") || upper == "INT8" {
            "BIGSERIAL"
        } else if upper.contains("SMALLINT") || upper.contains("TINYINT") || upper == "INT2" {
            "SMALLSERIAL"
        } else {
            "SERIAL"
        };
        Ok(Cow::Borrowed(serial))
    }

    fn column_definition(&self, column: &Column) -> Result<String> {
        let data_type = self.column_type(column)?;

        let mut sql = format!(
            "{}{} {}",
            self.config.indent,
            self.quote_identifier(column.name()),
            data_type
        );

        if let Some(length) = column.length() {
            sql.push_str(&format!("({})", length));
        }

        if column.is_required() {
            sql.push_str(" NOT NULL");
        }

        match column.default_value() {
            Some(default) if self.is_numeric_type(&data_type) => {
                sql.push_str(&format!(" DEFAULT {}", default));
            }
            Some(default) => {
                sql.push_str(&format!(" DEFAULT {}", self.quote_string(default)));
            }
            None if self.config.add_empty_string && is_character_type(&data_type) => {
                sql.push_str(" DEFAULT ''");
            }
            None => {}
        }

        Ok(sql)
    }

    fn comments(&self, schema: &Schema, table: &Table) -> String {
        let eol = &self.config.end_of_line;
        let qualified = self.qualified(schema.name(), table.name());
        let mut sql = String::new();

        if let Some(comment) = table.comment() {
            sql.push_str(&format!(
                "COMMENT ON TABLE {} IS {};{}",
                qualified,
                self.quote_string(comment),
                eol
            ));
        }

        for column in table.columns() {
            let Some(comment) = column.comment() else {
                continue;
            };
            sql.push_str(&format!(
                "COMMENT ON COLUMN {}.{} IS {};{}",
                qualified,
                self.quote_identifier(column.name()),
                self.quote_string(comment),
                eol
            ));
        }

        sql
    }
}

impl DialectBuilder for PostgresBuilder {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn config(&self) -> &BuilderConfig {
        &self.config
    }

    fn build_create_table(&self, schema: &Schema, table: &Table) -> Result<String> {
        tracing::debug!(schema = %schema, table = %table, "building CREATE TABLE");

        let eol = &self.config.end_of_line;
        let indent = &self.config.indent;

        let columns = table
            .columns()
            .map(|column| self.column_definition(column))
            .collect::<Result<Vec<_>>>()?;

        let mut sql = format!(
            "CREATE TABLE {} ({}",
            self.qualified(schema.name(), table.name()),
            eol
        );
        sql.push_str(&columns.join(&format!(",{}", eol)));
        sql.push_str(eol);

        if !table.primary_key().is_empty() {
            let primary_key = quote_list(table.primary_key().iter().map(String::as_str), |name| {
                self.quote_identifier(name)
            });
            sql.push_str(&format!(
                ",{eol}{eol}{indent}PRIMARY KEY ({}){eol}",
                primary_key
            ));
        }

        sql.push_str(&format!(");{}", eol));
        sql.push_str(&self.comments(schema, table));

        self.config.encoding.encode(sql)
    }

    fn build_drop_table(&self, schema: &Schema, table: &Table) -> Result<String> {
        self.config.encoding.encode(format!(
            "DROP TABLE IF EXISTS {} CASCADE;",
            self.qualified(schema.name(), table.name())
        ))
    }

    fn build_all_drop_table(&self, definition: &Definition) -> Result<String> {
        let sql = drop_section(definition, &self.config.end_of_line, |schema, table| {
            self.build_drop_table(schema, table)
        })?;
        self.config.encoding.encode(sql)
    }

    fn build_create_index(&self, index: &Index) -> Result<String> {
        self.config
            .encoding
            .encode(create_index_sql(index, |name| self.quote_identifier(name)))
    }

    fn build_create_foreign_key(&self, foreign_key: &ForeignKey) -> Result<String> {
        self.config.encoding.encode(create_foreign_key_sql(foreign_key, |name| {
            self.quote_identifier(name)
        }))
    }
}
