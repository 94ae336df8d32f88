//! DDL for MySQL.

use crate::error::{DdlError, Result};
use crate::schema::{Column, Definition, ForeignKey, Index, Schema, Table};

use super::common::{
    create_foreign_key_sql, create_index_sql, drop_section, is_character_type, qualified_name,
    quote_list, quote_with, type_matches, NUMERIC_TYPE_KEYWORDS,
};
use super::{BuilderConfig, DialectBuilder};

/// MySQL builder. Identifiers use backticks, comments are inline and
/// auto-increment is a column attribute.
#[derive(Debug, Clone, Default)]
pub struct MySqlBuilder {
    config: BuilderConfig,
}

impl MySqlBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    pub fn default_config() -> BuilderConfig {
        BuilderConfig::default()
    }

    pub fn quote_identifier(&self, name: &str) -> String {
        quote_with(name, '`')
    }

    /// Single-quoted literal. Backslash is an escape character in MySQL
    /// string literals, so it is doubled as well.
    pub fn quote_string(&self, text: &str) -> String {
        quote_with(&text.replace('\\', "\\\\"), '\'')
    }

    pub fn is_numeric_type(&self, data_type: &str) -> bool {
        type_matches(data_type, NUMERIC_TYPE_KEYWORDS)
    }

    fn qualified(&self, schema: &str, table: &str) -> String {
        qualified_name(schema, table, |name| self.quote_identifier(name))
    }

    fn column_definition(&self, column: &Column) -> Result<String> {
        let data_type = column.data_type();
        let serial = data_type.to_ascii_uppercase().contains("SERIAL");

        if column.is_auto_increment() && !serial && !self.is_numeric_type(data_type) {
            return Err(DdlError::UnsupportedAutoIncrement {
                column: column.name().to_string(),
                data_type: data_type.to_string(),
            });
        }

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

        if column.is_auto_increment() && !serial {
            sql.push_str(" AUTO_INCREMENT");
        }

        match column.default_value() {
            Some(default) if self.is_numeric_type(data_type) => {
                sql.push_str(&format!(" DEFAULT {}", default));
            }
            Some(default) => {
                sql.push_str(&format!(" DEFAULT {}", self.quote_string(default)));
            }
            None if self.config.add_empty_string && is_character_type(data_type) => {
                sql.push_str(" DEFAULT ''");
            }
            None => {}
        }

        if let Some(comment) = column.comment() {
            sql.push_str(&format!(" COMMENT {}", self.quote_string(comment)));
        }

        Ok(sql)
    }
}

impl DialectBuilder for MySqlBuilder {
    fn name(&self) -> &'static str {
        "mysql"
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

        match table.comment() {
            Some(comment) => {
                sql.push_str(&format!(") COMMENT={};{}", self.quote_string(comment), eol));
            }
            None => sql.push_str(&format!(");{}", eol)),
        }

        self.config.encoding.encode(sql)
    }

    fn build_drop_table(&self, schema: &Schema, table: &Table) -> Result<String> {
        self.config.encoding.encode(format!(
            "DROP TABLE IF EXISTS {};",
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ForeignKeyBuilder, IndexBuilder, ReferentialAction, SchemaBuilder, TableBuilder};

    fn builder() -> MySqlBuilder {
        MySqlBuilder::new(MySqlBuilder::default_config())
    }

    fn render(table: TableBuilder) -> Result<String> {
        let name = table.name().to_string();
        let mut schema = SchemaBuilder::new("shop");
        schema.add_table(table).unwrap();
        let schema = schema.build().unwrap();
        builder().build_create_table(&schema, schema.table(&name).unwrap())
    }

    #[test]
    fn test_create_table() {
        let mut table = TableBuilder::new("users", Some("Registered users".into())).unwrap();
        table
            .add_column(
                Column::new("id", "INT")
                    .with_required(true)
                    .with_auto_increment(true),
            )
            .unwrap()
            .add_column(
                Column::new("name", "VARCHAR")
                    .with_length("50")
                    .with_required(true)
                    .with_comment("Display name"),
            )
            .unwrap()
            .add_primary_key("id")
            .unwrap();

        assert_eq!(
            render(table).unwrap(),
            "CREATE TABLE `shop`.`users` (\n    `id` INT NOT NULL AUTO_INCREMENT,\n    `name` VARCHAR(50) NOT NULL DEFAULT '' COMMENT 'Display name'\n,\n\n    PRIMARY KEY (`id`)\n) COMMENT='Registered users';\n"
        );
    }

    #[test]
    fn test_serial_passes_without_attribute() {
        let mut table = TableBuilder::new("t", None).unwrap();
        table
            .add_column(Column::new("id", "SERIAL").with_auto_increment(true))
            .unwrap();

        let sql = render(table).unwrap();
        assert!(sql.contains("`id` SERIAL\n"));
        assert!(!sql.contains("AUTO_INCREMENT"));
    }

    #[test]
    fn test_auto_increment_on_text_fails() {
        let mut table = TableBuilder::new("t", None).unwrap();
        table
            .add_column(Column::new("id", "VARCHAR").with_auto_increment(true))
            .unwrap();

        assert!(matches!(
            render(table),
            Err(DdlError::UnsupportedAutoIncrement { .. })
        ));
    }

    #[test]
    fn test_string_quoting_escapes_backslash() {
        let b = builder();
        assert_eq!(b.quote_string("it's"), "'it''s'");
        assert_eq!(b.quote_string(r"C:\temp"), r"'C:\\temp'");
        assert_eq!(b.quote_identifier("odd`name"), "`odd``name`");
    }

    #[test]
    fn test_numeric_default() {
        let mut table = TableBuilder::new("t", None).unwrap();
        table
            .add_column(Column::new("price", "DECIMAL").with_length("10,2").with_default("0"))
            .unwrap();

        assert!(render(table).unwrap().contains("`price` DECIMAL(10,2) DEFAULT 0\n"));
    }

    #[test]
    fn test_drop_and_keys() {
        let mut schema = SchemaBuilder::new("");
        schema.add_table(TableBuilder::new("orders", None).unwrap()).unwrap();
        let schema = schema.build().unwrap();
        assert_eq!(
            builder()
                .build_drop_table(&schema, schema.table("orders").unwrap())
                .unwrap(),
            "DROP TABLE IF EXISTS `orders`;"
        );

        let mut index = IndexBuilder::new("idx_orders_user", false, "", "orders");
        index.add_column("user_id").unwrap();
        assert_eq!(
            builder().build_create_index(&index.build()).unwrap(),
            "CREATE INDEX `idx_orders_user` ON `orders` (`user_id`);"
        );

        let mut fk = ForeignKeyBuilder::new("fk_orders_users", "", "orders", "", "users")
            .with_on_delete(ReferentialAction::Cascade);
        fk.add_column("user_id", "id").unwrap();
        assert_eq!(
            builder().build_create_foreign_key(&fk.build()).unwrap(),
            "ALTER TABLE `orders` ADD CONSTRAINT `fk_orders_users` FOREIGN KEY (`user_id`) REFERENCES `users` (`id`) ON UPDATE NO ACTION ON DELETE CASCADE;"
        );
    }
}
