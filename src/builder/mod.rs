//! Dialect builders that render the finalized model as DDL text.

pub mod common;
pub mod config;
pub mod encoding;
pub mod mysql;
pub mod postgres;

pub use config::{BuilderConfig, ConfigOverrides};
pub use encoding::Encoding;
pub use mysql::MySqlBuilder;
pub use postgres::PostgresBuilder;

use std::fmt;
use std::str::FromStr;

use crate::error::Result;
use crate::schema::{Definition, ForeignKey, Index, Schema, Table};

/// Renders schema entities as SQL for one database dialect.
///
/// Every operation returns text that already passed the configured encoding.
pub trait DialectBuilder {
    fn name(&self) -> &'static str;

    fn config(&self) -> &BuilderConfig;

    fn build_create_table(&self, schema: &Schema, table: &Table) -> Result<String>;

    /// Single statement, without a trailing line ending
    fn build_drop_table(&self, schema: &Schema, table: &Table) -> Result<String>;

    /// Drop section for every table; empty when there are no schemas
    fn build_all_drop_table(&self, definition: &Definition) -> Result<String>;

    fn build_create_index(&self, index: &Index) -> Result<String>;

    fn build_create_foreign_key(&self, foreign_key: &ForeignKey) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    Postgres,
    MySql,
}

impl Dialect {
    pub const ALL: [Dialect; 2] = [Dialect::Postgres, Dialect::MySql];

    pub const fn name(self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
        }
    }

    pub fn default_config(self) -> BuilderConfig {
        match self {
            Dialect::Postgres => PostgresBuilder::default_config(),
            Dialect::MySql => MySqlBuilder::default_config(),
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" => Ok(Dialect::MySql),
            _ => Err(format!(
                "unknown dialect '{}' (expected one of: {})",
                s,
                Dialect::ALL.map(Dialect::name).join(", ")
            )),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Builder for `dialect` with `overrides` merged over its defaults
pub fn builder_for(dialect: Dialect, overrides: ConfigOverrides) -> Box<dyn DialectBuilder> {
    let config = overrides.apply(dialect.default_config());
    tracing::debug!(%dialect, ?config, "creating dialect builder");

    match dialect {
        Dialect::Postgres => Box::new(PostgresBuilder::new(config)),
        Dialect::MySql => Box::new(MySqlBuilder::new(config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dialect() {
        assert_eq!("postgres".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("PostgreSQL".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("mysql".parse::<Dialect>().unwrap(), Dialect::MySql);

        let err = "oracle".parse::<Dialect>().unwrap_err();
        assert!(err.contains("postgres, mysql"));
    }

    #[test]
    fn test_builder_for_applies_overrides() {
        let overrides = ConfigOverrides {
            indent: Some("\t".into()),
            ..Default::default()
        };

        let builder = builder_for(Dialect::MySql, overrides);
        assert_eq!(builder.name(), "mysql");
        assert_eq!(builder.config().indent, "\t");
        assert_eq!(builder.config().end_of_line, "\n");
        assert!(builder.config().add_empty_string);
    }
}
