use std::path::Path;

use crate::builder::{DialectBuilder, Encoding};
use crate::error::Result;
use crate::schema::Definition;

#[derive(Debug, Clone)]
pub struct ScriptOptions {
    /// Start the script with a drop statement for every table
    pub drop_tables: bool,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self { drop_tables: true }
    }
}

/// Assemble the full DDL script for `definition`
pub fn generate_script(
    definition: &Definition,
    builder: &dyn DialectBuilder,
    options: &ScriptOptions,
) -> Result<String> {
    let eol = builder.config().end_of_line.as_str();
    let mut script = String::new();

    if options.drop_tables {
        script.push_str(&builder.build_all_drop_table(definition)?);
    }

    script.push_str(&format!("/** CREATE TABLE **/{}", eol));
    let mut table_count = 0;
    for (schema, table) in definition.tables() {
        script.push_str(&builder.build_create_table(schema, table)?);
        script.push_str(eol);
        table_count += 1;
    }

    if !definition.indexes().is_empty() {
        script.push_str(&format!("/** CREATE INDEX **/{}", eol));
        for index in definition.indexes() {
            script.push_str(&builder.build_create_index(index)?);
            script.push_str(eol);
        }
        script.push_str(eol);
    }

    if !definition.foreign_keys().is_empty() {
        script.push_str(&format!("/** ADD FOREIGN KEY **/{}", eol));
        for foreign_key in definition.foreign_keys() {
            script.push_str(&builder.build_create_foreign_key(foreign_key)?);
            script.push_str(eol);
        }
        script.push_str(eol);
    }

    tracing::info!(
        dialect = builder.name(),
        tables = table_count,
        indexes = definition.indexes().len(),
        foreign_keys = definition.foreign_keys().len(),
        "generated DDL script"
    );

    Ok(script)
}

/// Write `script` to `path` in `encoding`, replacing any existing file
pub fn write_script<P: AsRef<Path>>(path: P, script: &str, encoding: Encoding) -> Result<()> {
    let path = path.as_ref();
    let bytes = encoding.to_bytes(script)?;
    std::fs::write(path, &bytes)?;

    tracing::info!(path = %path.display(), bytes = bytes.len(), %encoding, "wrote DDL script");
    Ok(())
}
