//! Text assembly shared by the dialect builders.

use crate::error::Result;
use crate::schema::{Definition, ForeignKey, Index, Schema, Table};

/// Wrap `text` in `delimiter`, doubling every embedded delimiter
pub fn quote_with(text: &str, delimiter: char) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push(delimiter);
    for c in text.chars() {
        if c == delimiter {
            quoted.push(delimiter);
        }
        quoted.push(c);
    }
    quoted.push(delimiter);
    quoted
}

/// `schema.table` with each part quoted, or just the table for the default schema
pub fn qualified_name(schema: &str, table: &str, quote: impl Fn(&str) -> String) -> String {
    if schema.is_empty() {
        quote(table)
    } else {
        format!("{}.{}", quote(schema), quote(table))
    }
}

/// Quote each name and join with `, `
pub fn quote_list<'a, I>(names: I, quote: impl Fn(&str) -> String) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    names.into_iter().map(quote).collect::<Vec<_>>().join(", ")
}

/// Case-insensitive substring match against a keyword list
pub fn type_matches(data_type: &str, keywords: &[&str]) -> bool {
    let upper = data_type.to_ascii_uppercase();
    keywords.iter().any(|keyword| upper.contains(keyword))
}

/// Keywords that mark a data type as numeric. `INT` covers every integer
/// width, `DEC` covers DECIMAL, `BIT`/`BOOL` the boolean-like types.
pub const NUMERIC_TYPE_KEYWORDS: &[&str] = &[
    "INT", "DEC", "FIXED", "NUMERIC", "BIT", "BOOL", "FLOAT", "DOUBLE", "REAL",
];

/// Character types that may receive an empty-string default
pub fn is_character_type(data_type: &str) -> bool {
    type_matches(data_type, &["CHAR"])
}

/// Drop statements for every table, under a section header.
/// Empty when the definition has no schemas.
pub fn drop_section<F>(definition: &Definition, end_of_line: &str, build_drop: F) -> Result<String>
where
    F: Fn(&Schema, &Table) -> Result<String>,
{
    if definition.count_schemas() == 0 {
        return Ok(String::new());
    }

    let mut sql = format!("/** DROP TABLE **/{}", end_of_line);
    for (schema, table) in definition.tables() {
        sql.push_str(&build_drop(schema, table)?);
        sql.push_str(end_of_line);
    }
    sql.push_str(end_of_line);

    Ok(sql)
}

/// `CREATE [UNIQUE ]INDEX`; the schema only qualifies the table
pub fn create_index_sql(index: &Index, quote: impl Fn(&str) -> String) -> String {
    format!(
        "CREATE {}INDEX {} ON {} ({});",
        if index.is_unique() { "UNIQUE " } else { "" },
        quote(index.key_name()),
        qualified_name(index.schema_name(), index.table_name(), &quote),
        quote_list(index.columns().iter().map(String::as_str), &quote)
    )
}

/// `ALTER TABLE ... ADD CONSTRAINT ... FOREIGN KEY`
pub fn create_foreign_key_sql(foreign_key: &ForeignKey, quote: impl Fn(&str) -> String) -> String {
    format!(
        "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}) ON UPDATE {} ON DELETE {};",
        qualified_name(foreign_key.schema_name(), foreign_key.table_name(), &quote),
        quote(foreign_key.key_name()),
        quote_list(foreign_key.column_names(), &quote),
        qualified_name(
            foreign_key.lookup_schema_name(),
            foreign_key.lookup_table_name(),
            &quote
        ),
        quote_list(foreign_key.lookup_column_names(), &quote),
        foreign_key.on_update(),
        foreign_key.on_delete()
    )
}
