use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::Result;

use super::record::{parse_record, Row};

/// Which stream a metadata source feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceRole {
    #[default]
    Table,
    Index,
    ForeignKey,
}

impl fmt::Display for SourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceRole::Table => write!(f, "table"),
            SourceRole::Index => write!(f, "index"),
            SourceRole::ForeignKey => write!(f, "foreign key"),
        }
    }
}

/// Boxed row stream handed out by a metadata source
pub type RowIter<'a> = Box<dyn Iterator<Item = Result<Row>> + 'a>;

/// Anything that can produce metadata rows.
///
/// A single implementation may serve several roles; the factory tags each
/// source with its role before reading.
pub trait MetadataSource {
    fn set_role(&mut self, role: SourceRole);
    fn role(&self) -> SourceRole;
    fn read(&mut self) -> Result<RowIter<'_>>;
}

/// Rows held in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rows: Vec<Row>,
    role: SourceRole,
}

impl MemorySource {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            role: SourceRole::default(),
        }
    }
}

impl MetadataSource for MemorySource {
    fn set_role(&mut self, role: SourceRole) {
        self.role = role;
    }

    fn role(&self) -> SourceRole {
        self.role
    }

    fn read(&mut self) -> Result<RowIter<'_>> {
        Ok(Box::new(self.rows.iter().cloned().map(Ok)))
    }
}

/// JSON Lines file, one row object per line. Blank lines and objects
/// without any values are skipped.
#[derive(Debug, Clone)]
pub struct JsonlSource {
    path: PathBuf,
    role: SourceRole,
}

impl JsonlSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            role: SourceRole::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MetadataSource for JsonlSource {
    fn set_role(&mut self, role: SourceRole) {
        self.role = role;
    }

    fn role(&self) -> SourceRole {
        self.role
    }

    fn read(&mut self) -> Result<RowIter<'_>> {
        tracing::debug!(path = %self.path.display(), role = %self.role, "reading metadata rows");

        let reader = BufReader::new(File::open(&self.path)?);

        let rows = reader
            .lines()
            .enumerate()
            .filter_map(|(idx, line)| match line {
                Ok(line) if line.trim().is_empty() => None,
                Ok(line) => match parse_record(&line, idx + 1) {
                    Ok(row) if row.is_empty() => {
                        tracing::debug!(line = idx + 1, "skipping row without values");
                        None
                    }
                    parsed => Some(parsed),
                },
                Err(e) => Some(Err(e.into())),
            });

        Ok(Box::new(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Field;
    use std::io::Write;

    #[test]
    fn test_memory_source_is_restartable() {
        let mut source = MemorySource::new(vec![Row::new().with(Field::TableName, "t")]);
        source.set_role(SourceRole::Index);
        assert_eq!(source.role(), SourceRole::Index);

        assert_eq!(source.read().unwrap().count(), 1);
        assert_eq!(source.read().unwrap().count(), 1);
    }

    #[test]
    fn test_jsonl_source_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"table_name": "users", "column_name": "id"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"column_name": "name"}}"#).unwrap();

        let mut source = JsonlSource::new(file.path());
        let rows: Vec<Row> = source.read().unwrap().collect::<Result<_>>().unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(Field::TableName), "users");
        assert_eq!(rows[1].get(Field::ColumnName), "name");
    }

    #[test]
    fn test_jsonl_source_skips_rows_without_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{}}").unwrap();
        writeln!(file, r#"{{"table_name": "", "comment_only": "x", "length": null}}"#).unwrap();
        writeln!(file, r#"{{"table_name": "users"}}"#).unwrap();

        let mut source = JsonlSource::new(file.path());
        let rows: Vec<_> = source.read().unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(Field::TableName), "users");
    }

    #[test]
    fn test_jsonl_source_reports_line_numbers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"table_name": "users"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, "not json").unwrap();

        let mut source = JsonlSource::new(file.path());
        let err = source
            .read()
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap_err();

        assert!(err.to_string().contains("line 3"), "{err}");
    }

    #[test]
    fn test_jsonl_source_missing_file() {
        let mut source = JsonlSource::new("/definitely/not/here.jsonl");
        assert!(source.read().is_err());
    }
}
