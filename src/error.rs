//! Error types for schema folding and DDL rendering.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum DdlError {
    /// Table constructed with an empty name
    #[error("Table name is not allowed to be empty")]
    InvalidIdentity,

    /// Column name already present on the table
    #[error("Column '{column}' already exists in {table}")]
    DuplicateColumn { table: String, column: String },

    /// Table name already present in the schema
    #[error("Table '{table}' already exists in schema '{schema}'")]
    DuplicateTable { schema: String, table: String },

    /// Primary key entry names a column the table does not have
    #[error("Column '{column}' is not found in {table}")]
    MissingColumn { table: String, column: String },

    /// Structural mutation attempted after lock
    #[error("{entity} is already immutable")]
    Immutable { entity: String },

    /// Auto-increment requested on a type the dialect cannot count with
    #[error("Data type `{data_type}` of column '{column}' does not support auto increment")]
    UnsupportedAutoIncrement { column: String, data_type: String },

    /// Rendered text contains a character the output encoding cannot hold
    #[error("Character {character:?} cannot be represented in {encoding}")]
    Encoding {
        encoding: &'static str,
        character: char,
    },

    /// Encoding name not recognized
    #[error("Unknown output encoding: {0}")]
    UnknownEncoding(String),

    /// ON UPDATE / ON DELETE text that is not a referential action
    #[error("Invalid referential action: {0}")]
    InvalidAction(String),

    /// Metadata row could not be parsed
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DdlError {
    /// Create an Immutable error for the named entity
    pub fn immutable(entity: impl Into<String>) -> Self {
        DdlError::Immutable {
            entity: entity.into(),
        }
    }

    /// Create a Parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        DdlError::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, DdlError>;
