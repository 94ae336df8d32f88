pub mod builder;
pub mod cli;
pub mod error;
pub mod parser;
pub mod schema;
pub mod writer;

pub use builder::{builder_for, Dialect, DialectBuilder};
pub use cli::{Cli, Commands};
pub use error::{DdlError, Result};
pub use schema::{Definition, DefinitionBuilder, DefinitionFactory};
