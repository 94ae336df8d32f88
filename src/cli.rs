use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

use crate::builder::Dialect;

#[derive(Parser, Debug)]
#[command(name = "ddl-generator")]
#[command(version, about = "Generate DDL scripts from schema metadata rows")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log verbosity (error, warn, info, debug, trace); logs go to stderr
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: Level,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fold metadata files into a schema and write the DDL script
    Generate {
        #[command(flatten)]
        sources: SourceArgs,

        /// Target dialect
        #[arg(short, long, default_value_t = Dialect::Postgres)]
        dialect: Dialect,

        /// Builder configuration JSON (defaults to the user config file if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip the DROP TABLE section
        #[arg(long)]
        no_drop: bool,
    },

    /// Print the finalized schema model as JSON
    Inspect {
        #[command(flatten)]
        sources: SourceArgs,
    },

    /// List supported dialects
    Dialects,
}

/// JSONL metadata files, one row per line
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Table/column rows
    #[arg(short, long, required = true, num_args = 1..)]
    pub tables: Vec<PathBuf>,

    /// Index rows
    #[arg(short, long, num_args = 1..)]
    pub indexes: Vec<PathBuf>,

    /// Foreign key rows
    #[arg(short, long, num_args = 1..)]
    pub foreign_keys: Vec<PathBuf>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
