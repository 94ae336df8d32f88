use anyhow::{Context, Result};
use ddl_generator::{
    builder::{builder_for, ConfigOverrides, Dialect},
    cli::{Cli, Commands, SourceArgs},
    parser::JsonlSource,
    schema::{Definition, DefinitionFactory, Diagnostic},
    writer::{generate_script, write_script, ScriptOptions},
};
use directories::ProjectDirs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Generate {
            sources,
            dialect,
            config,
            output,
            no_drop,
        } => {
            let start = Instant::now();

            let overrides = load_overrides(config.as_deref())?;
            let builder = builder_for(dialect, overrides);
            let definition = load_definition(&sources)?;

            let options = ScriptOptions {
                drop_tables: !no_drop,
            };
            let script = generate_script(&definition, builder.as_ref(), &options)
                .context("Failed to render DDL")?;

            match output {
                Some(path) => {
                    write_script(&path, &script, builder.config().encoding)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    tracing::info!(
                        elapsed_secs = start.elapsed().as_secs_f64(),
                        "created {:?}",
                        path
                    );
                }
                None => {
                    let bytes = builder.config().encoding.to_bytes(&script)?;
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(&bytes)?;
                    stdout.flush()?;
                }
            }
        }

        Commands::Inspect { sources } => {
            let definition = load_definition(&sources)?;
            println!("{}", serde_json::to_string_pretty(&definition)?);
        }

        Commands::Dialects => {
            for dialect in Dialect::ALL {
                println!("{}", dialect);
            }
        }
    }

    Ok(())
}

/// Fold every source file into a finalized definition
fn load_definition(sources: &SourceArgs) -> Result<Definition> {
    let mut factory = DefinitionFactory::new();
    for path in &sources.tables {
        factory.add_table_source(JsonlSource::new(path));
    }
    for path in &sources.indexes {
        factory.add_index_source(JsonlSource::new(path));
    }
    for path in &sources.foreign_keys {
        factory.add_foreign_key_source(JsonlSource::new(path));
    }

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let definition = factory
        .create(Some(&mut diagnostics))
        .context("Failed to build schema definition")?;

    if !diagnostics.is_empty() {
        tracing::info!(count = diagnostics.len(), "definition has unresolved references");
    }

    Ok(definition)
}

/// Explicit config file, else the user config file when it exists
fn load_overrides(explicit: Option<&Path>) -> Result<ConfigOverrides> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(ConfigOverrides::default()),
        },
    };

    tracing::debug!(path = %path.display(), "loading builder config");
    ConfigOverrides::load(&path).with_context(|| format!("Failed to load config {:?}", path))
}

fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ddl-generator").map(|dirs| dirs.config_dir().join("builder.json"))
}
