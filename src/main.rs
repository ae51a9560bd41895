//! Simtok CLI - normalize source files into a canonical token stream

use clap::{Parser, Subcommand};
use simtok::config;
use simtok::frontend::{self, Frontend, LateSchemaPolicy, ModelFrontend, SourceFrontend};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "simtok")]
#[command(version = "0.1.0")]
#[command(about = "Normalize source files into canonical token streams for similarity analysis")]
#[command(long_about = r#"
Simtok parses an ordered batch of files into one canonical token stream,
sentinel-delimited per file, for consumption by a similarity engine.

Example usage:
  simtok parse --path ./submissions --language python
  simtok parse --path ./models --language model main.model.json library.schema.json
  simtok parse --path ./src --format json
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a batch of files into a token stream
    Parse {
        /// Directory containing the files
        #[arg(short, long)]
        path: PathBuf,

        /// Files to parse, relative to the directory, in order.
        /// When omitted, matching files are enumerated in sorted order.
        files: Vec<String>,

        /// Language frontend to use (python, javascript, model).
        /// Defaults to the config file, then to the first matching frontend.
        #[arg(short, long)]
        language: Option<String>,

        /// What to do with model instances parsed before their schema
        /// (leave-unresolved, reprocess)
        #[arg(long)]
        schema_policy: Option<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Path to the config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the available language frontends
    Languages,

    /// Write a default config file
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Parse {
            path,
            files,
            language,
            schema_policy,
            format,
            config,
        } => {
            let loaded = config::load_config(config.as_deref())?.unwrap_or_default();
            let language = language.or(loaded.language.clone());
            let policy = match schema_policy {
                Some(ref s) => config::SimtokConfig {
                    schema_policy: Some(s.clone()),
                    ..Default::default()
                }
                .schema_policy()?,
                None => loaded.schema_policy()?,
            };

            let mut frontend = select_frontend(language.as_deref(), policy, &files)?;

            let files = if files.is_empty() {
                enumerate_files(&path, frontend.as_ref())
            } else {
                files
            };
            if files.is_empty() {
                anyhow::bail!(
                    "no files for the {} frontend under {}",
                    frontend.language_name(),
                    path.display()
                );
            }

            tracing::info!(
                "parsing {} files under {} with the {} frontend",
                files.len(),
                path.display(),
                frontend.language_name()
            );
            let batch = frontend::parse(frontend.as_mut(), &path, &files)?;

            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&batch)?),
                _ => {
                    println!("Files:    {}", batch.file_count());
                    println!("Tokens:   {}", batch.tokens.len());
                    println!("Errors:   {}", batch.errors);
                    println!("Warnings: {}", batch.warnings().count());
                    for diagnostic in &batch.diagnostics {
                        println!(
                            "  [{}] {}: {}",
                            match diagnostic.severity {
                                simtok::Severity::Error => "error",
                                simtok::Severity::Warning => "warn",
                            },
                            diagnostic.file,
                            diagnostic.message
                        );
                    }
                }
            }
        }
        Commands::Languages => {
            let registry = frontend::default_registry();
            for frontend in registry.frontends() {
                println!(
                    "{:<12} {}",
                    frontend.language_name(),
                    frontend.file_extensions().join(", ")
                );
            }
        }
        Commands::Init { force } => {
            let path = config::default_config_path();
            config::write_config(&path, &config::SimtokConfig::default(), force)?;
            println!("wrote {}", path.display());
        }
    }

    Ok(())
}

/// Pick the frontend: explicit language name first, otherwise the first
/// built-in frontend that handles any of the requested files.
fn select_frontend(
    language: Option<&str>,
    policy: LateSchemaPolicy,
    files: &[String],
) -> anyhow::Result<Box<dyn Frontend>> {
    let frontend: Box<dyn Frontend> = match language {
        Some(name) if name.eq_ignore_ascii_case("python") => Box::new(SourceFrontend::python()),
        Some(name) if name.eq_ignore_ascii_case("javascript") => {
            Box::new(SourceFrontend::javascript())
        }
        Some(name) if name.eq_ignore_ascii_case("model") => {
            Box::new(ModelFrontend::with_policy(policy))
        }
        Some(name) => anyhow::bail!("unknown language '{}'", name),
        None => {
            let candidates: [Box<dyn Frontend>; 3] = [
                Box::new(SourceFrontend::python()),
                Box::new(SourceFrontend::javascript()),
                Box::new(ModelFrontend::with_policy(policy)),
            ];
            let mut chosen = None;
            for candidate in candidates {
                if files
                    .iter()
                    .any(|f| candidate.can_handle(Path::new(f)))
                {
                    chosen = Some(candidate);
                    break;
                }
            }
            chosen.ok_or_else(|| {
                anyhow::anyhow!("could not infer a language; pass --language or a file list")
            })?
        }
    };
    Ok(frontend)
}

/// Enumerate matching files under the root in sorted order, honoring
/// gitignore rules.
fn enumerate_files(root: &Path, frontend: &dyn Frontend) -> Vec<String> {
    let mut files = Vec::new();
    for entry in ignore::WalkBuilder::new(root).build().filter_map(|e| e.ok()) {
        if entry.file_type().is_some_and(|t| t.is_file()) && frontend.can_handle(entry.path()) {
            if let Ok(relative) = entry.path().strip_prefix(root) {
                files.push(relative.to_string_lossy().to_string());
            }
        }
    }
    files.sort();
    files
}
