//! sqlscout CLI - validate SQL embedded in source files

mod args;
mod config;
mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use sqlscout_core::analyzer::{classify, extract_references};
use sqlscout_core::scanner::scan_file;
use sqlscout_core::tokens::tokenize;
use sqlscout_core::{Analyzer, Schema, Severity, SqlDialect, ValidationIssue};

use crate::args::{Args, Command, OutputFormat};
use crate::config::Config;
use crate::output::OutputFormatter;

fn main() -> ExitCode {
    let args = Args::parse();

    // RUST_LOG wins; otherwise -v raises the level step by step
    let default_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .init();

    match run(args) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> Result<bool> {
    let quiet = args.quiet;

    match args.command {
        Command::Check {
            target,
            schema,
            config: config_path,
            dialect,
            format,
            json_output,
            disable,
        } => {
            // Load configuration
            let config = if let Some(path) = config_path {
                Config::from_file(&path)?
            } else {
                Config::find_and_load()?.unwrap_or_default()
            };

            let format = if json_output {
                Some(OutputFormat::Json)
            } else {
                format
            };

            // Merge CLI args with config (CLI takes precedence)
            let config = config.merge_with_args(&schema, format, &dialect, &disable);

            let dialect: SqlDialect = match &config.dialect {
                Some(name) => name.parse().map_err(|e: String| miette::miette!(e))?,
                None => SqlDialect::default(),
            };

            let schema = Schema::from_file(&config.schema)?;
            tracing::info!(
                schema = %config.schema.display(),
                tables = schema.table_names().len(),
                "loaded schema"
            );

            let files = collect_files(&target, &config)?;
            if files.is_empty() {
                miette::bail!(
                    "No source files found in '{}' (extensions: {})",
                    target.display(),
                    config.extensions.join(", ")
                );
            }

            let analyzer = Analyzer::with_config(&schema, config.fuzzy).with_dialect(dialect);

            let (issues, query_count) = check_files(&analyzer, &files, &config.disable);

            OutputFormatter::new(config.format).print_issues(&issues)?;

            let total_errors = issues
                .iter()
                .filter(|i| i.severity == Severity::Error)
                .count();
            let total_warnings = issues.len() - total_errors;

            if !quiet {
                if issues.is_empty() {
                    eprintln!(
                        "No SQL issues found ({} queries in {} file(s))",
                        query_count,
                        files.len()
                    );
                } else {
                    eprintln!(
                        "Found {} error(s), {} warning(s) in {} file(s)",
                        total_errors,
                        total_warnings,
                        files.len()
                    );
                }
            }

            Ok(total_errors > 0)
        }

        Command::Schema { file } => {
            let schema = Schema::from_file(&file)?;

            println!("Schema Information:");
            println!("==================");
            for table_name in schema.table_names() {
                println!("\nTable: {}", table_name);
                let Some(table) = schema.get_table(table_name) else {
                    continue;
                };
                for col in &table.columns {
                    let nullable = if col.nullable { "NULL" } else { "NOT NULL" };
                    println!("    - {} {} {}", col.name, col.data_type, nullable);
                }
            }

            Ok(false)
        }

        Command::Parse { sql, dialect } => {
            let dialect: SqlDialect = dialect.parse().map_err(|e: String| miette::miette!(e))?;
            let tokens = tokenize(&sql, dialect)?;

            println!("Statement kind: {}", classify(&tokens));
            println!("{}", serde_json::to_string_pretty(&tokens).into_diagnostic()?);

            let refs = extract_references(&tokens);
            println!("Tables:  {:?}", refs.tables);
            println!("Columns: {:?}", refs.columns);

            Ok(false)
        }
    }
}

/// The target itself when it is a file, otherwise every file below it with a
/// configured extension that no exclude pattern matches
fn collect_files(target: &Path, config: &Config) -> Result<Vec<PathBuf>> {
    if target.is_file() {
        return Ok(vec![target.to_path_buf()]);
    }
    if !target.is_dir() {
        miette::bail!("Target not found: {}", target.display());
    }

    let mut files = Vec::new();
    for ext in &config.extensions {
        let pattern = format!("{}/**/*.{}", target.display(), ext);
        for path in glob::glob(&pattern).into_diagnostic()?.flatten() {
            if config.is_excluded(&path) {
                tracing::debug!(path = %path.display(), "excluded");
                continue;
            }
            files.push(path);
        }
    }
    files.sort();
    files.dedup();

    Ok(files)
}

/// Scan and validate every file, dropping disabled codes. A file that cannot
/// be read is logged and skipped. Returns the issues and the query count.
fn check_files(
    analyzer: &Analyzer<'_>,
    files: &[PathBuf],
    disable: &[String],
) -> (Vec<ValidationIssue>, usize) {
    let mut issues = Vec::new();
    let mut query_count = 0;

    for file in files {
        let queries = match scan_file(file) {
            Ok(queries) => queries,
            Err(e) => {
                tracing::warn!(file = %file.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };
        query_count += queries.len();
        issues.extend(
            analyzer
                .validate_all(&queries)
                .into_iter()
                .filter(|issue| !disable.iter().any(|code| code == issue.code())),
        );
    }

    (issues, query_count)
}
