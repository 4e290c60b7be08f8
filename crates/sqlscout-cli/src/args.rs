//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "sqlscout")]
#[command(author, version, about = "Validate SQL embedded in source files against a schema")]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check embedded SQL in a file or directory against a schema
    Check {
        /// Source file, or directory scanned recursively
        target: PathBuf,

        /// Schema document (JSON)
        #[arg(short, long, value_name = "FILE")]
        schema: Option<PathBuf>,

        /// Configuration file (defaults to the nearest sqlscout.toml)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// SQL dialect used to tokenize statements
        #[arg(short, long)]
        dialect: Option<String>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Shorthand for --format json
        #[arg(long, conflicts_with = "format")]
        json_output: bool,

        /// Issue codes to drop (e.g. E0003)
        #[arg(long, value_name = "CODE")]
        disable: Vec<String>,
    },

    /// Display schema information
    Schema {
        /// Schema document (JSON)
        file: PathBuf,
    },

    /// Show the token tree and references of one statement (for debugging)
    Parse {
        /// SQL statement
        sql: String,

        /// SQL dialect
        #[arg(short, long, default_value = "postgresql")]
        dialect: String,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One line per issue
    #[default]
    Human,
    /// JSON object with an "errors" array
    Json,
}
