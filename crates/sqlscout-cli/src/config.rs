//! Configuration file handling

use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use sqlscout_core::FuzzyConfig;
use std::path::{Path, PathBuf};

use crate::args::OutputFormat;

pub const CONFIG_FILE_NAME: &str = "sqlscout.toml";

/// Configuration for sqlscout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schema document path
    pub schema: PathBuf,

    /// File extensions scanned when the target is a directory
    pub extensions: Vec<String>,

    /// Glob patterns of paths to skip
    pub exclude: Vec<String>,

    /// Output format (human, json)
    pub format: OutputFormat,

    /// SQL dialect ("postgresql" or "mysql")
    pub dialect: Option<String>,

    /// Issue codes to drop (e.g., ["E0003"])
    pub disable: Vec<String>,

    /// Suggestion tuning
    pub fuzzy: FuzzyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema: PathBuf::from("schema.json"),
            extensions: vec!["py".to_string()],
            exclude: Vec::new(),
            format: OutputFormat::default(),
            dialect: None,
            disable: Vec::new(),
            fuzzy: FuzzyConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).into_diagnostic()?;
        let config = Self::from_toml(&contents)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).into_diagnostic()?;
        config.fuzzy.validate()?;
        Ok(config)
    }

    /// Try to find and load sqlscout.toml in current directory or parent directories
    pub fn find_and_load() -> Result<Option<Self>> {
        let current_dir = std::env::current_dir().into_diagnostic()?;
        match Self::find_from(&current_dir) {
            Some(path) => Ok(Some(Self::from_file(&path)?)),
            None => Ok(None),
        }
    }

    fn find_from(start: &Path) -> Option<PathBuf> {
        let mut current_dir = start.to_path_buf();

        loop {
            let config_path = current_dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Some(config_path);
            }

            // Try parent directory
            if !current_dir.pop() {
                return None;
            }
        }
    }

    /// Merge CLI arguments into configuration
    /// CLI arguments take precedence over config file values
    pub fn merge_with_args(
        mut self,
        schema: &Option<PathBuf>,
        format: Option<OutputFormat>,
        dialect: &Option<String>,
        disable: &[String],
    ) -> Self {
        if let Some(schema) = schema {
            self.schema = schema.clone();
        }

        if let Some(format) = format {
            self.format = format;
        }

        if dialect.is_some() {
            self.dialect = dialect.clone();
        }

        if !disable.is_empty() {
            self.disable = disable.to_vec();
        }

        self
    }

    /// Whether `path` matches one of the exclude patterns
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.exclude.iter().any(|pattern| {
            glob::Pattern::new(pattern)
                .map(|p| p.matches_path(path))
                .unwrap_or(false)
        })
    }
}
