//! Schema catalog - stores table and column definitions

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Schema catalog - table name -> table definition, in document order
///
/// Loaded once from the schema document and never mutated afterwards.
/// Lookups are exact-text: `Employees` and `employees` are different tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    pub tables: IndexMap<String, TableDef>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a schema document
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a schema document from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let schema = Self::from_json(&contents)?;
        tracing::debug!(
            path = %path.display(),
            tables = schema.tables.len(),
            "loaded schema document"
        );
        Ok(schema)
    }

    /// Add a table to the catalog
    pub fn add_table(&mut self, name: impl Into<String>, table: TableDef) {
        self.tables.insert(name.into(), table);
    }

    /// Look up a table by name
    pub fn get_table(&self, name: &str) -> Option<&TableDef> {
        self.tables.get(name)
    }

    /// Check if a table exists
    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Get all table names (for typo suggestions)
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Every distinct column name across all tables, first occurrence first
    pub fn all_column_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for table in self.tables.values() {
            for column in &table.columns {
                if !names.contains(&column.name.as_str()) {
                    names.push(&column.name);
                }
            }
        }
        names
    }

    /// Column name -> names of the tables that declare it
    pub fn column_index(&self) -> IndexMap<&str, Vec<&str>> {
        let mut index: IndexMap<&str, Vec<&str>> = IndexMap::new();
        for (table_name, table) in &self.tables {
            for column in &table.columns {
                index
                    .entry(column.name.as_str())
                    .or_default()
                    .push(table_name.as_str());
            }
        }
        index
    }
}

/// Table definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableDef {
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    pub fn new(columns: Vec<ColumnDef>) -> Self {
        Self { columns }
    }

    /// Get a column by exact name
    pub fn get_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Check if a column exists
    pub fn column_exists(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    /// Get all column names
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    /// Raw database type name, e.g. `integer` or `character varying`
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

fn default_nullable() -> bool {
    true
}
