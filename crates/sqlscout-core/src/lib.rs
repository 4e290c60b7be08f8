//! sqlscout-core: embedded SQL validation library
//!
//! Finds SQL statements embedded in source files and checks the tables,
//! columns and literal types they reference against a JSON schema document,
//! offering fuzzy "did you mean" suggestions. No database connection is
//! needed.

pub mod analyzer;
pub mod dialect;
pub mod error;
pub mod fuzzy;
pub mod scanner;
pub mod schema;
pub mod tokens;
pub mod types;

pub use analyzer::{Analyzer, ReferenceSet, StatementKind};
pub use dialect::SqlDialect;
pub use error::{Error, IssueKind, Severity, ValidationIssue};
pub use fuzzy::FuzzyConfig;
pub use scanner::EmbeddedQuery;
pub use schema::{ColumnDef, Schema, TableDef};
pub use tokens::TokenNode;
pub use types::TypeGroup;
