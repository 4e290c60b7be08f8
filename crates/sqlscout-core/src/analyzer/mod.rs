//! SQL analyzer module

mod classify;
mod extract;
mod type_check;

use std::collections::BTreeSet;

use crate::dialect::SqlDialect;
use crate::error::{IssueKind, ValidationIssue};
use crate::fuzzy::{suggest, FuzzyConfig};
use crate::scanner::EmbeddedQuery;
use crate::schema::Schema;
use crate::tokens::tokenize;

pub use classify::{classify, StatementKind};
pub use extract::{extract_references, names_in, ReferenceSet};
pub use type_check::TypeChecker;

/// Short column names without an underscore are often a root shared by
/// several columns; up to this length every candidate is offered.
const SHORT_ROOT_LEN: usize = 8;

/// SQL Analyzer - validates embedded SQL against a schema document
///
/// Holds only borrowed, immutable inputs, so one analyzer can be shared by
/// any number of callers.
pub struct Analyzer<'a> {
    schema: &'a Schema,
    config: FuzzyConfig,
    dialect: SqlDialect,
}

impl<'a> Analyzer<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self::with_config(schema, FuzzyConfig::default())
    }

    pub fn with_config(schema: &'a Schema, config: FuzzyConfig) -> Self {
        Self {
            schema,
            config,
            dialect: SqlDialect::default(),
        }
    }

    pub fn with_dialect(mut self, dialect: SqlDialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Tables and columns a query references. Anything that fails to
    /// tokenize references nothing.
    pub fn references(&self, sql: &str) -> ReferenceSet {
        match tokenize(sql, self.dialect) {
            Ok(tokens) => extract_references(&tokens),
            Err(e) => {
                tracing::debug!(error = %e, "skipping statement that failed to tokenize");
                ReferenceSet::default()
            }
        }
    }

    /// Validate one query and attach `file`/`line` to every issue
    pub fn validate(
        &self,
        sql: &str,
        file: Option<&str>,
        line: Option<usize>,
    ) -> Vec<ValidationIssue> {
        let refs = self.references(sql);

        let mut issues = self.check_tables(&refs.tables);

        let valid_tables: Vec<&str> = refs
            .tables
            .iter()
            .map(String::as_str)
            .filter(|t| self.schema.table_exists(t))
            .collect();

        // With no known table every column would be reported; skip instead
        if !valid_tables.is_empty() {
            issues.extend(self.check_columns(&valid_tables, &refs.columns));
            issues.extend(TypeChecker::new(self.schema, &valid_tables).check(sql));
        }

        issues
            .into_iter()
            .map(|issue| issue.at(file, line))
            .collect()
    }

    /// Validate a batch of scanned queries in order
    pub fn validate_all(&self, queries: &[EmbeddedQuery]) -> Vec<ValidationIssue> {
        queries
            .iter()
            .flat_map(|q| self.validate(&q.query, Some(q.file.as_str()), Some(q.line)))
            .collect()
    }

    /// One error per referenced table missing from the schema
    pub fn check_tables(&self, tables: &BTreeSet<String>) -> Vec<ValidationIssue> {
        let known = self.schema.table_names();

        tables
            .iter()
            .filter(|t| !self.schema.table_exists(t))
            .map(|table| {
                let suggestion = suggest(table, &known, &self.config).into_iter().next();
                ValidationIssue::error(
                    IssueKind::TableNotFound,
                    table.clone(),
                    format!("Table '{}' not found", table),
                )
                .with_suggestion(suggestion)
            })
            .collect()
    }

    /// One error per referenced column that none of `valid_tables` declares
    pub fn check_columns(
        &self,
        valid_tables: &[&str],
        columns: &BTreeSet<String>,
    ) -> Vec<ValidationIssue> {
        let index = self.schema.column_index();

        let mut expected: Vec<&str> = Vec::new();
        for table in valid_tables {
            if let Some(def) = self.schema.get_table(table) {
                for name in def.column_names() {
                    if !expected.contains(&name) {
                        expected.push(name);
                    }
                }
            }
        }

        let mut issues = Vec::new();
        for column in columns {
            if expected.contains(&column.as_str()) {
                continue;
            }

            let mut candidates = suggest(column, &expected, &self.config);
            if candidates.is_empty() {
                candidates = suggest(column, &self.schema.all_column_names(), &self.config);
            }

            let mut message = format!("Column '{}' not found", column);
            if let Some(owners) = index.get(column.as_str()) {
                if let [owner] = owners.as_slice() {
                    if !valid_tables.contains(owner) {
                        message.push_str(&format!(" (exists in table '{}')", owner));
                    }
                }
            }

            issues.push(
                ValidationIssue::error(IssueKind::ColumnNotFound, column.clone(), message)
                    .with_suggestion(format_suggestion(column, candidates)),
            );
        }

        issues
    }
}

/// Names with an underscore or longer than a short root get the single best
/// candidate; short roots get every candidate as one comma-separated hint.
fn format_suggestion(column: &str, candidates: Vec<String>) -> Option<String> {
    if candidates.is_empty() {
        return None;
    }
    if !column.contains('_') && column.chars().count() <= SHORT_ROOT_LEN {
        return Some(candidates.join(", "));
    }
    candidates.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnDef, TableDef};

    fn setup_schema() -> Schema {
        let mut schema = Schema::new();
        schema.add_table(
            "users",
            TableDef::new(vec![
                ColumnDef::new("id", "integer").not_null(),
                ColumnDef::new("name", "character varying").not_null(),
                ColumnDef::new("email", "text"),
            ]),
        );
        schema.add_table(
            "orders",
            TableDef::new(vec![
                ColumnDef::new("id", "integer").not_null(),
                ColumnDef::new("user_id", "integer").not_null(),
                ColumnDef::new("total", "numeric"),
            ]),
        );
        schema
    }

    #[test]
    fn test_valid_select() {
        let schema = setup_schema();
        let analyzer = Analyzer::new(&schema);

        let issues = analyzer.validate("SELECT id, name FROM users", None, None);
        assert!(issues.is_empty(), "Expected no issues: {:?}", issues);
    }

    #[test]
    fn test_table_not_found() {
        let schema = setup_schema();
        let analyzer = Analyzer::new(&schema);

        let issues = analyzer.validate("SELECT * FROM nonexistent", None, None);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::TableNotFound);
        assert_eq!(issues[0].message, "Table 'nonexistent' not found");
    }

    #[test]
    fn test_column_not_found() {
        let schema = setup_schema();
        let analyzer = Analyzer::new(&schema);

        let issues = analyzer.validate("SELECT nonexistent_column FROM users", None, None);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::ColumnNotFound);
    }

    #[test]
    fn test_file_and_line_attached() {
        let schema = setup_schema();
        let analyzer = Analyzer::new(&schema);

        let issues = analyzer.validate("SELECT nme FROM users", Some("app.py"), Some(12));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].file.as_deref(), Some("app.py"));
        assert_eq!(issues[0].line, Some(12));
    }

    #[test]
    fn test_tokenize_failure_is_silent() {
        let schema = setup_schema();
        let analyzer = Analyzer::new(&schema);

        assert!(analyzer
            .validate("SELECT 'unterminated FROM nowhere", None, None)
            .is_empty());
    }

    #[test]
    fn test_exists_in_other_table_hint() {
        let schema = setup_schema();
        let analyzer = Analyzer::new(&schema);

        let issues = analyzer.validate("SELECT total FROM users", None, None);
        assert_eq!(issues.len(), 1);
        assert!(issues[0]
            .message
            .ends_with("(exists in table 'orders')"));
    }

    #[test]
    fn test_no_hint_when_owner_is_referenced() {
        let schema = setup_schema();
        let analyzer = Analyzer::new(&schema);

        let issues = analyzer.check_columns(&["orders"], &BTreeSet::from(["email".to_string()]));
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("(exists in table 'users')"));

        let issues = analyzer.check_columns(
            &["orders", "users"],
            &BTreeSet::from(["user_id".to_string(), "email".to_string()]),
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_format_suggestion_policy() {
        let many = || vec!["a_1".to_string(), "a_2".to_string()];
        assert_eq!(format_suggestion("x_y", many()), Some("a_1".to_string()));
        assert_eq!(format_suggestion("short", many()), Some("a_1, a_2".to_string()));
        assert_eq!(
            format_suggestion("muchlongername", many()),
            Some("a_1".to_string())
        );
        assert_eq!(format_suggestion("short", Vec::new()), None);
    }

    #[test]
    fn test_custom_config_limits_suggestions() {
        let schema = setup_schema();
        let strict = FuzzyConfig::new(0.99, 3).unwrap();
        let analyzer = Analyzer::with_config(&schema, strict);

        let issues = analyzer.validate("SELECT nme FROM users", None, None);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].suggestion, None);
    }
}
