//! Reference extraction - which tables and columns a statement touches

use std::collections::BTreeSet;

use serde::Serialize;

use super::classify::{classify, StatementKind};
use crate::tokens::{is_identifier_shaped, is_reserved, TokenNode};

/// Tables and columns referenced by one statement
///
/// Names are kept exactly as written; there is no case folding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceSet {
    pub tables: BTreeSet<String>,
    pub columns: BTreeSet<String>,
}

impl ReferenceSet {
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.columns.is_empty()
    }
}

/// Extract the references of a statement, dispatching on its kind
pub fn extract_references(tokens: &[TokenNode]) -> ReferenceSet {
    let kind = classify(tokens);
    let refs = match kind {
        StatementKind::Select => extract_select(tokens),
        StatementKind::Update => extract_update(tokens),
        StatementKind::Insert => extract_insert(tokens),
        StatementKind::Delete => extract_delete(tokens),
        StatementKind::Drop | StatementKind::Truncate => extract_first_table(tokens),
        StatementKind::Unknown => ReferenceSet::default(),
    };
    tracing::trace!(%kind, tables = ?refs.tables, columns = ?refs.columns, "extracted references");
    refs
}

/// Names an arbitrary node contributes
///
/// Identifiers yield their real name, lists every member, generic groups
/// recurse. A clause keyword that is really a bare name is accepted too.
pub fn names_in(node: &TokenNode) -> Vec<String> {
    match node {
        TokenNode::Identifier(identifier) => vec![identifier.real_name.clone()],
        TokenNode::IdentifierList(items) => items.iter().map(|i| i.real_name.clone()).collect(),
        TokenNode::Generic(children) => children.iter().flat_map(names_in).collect(),
        TokenNode::Keyword(text) if is_identifier_shaped(text) && !is_reserved(text) => {
            vec![text.clone()]
        }
        _ => Vec::new(),
    }
}

/// Everything after the first FROM/JOIN is a table, everything before a
/// column. The flag is never cleared, so names in a trailing WHERE are
/// reported as tables too.
fn extract_select(tokens: &[TokenNode]) -> ReferenceSet {
    let mut refs = ReferenceSet::default();
    let mut after_from = false;

    for token in tokens {
        if token.is_keyword("FROM") || token.is_keyword("JOIN") {
            after_from = true;
            continue;
        }
        let target = if after_from {
            &mut refs.tables
        } else {
            &mut refs.columns
        };
        target.extend(names_in(token));
    }

    refs
}

fn extract_update(tokens: &[TokenNode]) -> ReferenceSet {
    let mut refs = ReferenceSet::default();
    let mut table_seen = false;
    let mut in_set = false;

    for token in tokens {
        if token.is_keyword("WHERE") {
            break;
        }
        if token.is_keyword("SET") {
            in_set = true;
            continue;
        }
        if in_set {
            refs.columns.extend(names_in(token));
        } else if let TokenNode::Identifier(identifier) = token {
            if !table_seen {
                refs.tables.insert(identifier.real_name.clone());
                table_seen = true;
            }
        }
    }

    refs
}

fn extract_insert(tokens: &[TokenNode]) -> ReferenceSet {
    let mut refs = ReferenceSet::default();

    let target = tokens.iter().find_map(|token| match token {
        TokenNode::Function { name, args } => Some((name, args)),
        _ => None,
    });
    if let Some((name, args)) = target {
        refs.tables.insert(name.clone());
        for arg in args {
            if let TokenNode::Identifier(identifier) = arg {
                refs.columns.insert(identifier.real_name.clone());
            }
        }
    }

    refs
}

fn extract_delete(tokens: &[TokenNode]) -> ReferenceSet {
    let mut refs = ReferenceSet::default();
    let mut after_from = false;

    for token in tokens {
        match token {
            t if t.is_keyword("FROM") => after_from = true,
            TokenNode::Identifier(identifier) if after_from => {
                refs.tables.insert(identifier.real_name.clone());
                break;
            }
            _ => {}
        }
    }

    refs
}

/// DROP / TRUNCATE: the first identifier is the table
fn extract_first_table(tokens: &[TokenNode]) -> ReferenceSet {
    let mut refs = ReferenceSet::default();
    let first = tokens.iter().find_map(|token| match token {
        TokenNode::Identifier(identifier) => Some(identifier.real_name.clone()),
        _ => None,
    });
    refs.tables.extend(first);
    refs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::SqlDialect;
    use crate::tokens::{tokenize, Identifier};

    fn refs(sql: &str) -> ReferenceSet {
        extract_references(&tokenize(sql, SqlDialect::PostgreSQL).unwrap())
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    // ========== SELECT Tests ==========

    #[test]
    fn test_select_columns_and_table() {
        let r = refs("SELECT employee_id, employee_name FROM employees");
        assert_eq!(r.columns, set(&["employee_id", "employee_name"]));
        assert_eq!(r.tables, set(&["employees"]));
    }

    #[test]
    fn test_select_uses_real_names() {
        let r = refs("SELECT e.employee_name FROM employees e");
        assert_eq!(r.columns, set(&["employee_name"]));
        assert_eq!(r.tables, set(&["employees"]));
    }

    #[test]
    fn test_select_join_tables() {
        let r = refs("SELECT a FROM t1 JOIN t2");
        assert_eq!(r.columns, set(&["a"]));
        assert_eq!(r.tables, set(&["t1", "t2"]));
    }

    #[test]
    fn test_select_where_names_count_as_tables() {
        // FROM context is never reset by later clauses
        let r = refs("SELECT a FROM t WHERE b = 1");
        assert_eq!(r.columns, set(&["a"]));
        assert_eq!(r.tables, set(&["t", "b"]));
    }

    #[test]
    fn test_select_duplicates_collapse() {
        let r = refs("SELECT a, a, b FROM t");
        assert_eq!(r.columns.len(), 2);
    }

    #[test]
    fn test_select_bare_keyword_is_a_name() {
        let tokens = vec![
            TokenNode::DmlKeyword("SELECT".to_string()),
            TokenNode::Keyword("location".to_string()),
            TokenNode::Keyword("FROM".to_string()),
            TokenNode::identifier("departments"),
        ];
        let r = extract_references(&tokens);
        assert_eq!(r.columns, set(&["location"]));
        assert_eq!(r.tables, set(&["departments"]));
    }

    #[test]
    fn test_select_without_from() {
        let r = refs("SELECT employee_name employees");
        assert_eq!(r.columns, set(&["employee_name"]));
        assert!(r.tables.is_empty());
    }

    // ========== UPDATE Tests ==========

    #[test]
    fn test_update_set_columns() {
        let r = refs("UPDATE employees SET employee_name = 'x', department_id = 2");
        assert_eq!(r.tables, set(&["employees"]));
        assert_eq!(r.columns, set(&["employee_name", "department_id"]));
    }

    #[test]
    fn test_update_stops_at_where() {
        let r = refs("UPDATE employees SET employee_name = 'x' WHERE employee_id = 1");
        assert_eq!(r.columns, set(&["employee_name"]));
    }

    #[test]
    fn test_update_without_set() {
        let r = refs("UPDATE employees employee_name = 'John'");
        assert!(r.columns.is_empty());
    }

    // ========== INSERT Tests ==========

    #[test]
    fn test_insert_columns() {
        let r = refs("INSERT INTO employees (employee_id, emp_naame) VALUES (1, 'John')");
        assert_eq!(r.tables, set(&["employees"]));
        assert_eq!(r.columns, set(&["employee_id", "emp_naame"]));
    }

    #[test]
    fn test_insert_without_into() {
        let r = refs("INSERT employees (employee_id) VALUES (1)");
        assert_eq!(r.tables, set(&["employees"]));
        assert_eq!(r.columns, set(&["employee_id"]));
    }

    #[test]
    fn test_insert_without_column_list() {
        assert!(refs("INSERT INTO employees VALUES (1, 'x')").is_empty());
    }

    #[test]
    fn test_insert_skips_non_identifier_args() {
        let tokens = vec![
            TokenNode::DmlKeyword("INSERT".to_string()),
            TokenNode::Function {
                name: "t".to_string(),
                args: vec![
                    TokenNode::Identifier(Identifier::new("a")),
                    TokenNode::Literal("1".to_string()),
                ],
            },
        ];
        let r = extract_references(&tokens);
        assert_eq!(r.columns, set(&["a"]));
    }

    // ========== DELETE / DROP / TRUNCATE Tests ==========

    #[test]
    fn test_delete_table_only() {
        let r = refs("DELETE FROM departmnts WHERE department_id = 1");
        assert_eq!(r.tables, set(&["departmnts"]));
        assert!(r.columns.is_empty());
    }

    #[test]
    fn test_drop_and_truncate() {
        assert_eq!(refs("DROP TABLE employes").tables, set(&["employes"]));
        assert_eq!(
            refs("DROP TABLE IF EXISTS employes").tables,
            set(&["employes"])
        );
        assert_eq!(refs("TRUNCATE TABLE departmnts").tables, set(&["departmnts"]));
        assert!(refs("TRUNCATE TABLE departmnts").columns.is_empty());
    }

    #[test]
    fn test_unknown_statement_is_empty() {
        assert!(refs("CREATE TABLE t (a int)").is_empty());
        assert!(refs("").is_empty());
    }
}
