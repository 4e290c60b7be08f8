//! Token tree for a single SQL statement
//!
//! Lexing is done by the sqlparser tokenizer; [`tokenize`] then groups the
//! flat token stream into a shallow tree of keywords, identifiers, identifier
//! lists, function-shaped calls and parenthesised groups. It is not a SQL
//! grammar: unknown constructs simply stay as loose leaves.

mod grouper;
mod keywords;

use serde::Serialize;
use sqlparser::tokenizer::Tokenizer;

use crate::dialect::SqlDialect;
use crate::error::Error;

pub use grouper::group;
pub use keywords::{is_identifier_shaped, is_reserved};

/// A node of the statement token tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TokenNode {
    /// Clause keyword such as `FROM`, `WHERE` or `SET`
    Keyword(String),
    /// Statement keyword such as `SELECT` or `UPDATE`
    DmlKeyword(String),
    /// Definition keyword such as `DROP` or `TRUNCATE`
    DdlKeyword(String),
    Identifier(Identifier),
    /// Comma-separated run of identifiers
    IdentifierList(Vec<Identifier>),
    /// A name directly followed by a parenthesised, comma-separated list
    Function { name: String, args: Vec<TokenNode> },
    /// Parenthesised group or binary comparison
    Generic(Vec<TokenNode>),
    /// Number, quoted string, `TRUE`/`FALSE`/`NULL` or placeholder
    Literal(String),
    /// Operator, comma or `*`
    Punctuation(String),
}

impl TokenNode {
    pub fn identifier(real_name: impl Into<String>) -> Self {
        TokenNode::Identifier(Identifier::new(real_name))
    }

    /// Whether this is a clause keyword matching `word`, case-insensitively
    pub fn is_keyword(&self, word: &str) -> bool {
        matches!(self, TokenNode::Keyword(text) if text.eq_ignore_ascii_case(word))
    }

    /// Keyword text for any of the three keyword tags
    pub fn keyword_text(&self) -> Option<&str> {
        match self {
            TokenNode::Keyword(text) | TokenNode::DmlKeyword(text) | TokenNode::DdlKeyword(text) => {
                Some(text.as_str())
            }
            _ => None,
        }
    }

    /// Nodes that can stand on either side of a comparison
    pub(crate) fn is_operand(&self) -> bool {
        matches!(
            self,
            TokenNode::Identifier(_)
                | TokenNode::Literal(_)
                | TokenNode::Function { .. }
                | TokenNode::Generic(_)
        )
    }
}

/// A (possibly qualified, possibly aliased) name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identifier {
    /// Last segment of a dotted name
    pub real_name: String,
    pub alias: Option<String>,
    /// Everything before the last dot, e.g. `public` in `public.users`
    pub qualifier: Option<String>,
}

impl Identifier {
    pub fn new(real_name: impl Into<String>) -> Self {
        Self {
            real_name: real_name.into(),
            alias: None,
            qualifier: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }
}

/// Lex `sql` and group the first statement into a token tree
pub fn tokenize(sql: &str, dialect: SqlDialect) -> Result<Vec<TokenNode>, Error> {
    let lexer_dialect = dialect.tokenizer_dialect();
    let tokens = Tokenizer::new(lexer_dialect.as_ref(), sql)
        .tokenize()
        .map_err(|e| Error::Tokenize(e.to_string()))?;
    Ok(group(&tokens))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_reports_unterminated_string() {
        let err = tokenize("SELECT 'abc FROM t", SqlDialect::PostgreSQL).unwrap_err();
        assert!(matches!(err, Error::Tokenize(_)));
    }

    #[test]
    fn test_keyword_helpers() {
        let from = TokenNode::Keyword("from".to_string());
        assert!(from.is_keyword("FROM"));
        assert_eq!(from.keyword_text(), Some("from"));
        assert_eq!(TokenNode::identifier("t").keyword_text(), None);
    }
}
