//! Groups sqlparser tokens into a [`TokenNode`] tree

use sqlparser::tokenizer::Token;

use super::keywords::{classify_word, WordClass};
use super::{Identifier, TokenNode};

const COMPARISON_OPERATORS: &[&str] = &["=", "<", ">", "<=", ">=", "<>", "!="];

/// Flattened token with whitespace removed and words resolved
#[derive(Debug, Clone, PartialEq)]
enum Lexeme {
    Word { value: String, quoted: bool },
    Literal(String),
    Punct(String),
    Comma,
    Period,
    Open,
    Close,
}

impl Lexeme {
    /// Text of a word usable as a name: quoted words always, bare words
    /// only when they are not keywords
    fn as_name(&self) -> Option<&str> {
        match self {
            Lexeme::Word { value, quoted: true } => Some(value.as_str()),
            Lexeme::Word {
                value,
                quoted: false,
            } if classify_word(value) == WordClass::Name => Some(value.as_str()),
            _ => None,
        }
    }

    fn is_word(&self, word: &str) -> bool {
        matches!(self, Lexeme::Word { value, quoted: false } if value.eq_ignore_ascii_case(word))
    }
}

/// Group the first statement of a token stream into a tree
pub fn group(tokens: &[Token]) -> Vec<TokenNode> {
    group_lexemes(&first_statement(tokens))
}

fn first_statement(tokens: &[Token]) -> Vec<Lexeme> {
    let mut lexemes = Vec::new();
    let mut depth = 0usize;

    for token in tokens {
        let lexeme = match token {
            Token::Whitespace(_) | Token::EOF => continue,
            Token::SemiColon if depth == 0 => {
                if lexemes.is_empty() {
                    continue;
                }
                break;
            }
            Token::Word(word) => Lexeme::Word {
                value: word.value.clone(),
                quoted: word.quote_style.is_some(),
            },
            Token::Number(..)
            | Token::SingleQuotedString(_)
            | Token::DoubleQuotedString(_)
            | Token::NationalStringLiteral(_)
            | Token::EscapedStringLiteral(_)
            | Token::DollarQuotedString(_)
            | Token::Placeholder(_) => Lexeme::Literal(token.to_string()),
            Token::Comma => Lexeme::Comma,
            Token::Period => Lexeme::Period,
            Token::LParen => {
                depth += 1;
                Lexeme::Open
            }
            Token::RParen => {
                depth = depth.saturating_sub(1);
                Lexeme::Close
            }
            other => Lexeme::Punct(other.to_string()),
        };
        lexemes.push(lexeme);
    }

    lexemes
}

fn group_lexemes(lexemes: &[Lexeme]) -> Vec<TokenNode> {
    let mut nodes = Vec::new();
    let mut pos = 0;

    while pos < lexemes.len() {
        match &lexemes[pos] {
            Lexeme::Word { value, quoted } => {
                let class = if *quoted {
                    WordClass::Name
                } else {
                    classify_word(value)
                };
                match class {
                    WordClass::Name => {
                        let (node, next) = parse_name(lexemes, pos, value);
                        nodes.push(node);
                        pos = next;
                        continue;
                    }
                    WordClass::Dml => nodes.push(TokenNode::DmlKeyword(value.clone())),
                    WordClass::Ddl => nodes.push(TokenNode::DdlKeyword(value.clone())),
                    WordClass::Clause => nodes.push(TokenNode::Keyword(value.clone())),
                    WordClass::Literal => nodes.push(TokenNode::Literal(value.clone())),
                }
            }
            Lexeme::Open => {
                let close = matching_close(lexemes, pos);
                nodes.push(TokenNode::Generic(group_lexemes(&lexemes[pos + 1..close])));
                pos = close + 1;
                continue;
            }
            // Unbalanced closing paren
            Lexeme::Close => {}
            Lexeme::Literal(text) => nodes.push(TokenNode::Literal(text.clone())),
            Lexeme::Comma => nodes.push(TokenNode::Punctuation(",".to_string())),
            Lexeme::Period => nodes.push(TokenNode::Punctuation(".".to_string())),
            Lexeme::Punct(text) => nodes.push(TokenNode::Punctuation(text.clone())),
        }
        pos += 1;
    }

    group_identifier_lists(group_comparisons(nodes))
}

/// Parse a dotted name starting at `start` into an identifier, a qualified
/// wildcard or a function-shaped call. Returns the node and the next position.
fn parse_name(lexemes: &[Lexeme], start: usize, first: &str) -> (TokenNode, usize) {
    let mut qualifier: Vec<String> = Vec::new();
    let mut last = first.to_string();
    let mut pos = start + 1;

    while matches!(lexemes.get(pos), Some(Lexeme::Period)) {
        match lexemes.get(pos + 1) {
            Some(Lexeme::Word { value, .. }) => {
                qualifier.push(std::mem::replace(&mut last, value.clone()));
                pos += 2;
            }
            Some(Lexeme::Punct(star)) if star == "*" => {
                qualifier.push(last);
                let wildcard = format!("{}.*", qualifier.join("."));
                return (TokenNode::Punctuation(wildcard), pos + 2);
            }
            _ => break,
        }
    }

    if matches!(lexemes.get(pos), Some(Lexeme::Open)) {
        let close = matching_close(lexemes, pos);
        let args = split_args(&lexemes[pos + 1..close]);
        // `count(*) total`: the alias names the result, it is not a column
        let next = match parse_alias(lexemes, close + 1) {
            Some((_, next)) => next,
            None => close + 1,
        };
        return (TokenNode::Function { name: last, args }, next);
    }

    let mut identifier = Identifier::new(last);
    if !qualifier.is_empty() {
        identifier = identifier.with_qualifier(qualifier.join("."));
    }

    if let Some((alias, next)) = parse_alias(lexemes, pos) {
        identifier = identifier.with_alias(alias);
        pos = next;
    }

    (TokenNode::Identifier(identifier), pos)
}

/// `AS name` or a bare name at `pos`
fn parse_alias(lexemes: &[Lexeme], pos: usize) -> Option<(&str, usize)> {
    if lexemes.get(pos).is_some_and(|l| l.is_word("AS")) {
        let alias = lexemes.get(pos + 1).and_then(Lexeme::as_name)?;
        return Some((alias, pos + 2));
    }
    let alias = lexemes.get(pos).and_then(Lexeme::as_name)?;
    Some((alias, pos + 1))
}

/// Index of the paren closing the one at `open`, or `lexemes.len()` when
/// the group is never closed
fn matching_close(lexemes: &[Lexeme], open: usize) -> usize {
    let mut depth = 0usize;
    for (i, lexeme) in lexemes.iter().enumerate().skip(open) {
        match lexeme {
            Lexeme::Open => depth += 1,
            Lexeme::Close => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
    }
    lexemes.len()
}

/// Split the inside of a call on top-level commas, one node per argument
fn split_args(lexemes: &[Lexeme]) -> Vec<TokenNode> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, lexeme) in lexemes.iter().enumerate() {
        match lexeme {
            Lexeme::Open => depth += 1,
            Lexeme::Close => depth = depth.saturating_sub(1),
            Lexeme::Comma if depth == 0 => {
                push_arg(&mut args, &lexemes[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    push_arg(&mut args, &lexemes[start..]);

    args
}

fn push_arg(args: &mut Vec<TokenNode>, segment: &[Lexeme]) {
    let mut nodes = group_lexemes(segment);
    match nodes.len() {
        0 => {}
        1 => args.extend(nodes.pop()),
        _ => args.push(TokenNode::Generic(nodes)),
    }
}

/// `x op y` -> `Generic([x, op, y])`
fn group_comparisons(nodes: Vec<TokenNode>) -> Vec<TokenNode> {
    let mut out: Vec<TokenNode> = Vec::with_capacity(nodes.len());
    let mut iter = nodes.into_iter().peekable();

    while let Some(node) = iter.next() {
        let is_operator = matches!(&node, TokenNode::Punctuation(op) if COMPARISON_OPERATORS.contains(&op.as_str()));
        if is_operator
            && out.last().is_some_and(TokenNode::is_operand)
            && iter.peek().is_some_and(TokenNode::is_operand)
        {
            if let (Some(left), Some(right)) = (out.pop(), iter.next()) {
                out.push(TokenNode::Generic(vec![left, node, right]));
                continue;
            }
        }
        out.push(node);
    }

    out
}

/// `a, b, c` -> `IdentifierList([a, b, c])`
fn group_identifier_lists(nodes: Vec<TokenNode>) -> Vec<TokenNode> {
    let mut out = Vec::with_capacity(nodes.len());
    let mut pending: Vec<Identifier> = Vec::new();
    let mut trailing_comma = false;

    for node in nodes {
        match node {
            TokenNode::Identifier(identifier) => {
                if !pending.is_empty() && !trailing_comma {
                    flush_identifiers(&mut out, &mut pending, false);
                }
                pending.push(identifier);
                trailing_comma = false;
            }
            TokenNode::Punctuation(ref p) if p == "," && !pending.is_empty() && !trailing_comma => {
                trailing_comma = true;
            }
            other => {
                flush_identifiers(&mut out, &mut pending, trailing_comma);
                trailing_comma = false;
                out.push(other);
            }
        }
    }
    flush_identifiers(&mut out, &mut pending, trailing_comma);

    out
}

fn flush_identifiers(out: &mut Vec<TokenNode>, pending: &mut Vec<Identifier>, comma: bool) {
    match pending.len() {
        0 => {}
        1 => out.extend(pending.pop().map(TokenNode::Identifier)),
        _ => out.push(TokenNode::IdentifierList(std::mem::take(pending))),
    }
    if comma {
        out.push(TokenNode::Punctuation(",".to_string()));
    }
}
