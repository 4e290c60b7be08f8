//! Embedded SQL discovery in Python source files
//!
//! The scanner is a small lexer: it understands comments, string prefixes,
//! triple quotes, escapes and implicit concatenation of adjacent literals,
//! which is all that is needed to find string constants and the line they
//! start on.

use std::path::Path;

use serde::Serialize;

use crate::error::Error;

/// Leading words that mark a string literal as SQL
pub const SQL_KEYWORDS: &[&str] = &["SELECT", "INSERT", "UPDATE", "DELETE", "CREATE", "DROP"];

/// A SQL statement found inside a source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbeddedQuery {
    pub query: String,
    pub file: String,
    /// 1-based line the literal starts on
    pub line: usize,
}

/// Whether a string constant looks like SQL
pub fn looks_like_sql(text: &str) -> bool {
    let upper = text.trim().to_uppercase();
    SQL_KEYWORDS.iter().any(|kw| upper.starts_with(kw))
}

/// Read `path` and scan it
pub fn scan_file(path: impl AsRef<Path>) -> Result<Vec<EmbeddedQuery>, Error> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let queries = scan_source(&text, &path.display().to_string());
    tracing::debug!(file = %path.display(), count = queries.len(), "scanned source file");
    Ok(queries)
}

/// Every SQL-looking string constant in `text`, in source order
pub fn scan_source(text: &str, file: &str) -> Vec<EmbeddedQuery> {
    Lexer::new(text)
        .literals()
        .into_iter()
        .filter(|(value, _)| looks_like_sql(value))
        .map(|(query, line)| EmbeddedQuery {
            query,
            file: file.to_string(),
            line,
        })
        .collect()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    /// Bracket nesting; newlines inside brackets do not end a statement
    depth: usize,
}

/// A literal being assembled from adjacent string tokens
struct Pending {
    value: String,
    line: usize,
}

impl Lexer {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
            depth: 0,
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek(0)?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// All string constants with their starting line. Adjacent literals are
    /// joined into one, as the language does.
    fn literals(mut self) -> Vec<(String, usize)> {
        let mut out = Vec::new();
        let mut pending: Option<Pending> = None;

        while let Some(c) = self.peek(0) {
            match c {
                '#' => self.skip_comment(),
                '\n' => {
                    self.bump();
                    if self.depth == 0 {
                        flush(&mut pending, &mut out);
                    }
                }
                '\\' if self.peek(1) == Some('\n') => {
                    self.bump();
                    self.bump();
                }
                c if c.is_whitespace() => {
                    self.bump();
                }
                '\'' | '"' => self.push_literal(false, &mut pending, &mut out),
                c if c.is_alphanumeric() || c == '_' => {
                    let word = self.word();
                    let is_prefix = matches!(self.peek(0), Some('\'' | '"'))
                        && is_string_prefix(&word);
                    let has = |prefix: char| word.chars().any(|p| p.eq_ignore_ascii_case(&prefix));
                    if is_prefix && has('b') {
                        // Bytes are not text; consume and drop
                        flush(&mut pending, &mut out);
                        self.string(has('r'));
                    } else if is_prefix {
                        self.push_literal(has('r'), &mut pending, &mut out);
                    } else {
                        flush(&mut pending, &mut out);
                    }
                }
                _ => {
                    match c {
                        '(' | '[' | '{' => self.depth += 1,
                        ')' | ']' | '}' => self.depth = self.depth.saturating_sub(1),
                        _ => {}
                    }
                    flush(&mut pending, &mut out);
                    self.bump();
                }
            }
        }
        flush(&mut pending, &mut out);

        out
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.peek(0) {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek(0) {
            if !(c.is_alphanumeric() || c == '_') {
                break;
            }
            word.push(c);
            self.bump();
        }
        word
    }

    fn push_literal(
        &mut self,
        raw: bool,
        pending: &mut Option<Pending>,
        out: &mut Vec<(String, usize)>,
    ) {
        let line = self.line;
        let Some(value) = self.string(raw) else {
            // Unterminated literal; nothing after it on the line is reliable
            flush(pending, out);
            return;
        };
        match pending {
            Some(p) => p.value.push_str(&value),
            None => *pending = Some(Pending { value, line }),
        }
    }

    /// Read one string token starting at its opening quote
    fn string(&mut self, raw: bool) -> Option<String> {
        let quote = self.bump()?;
        let triple = self.peek(0) == Some(quote) && self.peek(1) == Some(quote);
        if triple {
            self.bump();
            self.bump();
        }

        let mut value = String::new();
        loop {
            let c = self.peek(0)?;
            if c == quote {
                if !triple {
                    self.bump();
                    return Some(value);
                }
                if self.peek(1) == Some(quote) && self.peek(2) == Some(quote) {
                    self.pos += 3;
                    return Some(value);
                }
            }
            if c == '\n' && !triple {
                return None;
            }
            self.bump();

            if c != '\\' {
                value.push(c);
                continue;
            }

            let next = self.bump()?;
            if raw {
                value.push('\\');
                value.push(next);
                continue;
            }
            match next {
                'n' => value.push('\n'),
                't' => value.push('\t'),
                '\\' | '\'' | '"' => value.push(next),
                '\n' => {}
                other => {
                    value.push('\\');
                    value.push(other);
                }
            }
        }
    }
}

fn flush(pending: &mut Option<Pending>, out: &mut Vec<(String, usize)>) {
    if let Some(p) = pending.take() {
        out.push((p.value, p.line));
    }
}

/// `r`, `b`, `u`, `f` and the two-letter combinations the language allows
fn is_string_prefix(word: &str) -> bool {
    matches!(
        word.to_ascii_lowercase().as_str(),
        "r" | "b" | "u" | "f" | "rb" | "br" | "fr" | "rf"
    )
}
