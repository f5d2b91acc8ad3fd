//! Minimal SCSS syntax scanner.
//!
//! Produces just enough of a syntax tree for DocBlock attachment:
//! block comments, declarations (`$var: value;`, `prop: value;`), rules
//! (`selector { ... }`) and at-rules (`@mixin name($a) { ... }`, `@include x;`).
//! Values are kept as raw text; nothing is evaluated.

use std::path::Path;

use styleguide_shared::{Result, SourcePosition, StyleguideError};

/// A node of the scanned syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// `/* ... */` comment. `text` is the trimmed content between the delimiters.
    Comment {
        text: String,
        position: SourcePosition,
    },
    /// `prop: value;`
    Declaration {
        prop: String,
        value: String,
        position: SourcePosition,
    },
    /// `selector { children }`
    Rule {
        selector: String,
        position: SourcePosition,
        children: Vec<Node>,
    },
    /// `@name params { children }` or `@name params;`
    AtRule {
        name: String,
        params: String,
        position: SourcePosition,
        children: Vec<Node>,
    },
}

/// Scan a stylesheet into top-level nodes. `path` is used for error messages only.
pub fn parse(path: &Path, source: &str) -> Result<Vec<Node>> {
    let mut scanner = Scanner::new(path, source);
    scanner.block(0)
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

struct Scanner<'a> {
    path: &'a Path,
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
}

/// What ended a statement.
enum Terminator {
    Semicolon,
    OpenBrace,
    CloseBrace,
    Eof,
}

impl<'a> Scanner<'a> {
    fn new(path: &'a Path, source: &str) -> Self {
        Self {
            path,
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn starts_with(&self, pat: &str) -> bool {
        pat.chars().enumerate().all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn here(&self) -> SourcePosition {
        SourcePosition {
            line: self.line,
            column: self.column,
        }
    }

    fn error(&self, msg: impl Into<String>) -> StyleguideError {
        StyleguideError::parse(self.path, self.line, msg)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Parse nodes until the closing brace of the current block (or EOF at depth 0).
    fn block(&mut self, depth: usize) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();

        loop {
            self.skip_whitespace();

            let Some(c) = self.peek() else {
                if depth > 0 {
                    return Err(self.error("unexpected end of file, missing '}'"));
                }
                return Ok(nodes);
            };

            if c == '}' {
                if depth == 0 {
                    return Err(self.error("unbalanced '}'"));
                }
                self.bump();
                return Ok(nodes);
            }

            if self.starts_with("/*") {
                nodes.push(self.comment()?);
                continue;
            }

            if self.starts_with("//") {
                self.skip_line();
                continue;
            }

            if let Some(node) = self.statement(depth)? {
                nodes.push(node);
            }
        }
    }

    fn comment(&mut self) -> Result<Node> {
        let position = self.here();
        self.bump();
        self.bump();

        let mut text = String::new();
        loop {
            if self.starts_with("*/") {
                self.bump();
                self.bump();
                break;
            }
            match self.bump() {
                Some(c) => text.push(c),
                None => return Err(self.error("unterminated comment")),
            }
        }

        Ok(Node::Comment {
            text: text.trim().to_string(),
            position,
        })
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
    }

    /// Skip a quoted string, appending it verbatim to `buf`.
    fn string(&mut self, quote: char, buf: &mut String) -> Result<()> {
        if let Some(c) = self.bump() {
            buf.push(c);
        }
        loop {
            match self.bump() {
                Some('\\') => {
                    buf.push('\\');
                    if let Some(escaped) = self.bump() {
                        buf.push(escaped);
                    }
                }
                Some(c) if c == quote => {
                    buf.push(c);
                    return Ok(());
                }
                Some(c) => buf.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    /// Read one statement header up to its terminator and build the node.
    fn statement(&mut self, depth: usize) -> Result<Option<Node>> {
        let position = self.here();
        let mut buf = String::new();
        let mut parens = 0usize;
        let mut interpolation = 0usize;
        let mut in_url = false;

        let terminator = loop {
            let Some(c) = self.peek() else {
                break Terminator::Eof;
            };

            match c {
                '"' | '\'' => {
                    self.string(c, &mut buf)?;
                    continue;
                }
                '#' if self.peek_at(1) == Some('{') => {
                    interpolation += 1;
                    buf.push('#');
                    buf.push('{');
                    self.bump();
                    self.bump();
                    continue;
                }
                '}' if interpolation > 0 => interpolation -= 1,
                '(' => {
                    in_url = buf.to_ascii_lowercase().ends_with("url");
                    parens += 1;
                }
                ')' => {
                    in_url = false;
                    parens = parens.saturating_sub(1);
                }
                '/' if !in_url && self.starts_with("/*") => {
                    // Inline comments inside a statement are dropped.
                    self.comment()?;
                    continue;
                }
                // `//` after a scheme colon is part of a URL, not a comment.
                '/' if !in_url && self.peek_at(1) == Some('/') && !buf.ends_with(':') => {
                    self.skip_line();
                    buf.push('\n');
                    continue;
                }
                ';' if parens == 0 => {
                    self.bump();
                    break Terminator::Semicolon;
                }
                '{' if parens == 0 => {
                    self.bump();
                    break Terminator::OpenBrace;
                }
                '}' if parens == 0 => break Terminator::CloseBrace,
                _ => {}
            }

            buf.push(c);
            self.bump();
        };

        let header = buf.trim();

        match terminator {
            Terminator::OpenBrace => {
                let children = self.block(depth + 1)?;
                if let Some(rest) = header.strip_prefix('@') {
                    let (name, params) = split_at_keyword(rest);
                    Ok(Some(Node::AtRule {
                        name,
                        params,
                        position,
                        children,
                    }))
                } else {
                    Ok(Some(Node::Rule {
                        selector: header.to_string(),
                        position,
                        children,
                    }))
                }
            }
            Terminator::Semicolon | Terminator::CloseBrace | Terminator::Eof => {
                if header.is_empty() {
                    return Ok(None);
                }
                Ok(Some(simple_statement(header, position)))
            }
        }
    }
}

/// Build a node for a statement without a block.
fn simple_statement(header: &str, position: SourcePosition) -> Node {
    if let Some(rest) = header.strip_prefix('@') {
        let (name, params) = split_at_keyword(rest);
        return Node::AtRule {
            name,
            params,
            position,
            children: Vec::new(),
        };
    }

    match header.split_once(':') {
        Some((prop, value)) => Node::Declaration {
            prop: prop.trim().to_string(),
            value: value.trim().to_string(),
            position,
        },
        None => Node::Declaration {
            prop: header.to_string(),
            value: String::new(),
            position,
        },
    }
}

/// Split `mixin name($a)` into (`mixin`, `name($a)`).
fn split_at_keyword(rest: &str) -> (String, String) {
    let end = rest
        .find(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(rest.len());
    (rest[..end].to_string(), rest[end..].trim().to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
