//! Tokenizer for PL/SQL and SQL text.
//!
//! Comments never become tokens. Each one is attached to the token that
//! follows it, together with enough layout facts (same line as the previous
//! token, alone on its line, blank line before) for the rewriter to put it back
//! in a stable place. Comment and literal text is kept verbatim.

use std::ops::Range;

use super::syntax_error::SyntaxError;

/// Lexical class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Keyword or unquoted identifier
    Word,
    /// `"Mixed Case"`
    QuotedIdent,
    /// `'text'`, `n'text'`, `q'[text]'`
    String,
    Number,
    /// `:name` or `:1`
    Bind,
    /// Operator or punctuation
    Symbol,
    /// A `/` alone on its line, ending a unit
    Slash,
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    /// `-- ...` up to the end of the line
    Line,
    /// `/* ... */`
    Block,
}

/// A comment attached to the token that follows it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub kind: CommentKind,
    /// Written on the same line as the previous token
    pub trailing: bool,
    /// Preceded by a line break (or at the start of the text)
    pub own_line: bool,
    pub blank_line_before: bool,
    /// Followed by a line break
    pub newline_after: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte range in the region text
    pub span: Range<usize>,
    /// Comments between the previous token and this one
    pub comments: Vec<Comment>,
    /// At least one empty line directly before this token
    pub blank_line_before: bool,
}

impl Token {
    /// Case-insensitive keyword comparison for word tokens
    #[must_use]
    pub fn is_word(&self, word: &str) -> bool {
        self.kind == TokenKind::Word && self.text.eq_ignore_ascii_case(word)
    }

    #[must_use]
    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Symbol && self.text == symbol
    }
}

/// Multi-character symbols, longest first
const SYMBOLS: &[&str] = &[
    ":=", "=>", "..", "||", "<=", ">=", "<>", "!=", "^=", "~=", "<<", ">>", "**",
];

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    tokens: Vec<Token>,
    pending: Vec<Comment>,
    /// Line breaks seen since the last token or comment
    newlines: usize,
    /// Whether anything (token or comment) has been emitted yet
    started: bool,
    /// No line break since the last token
    same_line_as_token: bool,
}

/// Split `source` into tokens, ending with an `Eof` token
pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut lexer = Lexer {
        source,
        pos: 0,
        tokens: Vec::new(),
        pending: Vec::new(),
        newlines: 0,
        started: false,
        same_line_as_token: false,
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

impl<'a> Lexer<'a> {
    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn error(&self, offset: usize, found: &str, expected: &[&str]) -> SyntaxError {
        SyntaxError::at(
            self.source,
            offset,
            found,
            expected.iter().map(|s| (*s).to_string()),
        )
    }

    fn run(&mut self) -> Result<(), SyntaxError> {
        loop {
            self.skip_whitespace();
            let start = self.pos;
            let Some(c) = self.peek() else {
                self.push(TokenKind::Eof, start);
                return Ok(());
            };

            if self.rest().starts_with("--") {
                let end = self.rest().find('\n').map_or(self.source.len(), |i| self.pos + i);
                let text = self.source[start..end].trim_end_matches('\r').to_string();
                self.pos = end;
                self.comment(text, CommentKind::Line);
            } else if self.rest().starts_with("/*") {
                let Some(close) = self.rest()[2..].find("*/") else {
                    return Err(self.error(start, "/*", &["'*/'"]));
                };
                self.pos += close + 4;
                let text = self.source[start..self.pos].to_string();
                self.comment(text, CommentKind::Block);
            } else if c == '/' && self.slash_line(start) {
                self.pos += 1;
                self.push(TokenKind::Slash, start);
            } else if let Some(quote_len) = self.string_prefix() {
                self.string(start, quote_len)?;
            } else if c == '"' {
                let Some(close) = self.rest()[1..].find('"') else {
                    return Err(self.error(start, "\"", &["'\"'"]));
                };
                self.pos += close + 2;
                self.push(TokenKind::QuotedIdent, start);
            } else if c.is_ascii_digit()
                || (c == '.' && self.peek_nth(1).is_some_and(|n| n.is_ascii_digit()))
            {
                self.number();
                self.push(TokenKind::Number, start);
            } else if c.is_alphabetic() {
                self.word();
                self.push(TokenKind::Word, start);
            } else if c == ':' && self.peek_nth(1).is_some_and(|n| n.is_alphanumeric()) {
                self.pos += 1;
                self.word();
                self.push(TokenKind::Bind, start);
            } else {
                let len = SYMBOLS
                    .iter()
                    .find(|s| self.rest().starts_with(**s))
                    .map_or(c.len_utf8(), |s| s.len());
                self.pos += len;
                self.push(TokenKind::Symbol, start);
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            if c == '\n' {
                self.newlines += 1;
                self.same_line_as_token = false;
            }
            self.pos += c.len_utf8();
        }
    }

    /// Whether the `/` at `start` is the only thing on its line
    fn slash_line(&self, start: usize) -> bool {
        let line_start = self.source[..start].rfind('\n').map_or(0, |i| i + 1);
        let line_end = self.source[start..]
            .find('\n')
            .map_or(self.source.len(), |i| start + i);
        self.source[line_start..start].trim().is_empty()
            && self.source[start + 1..line_end].trim().is_empty()
    }

    /// Length of the opening quote of a string literal at the cursor, if any
    fn string_prefix(&self) -> Option<usize> {
        let lower: String = self.rest().chars().take(3).collect::<String>().to_ascii_lowercase();
        if lower.starts_with('\'') {
            Some(1)
        } else if lower.starts_with("nq'") {
            Some(3)
        } else if lower.starts_with("n'") || lower.starts_with("q'") {
            Some(2)
        } else {
            None
        }
    }

    fn string(&mut self, start: usize, quote_len: usize) -> Result<(), SyntaxError> {
        let quoted = self.source[start..start + quote_len].to_ascii_lowercase().contains('q');
        self.pos = start + quote_len;
        let opener_text = &self.source[start..self.pos];

        if quoted {
            let Some(delimiter) = self.peek() else {
                return Err(self.error(start, opener_text, &["quote delimiter"]));
            };
            let closer = match delimiter {
                '[' => ']',
                '(' => ')',
                '{' => '}',
                '<' => '>',
                other => other,
            };
            self.pos += delimiter.len_utf8();
            let terminator = format!("{closer}'");
            let Some(end) = self.rest().find(&terminator) else {
                return Err(self.error(start, opener_text, &[&format!("'{terminator}'")]));
            };
            self.pos += end + terminator.len();
        } else {
            loop {
                let Some(end) = self.rest().find('\'') else {
                    return Err(self.error(start, opener_text, &["closing quote"]));
                };
                self.pos += end + 1;
                // doubled quote is an escaped quote
                if self.peek() == Some('\'') {
                    self.pos += 1;
                } else {
                    break;
                }
            }
        }
        self.push(TokenKind::String, start);
        Ok(())
    }

    fn number(&mut self) {
        self.eat_digits();
        if self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
            self.eat_digits();
        } else if self.peek() == Some('.') && self.peek_nth(1) != Some('.') {
            // `1.` is a number, `1..10` is a range
            self.pos += 1;
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let sign = usize::from(matches!(self.peek_nth(1), Some('+' | '-')));
            if self.peek_nth(1 + sign).is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1 + sign;
                self.eat_digits();
            }
        }
    }

    fn eat_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn word(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || matches!(c, '_' | '$' | '#') {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn comment(&mut self, text: String, kind: CommentKind) {
        let trailing = self.same_line_as_token && !self.tokens.is_empty() && self.pending.is_empty();
        let own_line = !self.started || self.newlines > 0;
        let blank_line_before = self.started && self.newlines > 1;
        if let Some(previous) = self.pending.last_mut() {
            previous.newline_after = self.newlines > 0;
        }
        self.pending.push(Comment {
            text,
            kind,
            trailing,
            own_line,
            blank_line_before,
            newline_after: kind == CommentKind::Line,
        });
        self.started = true;
        self.newlines = 0;
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        if let Some(previous) = self.pending.last_mut() {
            previous.newline_after = previous.kind == CommentKind::Line || self.newlines > 0;
        }
        let blank_line_before = self.started && self.newlines > 1;
        self.tokens.push(Token {
            kind,
            text: self.source[start..self.pos].to_string(),
            span: start..self.pos,
            comments: std::mem::take(&mut self.pending),
            blank_line_before,
        });
        self.started = true;
        self.newlines = 0;
        self.same_line_as_token = true;
    }
}
