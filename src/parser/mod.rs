//! PL/SQL and SQL parsing.
//!
//! This module turns one code region into a [`ParseTree`] or a [`SyntaxError`]:
//! - [`lexer`]: tokens with attached comments
//! - [`tree`]: the closed set of node types
//! - `statements`, `sql`, `expressions`: the recursive-descent parser, split by
//!   language layer
//!
//! Parsing never panics. Input nested deeper than [`MAX_DEPTH`] is reported as
//! a syntax error instead of recursing further.

pub mod lexer;
pub mod syntax_error;
pub mod tree;

mod expressions;
mod sql;
mod statements;

pub use lexer::{tokenize, Comment, CommentKind, Token, TokenKind};
pub use syntax_error::SyntaxError;
pub use tree::*;

use crate::profile::Grammar;

/// Maximum nesting of statements, queries and expressions
pub const MAX_DEPTH: usize = 256;

pub(crate) type PResult<T> = Result<T, SyntaxError>;

/// Parse a code region with the given grammar
pub fn parse(source: &str, grammar: &Grammar) -> Result<ParseTree, SyntaxError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser::new(source, grammar, tokens);
    let script = parser.script()?;
    Ok(ParseTree {
        tokens: parser.tokens,
        keywords: parser.keywords,
        script,
    })
}

/// Words that end a select list item or table reference instead of naming an alias
const NON_ALIAS_WORDS: &[&str] = &[
    "apply", "bulk", "fetch", "log", "offset", "partition", "pivot", "returning", "unpivot",
];

pub(crate) struct Parser<'a> {
    source: &'a str,
    grammar: &'a Grammar,
    tokens: Vec<Token>,
    keywords: Vec<bool>,
    pos: usize,
    /// Symbols tried at `expected_pos` without success
    expected: Vec<String>,
    expected_pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, grammar: &'a Grammar, tokens: Vec<Token>) -> Self {
        let keywords = vec![false; tokens.len()];
        Parser {
            source,
            grammar,
            tokens,
            keywords,
            pos: 0,
            expected: Vec::new(),
            expected_pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    /// Token `n` positions ahead, clamped to the final `Eof`
    fn peek_at(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> Tok {
        let tok = self.pos;
        if !self.at_eof() {
            self.pos += 1;
        }
        tok
    }

    fn expect_symbol_name(&mut self, name: impl Into<String>) {
        if self.expected_pos != self.pos {
            self.expected_pos = self.pos;
            self.expected.clear();
        }
        self.expected.push(name.into());
    }

    /// Whether the next token is the keyword `word`; records it as expected otherwise
    fn at_word(&mut self, word: &str) -> bool {
        if self.peek().is_word(word) {
            true
        } else {
            self.expect_symbol_name(format!("'{word}'"));
            false
        }
    }

    fn at_any_word(&mut self, words: &[&str]) -> bool {
        let mut found = false;
        for word in words {
            found |= self.at_word(word);
        }
        found
    }

    /// Lookahead without recording expectations
    fn word_at(&self, n: usize, word: &str) -> bool {
        self.peek_at(n).is_word(word)
    }

    fn symbol_at(&self, n: usize, symbol: &str) -> bool {
        self.peek_at(n).is_symbol(symbol)
    }

    fn at_symbol(&mut self, symbol: &str) -> bool {
        if self.peek().is_symbol(symbol) {
            true
        } else {
            self.expect_symbol_name(format!("'{symbol}'"));
            false
        }
    }

    fn keyword(&mut self) -> Tok {
        let tok = self.advance();
        self.keywords[tok] = true;
        tok
    }

    fn accept_word(&mut self, word: &str) -> Option<Tok> {
        self.at_word(word).then(|| self.keyword())
    }

    fn expect_word(&mut self, word: &str) -> PResult<Tok> {
        self.accept_word(word).ok_or_else(|| self.error())
    }

    fn accept_symbol(&mut self, symbol: &str) -> Option<Tok> {
        self.at_symbol(symbol).then(|| self.advance())
    }

    fn expect_symbol(&mut self, symbol: &str) -> PResult<Tok> {
        self.accept_symbol(symbol).ok_or_else(|| self.error())
    }

    fn is_identifier(&self, token: &Token) -> bool {
        match token.kind {
            TokenKind::QuotedIdent => true,
            TokenKind::Word => !self.grammar.is_reserved(&token.text),
            _ => false,
        }
    }

    fn at_identifier(&mut self) -> bool {
        if self.is_identifier(self.peek()) {
            true
        } else {
            self.expect_symbol_name("identifier");
            false
        }
    }

    fn expect_identifier(&mut self) -> PResult<Tok> {
        if self.at_identifier() {
            Ok(self.advance())
        } else {
            Err(self.error())
        }
    }

    /// Identifier usable as an alias
    fn accept_alias_name(&mut self) -> Option<Tok> {
        let token = self.peek();
        let excluded = token.kind == TokenKind::Word
            && NON_ALIAS_WORDS
                .iter()
                .any(|w| token.text.eq_ignore_ascii_case(w));
        (!excluded && self.at_identifier()).then(|| self.advance())
    }

    /// `[as] alias`
    fn alias(&mut self, allow_as: bool) -> PResult<Option<Alias>> {
        if allow_as {
            if let Some(as_kw) = self.accept_word("as") {
                let name = self.expect_identifier()?;
                return Ok(Some(Alias {
                    as_kw: Some(as_kw),
                    name,
                }));
            }
        }
        Ok(self
            .accept_alias_name()
            .map(|name| Alias { as_kw: None, name }))
    }

    /// Dotted name: `a`, `a.b`, `a.b@link`
    fn name(&mut self) -> PResult<Name> {
        let first = self.expect_identifier()?;
        let mut last = first;
        loop {
            if self.peek().is_symbol(".") && self.is_name_part(self.peek_at(1)) {
                self.advance();
                last = self.advance();
            } else if self.peek().is_symbol("@") && self.is_name_part(self.peek_at(1)) {
                self.advance();
                last = self.advance();
            } else {
                break;
            }
        }
        Ok(Name { first, last })
    }

    fn is_name_part(&self, token: &Token) -> bool {
        matches!(token.kind, TokenKind::Word | TokenKind::QuotedIdent)
    }

    /// Run `f` one nesting level deeper
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error_with(vec![format!("nesting depth {MAX_DEPTH}")]));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Syntax error at the current token with everything tried there
    fn error(&self) -> SyntaxError {
        let expected = if self.expected_pos == self.pos {
            self.expected.clone()
        } else {
            Vec::new()
        };
        self.error_with(expected)
    }

    fn error_with(&self, expected: Vec<String>) -> SyntaxError {
        let token = self.peek();
        let offset = if token.kind == TokenKind::Eof {
            self.source.trim_end().len()
        } else {
            token.span.start
        };
        SyntaxError::at(self.source, offset, &token.text, expected)
    }
}
