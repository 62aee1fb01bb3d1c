//! Letter case of keywords and identifiers
//!
//! Only bare words change case. Quoted identifiers, string literals, numbers,
//! bind variables and comments are written exactly as they appear.

use std::borrow::Cow;

use crate::parser::{Token, TokenKind};
use crate::profile::{CaseMode, Style};

/// Apply a case mode to a word
#[must_use]
pub fn apply_case(word: &str, mode: CaseMode) -> Cow<'_, str> {
    match mode {
        CaseMode::Lower if word.chars().any(char::is_uppercase) => {
            Cow::Owned(word.to_lowercase())
        }
        CaseMode::Upper if word.chars().any(char::is_lowercase) => {
            Cow::Owned(word.to_uppercase())
        }
        _ => Cow::Borrowed(word),
    }
}

/// Output text of a token
///
/// `keyword` is whether the parser consumed the token in keyword position.
#[must_use]
pub fn token_text<'t>(token: &'t Token, keyword: bool, style: &Style) -> Cow<'t, str> {
    match token.kind {
        TokenKind::Word if keyword => apply_case(&token.text, style.keyword_case),
        TokenKind::Word => apply_case(&token.text, style.identifier_case),
        _ => Cow::Borrowed(&token.text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(kind: TokenKind, text: &str) -> Token {
        Token {
            kind,
            text: text.to_string(),
            span: 0..text.len(),
            comments: Vec::new(),
            blank_line_before: false,
        }
    }

    #[test]
    fn test_apply_case() {
        assert_eq!(apply_case("Select", CaseMode::Lower), "select");
        assert_eq!(apply_case("Select", CaseMode::Upper), "SELECT");
        assert_eq!(apply_case("Select", CaseMode::Keep), "Select");
    }

    #[test]
    fn test_unchanged_word_is_borrowed() {
        assert!(matches!(apply_case("end", CaseMode::Lower), Cow::Borrowed(_)));
    }

    #[test]
    fn test_keyword_and_identifier_modes() {
        let style = Style {
            keyword_case: CaseMode::Upper,
            identifier_case: CaseMode::Lower,
            ..Style::compact()
        };
        let word = token(TokenKind::Word, "Emp_Id");
        assert_eq!(token_text(&word, true, &style), "EMP_ID");
        assert_eq!(token_text(&word, false, &style), "emp_id");
    }

    #[test]
    fn test_literals_keep_their_case() {
        let style = Style {
            keyword_case: CaseMode::Upper,
            identifier_case: CaseMode::Upper,
            ..Style::compact()
        };
        for (kind, text) in [
            (TokenKind::String, "'Marketing'"),
            (TokenKind::QuotedIdent, "\"MixedCase\""),
            (TokenKind::Bind, ":new_id"),
            (TokenKind::Number, "1e5"),
        ] {
            assert_eq!(token_text(&token(kind, text), true, &style), text);
        }
    }
}
