//! Grammar rules: the parsing half of a rule profile.
//!
//! A grammar description decides which words are reserved (and therefore never
//! parsed as identifiers), which words name built-in types, and a handful of
//! structural layout rules that belong to the grammar rather than to the style:
//! where a block's first member goes, how labels attach to loops and whether a
//! statement may follow an `end ...;` on the same line.
//!
//! A grammar file may also bundle a style, selected with the `embedded` keyword.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::FormatError;
use crate::profile::style::PartialStyle;

/// Source of the built-in grammar
const DEFAULT_GRAMMAR: &str = include_str!("default_grammar.toml");

/// Grammar description versions this build understands
const SUPPORTED_VERSION: u32 = 1;

/// Words the parser depends on structurally; reserved under every grammar
const CORE_RESERVED: &[&str] = &[
    "and", "as", "begin", "between", "by", "case", "connect", "create", "cross", "declare",
    "delete", "distinct", "else", "elsif", "end", "exception", "exists", "for", "from", "full",
    "function", "group", "having", "if", "in", "inner", "insert", "intersect", "into", "is",
    "join", "left", "like", "loop", "minus", "natural", "not", "null", "on", "or", "order",
    "outer", "package", "procedure", "right", "select", "set", "start", "then", "union",
    "update", "using", "values", "when", "where", "while", "with",
];

static KEYWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_$#]*$").unwrap());

/// Where a statement label goes relative to the loop or block it names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPlacement {
    /// `<<outer>>` on its own line above the statement
    #[default]
    OwnLine,
    /// `<<outer>> loop` on one line
    Inline,
}

/// Whether a statement that follows `end ...;` starts a new line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementBreak {
    #[default]
    Newline,
    /// `end loop;return x;`
    Inline,
}

/// Structural layout rules carried by a grammar
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutRules {
    /// First declaration of a package or subprogram stays on the `is`/`as` line
    pub header_joins_first_member: bool,
    pub label_placement: LabelPlacement,
    /// `<< label >>` instead of `<<label>>`
    pub label_padding: bool,
    pub statement_after_end: StatementBreak,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GrammarFile {
    grammar: GrammarHeader,
    #[serde(default)]
    keywords: KeywordSection,
    #[serde(default)]
    layout: LayoutRules,
    style: Option<PartialStyle>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GrammarHeader {
    name: String,
    version: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct KeywordSection {
    #[serde(default)]
    reserved: Vec<String>,
    #[serde(default)]
    types: Vec<String>,
}

/// Resolved, validated grammar
#[derive(Debug, Clone)]
pub struct Grammar {
    pub name: String,
    pub layout: LayoutRules,
    reserved: HashSet<String>,
    types: HashSet<String>,
    embedded_style: Option<PartialStyle>,
}

impl Grammar {
    /// The grammar compiled into the binary
    pub fn builtin() -> Result<Self, FormatError> {
        Self::from_toml_str("built-in grammar", DEFAULT_GRAMMAR)
    }

    /// Load and validate a grammar description file
    pub fn from_toml_file(path: &Path) -> Result<Self, FormatError> {
        let name = path.display().to_string();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| FormatError::configuration(&name, format!("cannot read grammar: {e}")))?;
        Self::from_toml_str(&name, &contents)
    }

    /// Parse and validate a grammar description
    pub fn from_toml_str(source_name: &str, contents: &str) -> Result<Self, FormatError> {
        let file: GrammarFile = toml::from_str(contents)
            .map_err(|e| FormatError::configuration(source_name, e.to_string()))?;

        if file.grammar.name.trim().is_empty() {
            return Err(FormatError::configuration(
                source_name,
                "grammar name must not be empty",
            ));
        }
        if file.grammar.version != SUPPORTED_VERSION {
            return Err(FormatError::configuration(
                source_name,
                format!(
                    "unsupported grammar version {} (expected {SUPPORTED_VERSION})",
                    file.grammar.version
                ),
            ));
        }
        let reserved = keyword_set(source_name, "reserved", &file.keywords.reserved)?;
        let types = keyword_set(source_name, "types", &file.keywords.types)?;
        if let Some(style) = &file.style {
            // reject a broken embedded style up front, not only when it is selected
            style.resolve(source_name)?;
        }

        let mut reserved = reserved;
        reserved.extend(CORE_RESERVED.iter().map(|w| (*w).to_string()));

        Ok(Grammar {
            name: file.grammar.name,
            layout: file.layout,
            reserved,
            types,
            embedded_style: file.style,
        })
    }

    /// Whether `word` can never be an identifier
    #[must_use]
    pub fn is_reserved(&self, word: &str) -> bool {
        self.reserved.contains(&word.to_ascii_lowercase())
    }

    /// Whether `word` names a built-in type (cased like a keyword)
    #[must_use]
    pub fn is_type_name(&self, word: &str) -> bool {
        self.types.contains(&word.to_ascii_lowercase())
    }

    /// Style bundled with this grammar, if any
    #[must_use]
    pub fn embedded_style(&self) -> Option<&PartialStyle> {
        self.embedded_style.as_ref()
    }
}

/// Validate and normalize one keyword list
fn keyword_set(
    source_name: &str,
    section: &str,
    words: &[String],
) -> Result<HashSet<String>, FormatError> {
    let mut set = HashSet::with_capacity(words.len());
    for word in words {
        if !KEYWORD_RE.is_match(word) {
            return Err(FormatError::configuration(
                source_name,
                format!("invalid word {word:?} in keywords.{section}"),
            ));
        }
        set.insert(word.to_ascii_lowercase());
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_grammar_loads() {
        let grammar = Grammar::builtin().unwrap();
        assert_eq!(grammar.name, "plsql");
        assert!(grammar.is_reserved("SELECT"));
        assert!(grammar.is_reserved("default"));
        assert!(grammar.is_type_name("Varchar2"));
        assert!(!grammar.is_reserved("l_result"));
        assert_eq!(grammar.layout, LayoutRules::default());
        assert!(grammar.embedded_style().is_some());
    }

    #[test]
    fn test_core_words_always_reserved() {
        let grammar = Grammar::from_toml_str("mini", "[grammar]\nname = \"mini\"\nversion = 1\n")
            .unwrap();
        assert!(grammar.is_reserved("begin"));
        assert!(grammar.is_reserved("where"));
        assert!(!grammar.is_type_name("varchar2"));
        assert!(grammar.embedded_style().is_none());
    }

    #[test]
    fn test_layout_rules_parse() {
        let grammar = Grammar::from_toml_str(
            "blocks",
            "[grammar]\nname = \"blocks\"\nversion = 1\n\n[layout]\nheader_joins_first_member = true\nlabel_placement = \"inline\"\nlabel_padding = true\nstatement_after_end = \"inline\"\n",
        )
        .unwrap();
        assert!(grammar.layout.header_joins_first_member);
        assert_eq!(grammar.layout.label_placement, LabelPlacement::Inline);
        assert!(grammar.layout.label_padding);
        assert_eq!(grammar.layout.statement_after_end, StatementBreak::Inline);
    }

    #[test]
    fn test_unsupported_version() {
        let err =
            Grammar::from_toml_str("g", "[grammar]\nname = \"g\"\nversion = 7\n").unwrap_err();
        assert!(err.to_string().contains("unsupported grammar version 7"));
    }

    #[test]
    fn test_empty_name() {
        let err =
            Grammar::from_toml_str("g", "[grammar]\nname = \"  \"\nversion = 1\n").unwrap_err();
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_invalid_keyword() {
        let err = Grammar::from_toml_str(
            "g",
            "[grammar]\nname = \"g\"\nversion = 1\n[keywords]\nreserved = [\"two words\"]\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("keywords.reserved"));
    }

    #[test]
    fn test_invalid_embedded_style() {
        let err = Grammar::from_toml_str(
            "g",
            "[grammar]\nname = \"g\"\nversion = 1\n[style]\nindent = 0\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("indent"));
    }

    #[test]
    fn test_missing_header() {
        assert!(Grammar::from_toml_str("g", "[layout]\nlabel_padding = true\n").is_err());
    }
}
