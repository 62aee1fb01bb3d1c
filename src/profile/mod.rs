//! Rule profile resolution.
//!
//! A run is formatted with exactly one [`RuleProfile`]: a [`Grammar`] paired
//! with a [`Style`]. The two halves are selected independently:
//! - Grammar axis: unset or `default` (built-in grammar), or a description file
//! - Style axis: unset or `default` (compact preset), `compact`/`expanded`,
//!   a description file, or `embedded` (the style bundled in the grammar)
//!
//! Resolution happens once, before any file is read; the profile is shared
//! read-only by every file of the run.

pub mod grammar;
pub mod style;

use std::path::{Path, PathBuf};

use log::debug;

pub use grammar::{Grammar, LabelPlacement, LayoutRules, StatementBreak};
pub use style::{CaseMode, ClauseLayout, CommaStyle, PartialStyle, Style, StylePreset};

use crate::error::FormatError;

/// Reserved selector keyword for the built-in rules
pub const DEFAULT_KEYWORD: &str = "default";
/// Reserved selector keyword for the style bundled in the grammar
pub const EMBEDDED_KEYWORD: &str = "embedded";

/// Where the grammar comes from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GrammarSource {
    #[default]
    Unset,
    Default,
    File(PathBuf),
}

impl GrammarSource {
    /// Interpret a selector value: the `default` keyword or a path
    #[must_use]
    pub fn from_selector(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Self::Unset
        } else if trimmed.eq_ignore_ascii_case(DEFAULT_KEYWORD) {
            Self::Default
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }

    /// Resolve a relative file path against `base`
    #[must_use]
    pub fn relative_to(self, base: &Path) -> Self {
        match self {
            Self::File(path) if path.is_relative() => Self::File(base.join(path)),
            other => other,
        }
    }
}

/// Where the style comes from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StyleSource {
    #[default]
    Unset,
    Default,
    Preset(StylePreset),
    File(PathBuf),
    Embedded,
}

impl StyleSource {
    /// Interpret a selector value: `default`, `embedded`, a preset name or a path
    #[must_use]
    pub fn from_selector(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Self::Unset
        } else if trimmed.eq_ignore_ascii_case(DEFAULT_KEYWORD) {
            Self::Default
        } else if trimmed.eq_ignore_ascii_case(EMBEDDED_KEYWORD) {
            Self::Embedded
        } else if let Some(preset) = StylePreset::from_keyword(trimmed) {
            Self::Preset(preset)
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }

    /// Resolve a relative file path against `base`
    #[must_use]
    pub fn relative_to(self, base: &Path) -> Self {
        match self {
            Self::File(path) if path.is_relative() => Self::File(base.join(path)),
            other => other,
        }
    }
}

/// Resolved grammar provenance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarOrigin {
    Builtin,
    External(PathBuf),
}

/// Resolved style provenance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleOrigin {
    Builtin(StylePreset),
    External(PathBuf),
    Embedded,
}

/// Grammar and style applied to every file of a run
#[derive(Debug, Clone)]
pub struct RuleProfile {
    pub grammar: Grammar,
    pub grammar_origin: GrammarOrigin,
    pub style: Style,
    pub style_origin: StyleOrigin,
}

impl RuleProfile {
    /// Built-in grammar with the compact style
    pub fn builtin() -> Result<Self, FormatError> {
        resolve(&GrammarSource::Unset, &StyleSource::Unset)
    }

    /// Built-in grammar with the given style
    pub fn with_style(style: Style) -> Result<Self, FormatError> {
        Ok(RuleProfile {
            grammar: Grammar::builtin()?,
            grammar_origin: GrammarOrigin::Builtin,
            style,
            style_origin: StyleOrigin::Builtin(StylePreset::Compact),
        })
    }
}

/// Resolve both axes into one profile
///
/// Any missing or invalid external source is a configuration error.
pub fn resolve(grammar: &GrammarSource, style: &StyleSource) -> Result<RuleProfile, FormatError> {
    let (grammar, grammar_origin) = match grammar {
        GrammarSource::Unset | GrammarSource::Default => (Grammar::builtin()?, GrammarOrigin::Builtin),
        GrammarSource::File(path) => (
            Grammar::from_toml_file(path)?,
            GrammarOrigin::External(path.clone()),
        ),
    };
    debug!("grammar '{}' resolved from {grammar_origin:?}", grammar.name);

    let (style, style_origin) = match style {
        StyleSource::Unset | StyleSource::Default => (
            Style::compact(),
            StyleOrigin::Builtin(StylePreset::Compact),
        ),
        StyleSource::Preset(preset) => (Style::preset(*preset), StyleOrigin::Builtin(*preset)),
        StyleSource::File(path) => (Style::from_toml_file(path)?, StyleOrigin::External(path.clone())),
        StyleSource::Embedded => {
            let partial = grammar.embedded_style().ok_or_else(|| {
                FormatError::configuration(
                    grammar.name.clone(),
                    "grammar does not embed a style",
                )
            })?;
            (partial.resolve(&grammar.name)?, StyleOrigin::Embedded)
        }
    };
    debug!("style resolved from {style_origin:?}: {style:?}");

    Ok(RuleProfile {
        grammar,
        grammar_origin,
        style,
        style_origin,
    })
}
