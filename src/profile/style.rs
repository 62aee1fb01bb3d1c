//! Style rules: the layout half of a rule profile.
//!
//! A [`Style`] is always a complete set of values. Style description files are
//! parsed into a [`PartialStyle`] where every field is optional, then applied
//! on top of a base preset so that "explicitly set" and "not specified" stay
//! distinguishable.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FormatError;

/// Letter case applied to a class of words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseMode {
    Lower,
    Upper,
    Keep,
}

/// Where list separators go when a list is exploded one element per line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommaStyle {
    /// `a,` / `b`
    Trailing,
    /// `a` / `, b`
    Leading,
}

/// How query clauses are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseLayout {
    /// Clause keywords right-aligned to the end of `select`, elements on the same line
    RightAligned,
    /// Clause keyword alone on its line, elements indented below it
    Block,
}

/// Built-in style families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StylePreset {
    Compact,
    Expanded,
}

impl StylePreset {
    /// Look up a preset by its keyword (case-insensitive)
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "compact" => Some(Self::Compact),
            "expanded" => Some(Self::Expanded),
            _ => None,
        }
    }
}

/// Complete layout configuration consumed by the rewriter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    /// Case of keywords and built-in type names
    pub keyword_case: CaseMode,
    /// Case of unquoted identifiers
    pub identifier_case: CaseMode,
    /// Spaces per indentation level
    pub indent: usize,
    /// Separator placement in exploded lists
    pub comma_style: CommaStyle,
    /// Query clause layout
    pub clause_layout: ClauseLayout,
    /// Align `:=` of sibling assignment statements
    pub align_assignments: bool,
    /// Align names, modes and types of sibling declarations and parameters
    pub align_declarations: bool,
    /// Blank line after `is`/`as` and around package members
    pub blank_lines_around_declarations: bool,
    /// Argument and value lists that would run past this column are exploded
    pub line_length: usize,
}

impl Default for Style {
    fn default() -> Self {
        Self::compact()
    }
}

impl Style {
    /// Minimum reasonable line length
    const MIN_LINE_LENGTH: usize = 40;
    /// Maximum reasonable line length
    const MAX_LINE_LENGTH: usize = 1000;
    /// Maximum reasonable indent size
    const MAX_INDENT: usize = 20;

    /// The compact family: minimal structural decoration
    #[must_use]
    pub fn compact() -> Self {
        Style {
            keyword_case: CaseMode::Lower,
            identifier_case: CaseMode::Keep,
            indent: 3,
            comma_style: CommaStyle::Trailing,
            clause_layout: ClauseLayout::RightAligned,
            align_assignments: true,
            align_declarations: true,
            blank_lines_around_declarations: false,
            line_length: 120,
        }
    }

    /// The expanded family: one clause per block, blank-line separated declarations
    #[must_use]
    pub fn expanded() -> Self {
        Style {
            keyword_case: CaseMode::Upper,
            identifier_case: CaseMode::Keep,
            indent: 4,
            comma_style: CommaStyle::Trailing,
            clause_layout: ClauseLayout::Block,
            align_assignments: false,
            align_declarations: true,
            blank_lines_around_declarations: true,
            line_length: 120,
        }
    }

    #[must_use]
    pub fn preset(preset: StylePreset) -> Self {
        match preset {
            StylePreset::Compact => Self::compact(),
            StylePreset::Expanded => Self::expanded(),
        }
    }

    /// Validate values are within reasonable bounds
    ///
    /// Returns an error message if validation fails, None if valid.
    #[must_use]
    pub fn validate(&self) -> Option<String> {
        if self.indent == 0 {
            return Some("indent must be at least 1".to_string());
        }
        if self.indent > Self::MAX_INDENT {
            return Some(format!(
                "indent {} exceeds maximum of {}",
                self.indent,
                Self::MAX_INDENT
            ));
        }
        if self.line_length < Self::MIN_LINE_LENGTH {
            return Some(format!(
                "line_length {} is below minimum of {}",
                self.line_length,
                Self::MIN_LINE_LENGTH
            ));
        }
        if self.line_length > Self::MAX_LINE_LENGTH {
            return Some(format!(
                "line_length {} exceeds maximum of {}",
                self.line_length,
                Self::MAX_LINE_LENGTH
            ));
        }
        None
    }

    /// Load a style description file
    pub fn from_toml_file(path: &Path) -> Result<Self, FormatError> {
        let name = path.display().to_string();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| FormatError::configuration(&name, format!("cannot read style: {e}")))?;
        Self::from_toml_str(&name, &contents)
    }

    /// Parse and validate a style description
    pub fn from_toml_str(source_name: &str, contents: &str) -> Result<Self, FormatError> {
        let partial: PartialStyle = toml::from_str(contents)
            .map_err(|e| FormatError::configuration(source_name, e.to_string()))?;
        partial.resolve(source_name)
    }

    /// Apply a partial style, only overriding fields that are explicitly set
    fn apply_partial(&mut self, partial: &PartialStyle) {
        if let Some(v) = partial.keyword_case {
            self.keyword_case = v;
        }
        if let Some(v) = partial.identifier_case {
            self.identifier_case = v;
        }
        if let Some(v) = partial.indent {
            self.indent = v;
        }
        if let Some(v) = partial.comma_style {
            self.comma_style = v;
        }
        if let Some(v) = partial.clause_layout {
            self.clause_layout = v;
        }
        if let Some(v) = partial.align_assignments {
            self.align_assignments = v;
        }
        if let Some(v) = partial.align_declarations {
            self.align_declarations = v;
        }
        if let Some(v) = partial.blank_lines_around_declarations {
            self.blank_lines_around_declarations = v;
        }
        if let Some(v) = partial.line_length {
            self.line_length = v;
        }
    }
}

/// Style description as written in a file
///
/// All fields are `Option<T>`; unset fields fall back to the base preset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialStyle {
    pub preset: Option<StylePreset>,
    pub keyword_case: Option<CaseMode>,
    pub identifier_case: Option<CaseMode>,
    pub indent: Option<usize>,
    pub comma_style: Option<CommaStyle>,
    pub clause_layout: Option<ClauseLayout>,
    pub align_assignments: Option<bool>,
    pub align_declarations: Option<bool>,
    pub blank_lines_around_declarations: Option<bool>,
    pub line_length: Option<usize>,
}

impl PartialStyle {
    /// Merge over the requested preset (compact when unset) and validate
    pub fn resolve(&self, source_name: &str) -> Result<Style, FormatError> {
        let mut style = Style::preset(self.preset.unwrap_or(StylePreset::Compact));
        style.apply_partial(self);
        match style.validate() {
            Some(message) => Err(FormatError::configuration(source_name, message)),
            None => Ok(style),
        }
    }
}
