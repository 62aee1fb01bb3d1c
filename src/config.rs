//! Run configuration for plsqlfmt.
//!
//! This module provides the [`Config`] struct which selects the files and the
//! rule profile of a run. Configuration can be loaded from:
//! - TOML files (`plsqlfmt.toml`)
//! - CLI arguments (which override file settings)
//!
//! Config files are auto-discovered by searching the root directory and its
//! parents up to the filesystem root. Relative `grammar` and `style` paths are
//! resolved against the directory of the file that sets them.

use std::path::{Path, PathBuf};

use glob::Pattern;
use log::{debug, warn};
use serde::Deserialize;

use crate::error::FormatError;
use crate::process::selector::{normalize_extensions, sql_extensions, FileSelection};
use crate::process::FormatRun;
use crate::profile::{resolve, GrammarSource, RuleProfile, StyleSource};

/// Config file name searched for in the root and its ancestors
pub const CONFIG_FILE_NAME: &str = "plsqlfmt.toml";

/// Settings of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// SQL extensions; `None` selects every known one
    pub ext: Option<Vec<String>>,
    /// Markdown extensions; `None` selects the default ones, empty disables them
    pub mext: Option<Vec<String>>,
    pub grammar: GrammarSource,
    pub style: StyleSource,
    /// Glob patterns of paths to leave out
    pub exclude: Vec<String>,
}

/// Extension lists are accepted as one comma separated string or an array
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ExtensionList {
    One(String),
    Many(Vec<String>),
}

impl ExtensionList {
    fn into_items(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

/// Partial configuration for TOML parsing
///
/// All fields are `Option<T>` so we can distinguish between
/// "explicitly set" and "not specified" when merging configs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    ext: Option<ExtensionList>,
    mext: Option<ExtensionList>,
    grammar: Option<String>,
    style: Option<String>,
    exclude: Option<Vec<String>>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self, FormatError> {
        let mut config = Self::default();
        config.merge_file(path)?;
        Ok(config)
    }

    fn merge_file(&mut self, path: &Path) -> Result<(), FormatError> {
        let source_name = path.display().to_string();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| FormatError::configuration(&source_name, e.to_string()))?;
        let partial: PartialConfig = toml::from_str(&contents)
            .map_err(|e| FormatError::configuration(&source_name, e.to_string()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        self.apply_partial(partial, base);
        Ok(())
    }

    /// Apply a partial config, only overriding fields that are explicitly set
    fn apply_partial(&mut self, partial: PartialConfig, base: &Path) {
        if let Some(v) = partial.ext {
            self.ext = Some(v.into_items());
        }
        if let Some(v) = partial.mext {
            self.mext = Some(v.into_items());
        }
        if let Some(v) = partial.grammar {
            self.grammar = GrammarSource::from_selector(&v).relative_to(base);
        }
        if let Some(v) = partial.style {
            self.style = StyleSource::from_selector(&v).relative_to(base);
        }
        if let Some(v) = partial.exclude {
            self.exclude = v;
        }
    }

    /// Discover config files from a directory and its parents
    ///
    /// Returns the config file paths in order of priority (least specific first).
    #[must_use]
    pub fn discover_config_files(start_path: &Path) -> Vec<PathBuf> {
        let start_dir = if start_path.is_file() {
            start_path.parent().map(Path::to_path_buf)
        } else if start_path.is_dir() {
            Some(start_path.to_path_buf())
        } else {
            std::env::current_dir().ok()
        };
        let Some(dir) = start_dir else {
            return Vec::new();
        };
        let dir = std::path::absolute(&dir).unwrap_or(dir);

        let mut config_files: Vec<PathBuf> = dir
            .ancestors()
            .map(|ancestor| ancestor.join(CONFIG_FILE_NAME))
            .filter(|path| path.is_file())
            .collect();
        // root to start, so the most specific file is applied last
        config_files.reverse();
        config_files
    }

    /// Load and merge configuration from discovered config files
    ///
    /// Later files override earlier ones (only explicitly set values). A file
    /// that cannot be read or parsed is skipped with a warning.
    #[must_use]
    pub fn from_discovered_files(start_path: &Path) -> Self {
        let mut config = Self::default();
        for path in Self::discover_config_files(start_path) {
            debug!("applying config file {}", path.display());
            if let Err(e) = config.merge_file(&path) {
                warn!("ignoring {}: {e}", path.display());
            }
        }
        config
    }

    /// The file selection described by this configuration
    pub fn selection(&self) -> Result<FileSelection, FormatError> {
        let mut selection = FileSelection::default();
        if let Some(ext) = &self.ext {
            selection.sql_extensions = sql_extensions(ext);
        }
        if let Some(mext) = &self.mext {
            selection.markdown_extensions = normalize_extensions(mext);
        }
        selection.exclude = self
            .exclude
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|e| {
                    FormatError::configuration(format!("exclude pattern '{pattern}'"), e.to_string())
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(selection)
    }

    /// Resolve the rule profile of the run
    pub fn profile(&self) -> Result<RuleProfile, FormatError> {
        resolve(&self.grammar, &self.style)
    }

    /// Everything a run over `root` needs, resolved up front
    pub fn format_run(&self, root: &Path) -> Result<FormatRun, FormatError> {
        Ok(FormatRun {
            root: root.to_path_buf(),
            selection: self.selection()?,
            profile: self.profile()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::profile::StylePreset;

    fn partial(contents: &str) -> PartialConfig {
        toml::from_str(contents).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ext, None);
        assert_eq!(config.grammar, GrammarSource::Unset);
        assert_eq!(config.style, StyleSource::Unset);
        let selection = config.selection().unwrap();
        assert!(selection.sql_extensions.contains(&"pkb".to_string()));
        assert!(selection.markdown_extensions.contains(&"md".to_string()));
    }

    #[test]
    fn test_config_apply_partial() {
        let mut config = Config::default();
        config.apply_partial(
            partial("ext = \"pkb, sql\"\nmext = []\nstyle = \"expanded\"\n"),
            Path::new("/work"),
        );
        assert_eq!(config.ext, Some(vec!["pkb, sql".to_string()]));
        assert_eq!(config.mext, Some(Vec::new()));
        assert_eq!(config.style, StyleSource::Preset(StylePreset::Expanded));

        let selection = config.selection().unwrap();
        assert_eq!(selection.sql_extensions, vec!["pkb", "sql"]);
        assert!(selection.markdown_extensions.is_empty());
    }

    #[test]
    fn test_config_apply_partial_preserves_unset() {
        let mut config = Config {
            exclude: vec!["build".to_string()],
            ..Default::default()
        };
        config.apply_partial(partial("ext = [\"sql\"]\n"), Path::new("/work"));
        assert_eq!(config.exclude, vec!["build".to_string()]);
        assert_eq!(config.ext, Some(vec!["sql".to_string()]));
    }

    #[test]
    fn test_relative_rule_paths() {
        let mut config = Config::default();
        config.apply_partial(
            partial("grammar = \"rules/g.toml\"\nstyle = \"/abs/s.toml\"\n"),
            Path::new("/work"),
        );
        assert_eq!(
            config.grammar,
            GrammarSource::File(PathBuf::from("/work/rules/g.toml"))
        );
        assert_eq!(config.style, StyleSource::File(PathBuf::from("/abs/s.toml")));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(toml::from_str::<PartialConfig>("indent = 4\n").is_err());
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        let config = Config {
            exclude: vec!["[".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            config.selection(),
            Err(FormatError::Configuration { .. })
        ));
    }

    #[test]
    fn test_discovered_files_nearest_wins() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "ext = \"sql\"\nstyle = \"expanded\"\n").unwrap();
        fs::write(sub.join(CONFIG_FILE_NAME), "ext = \"pkb\"\n").unwrap();

        let config = Config::from_discovered_files(&sub);
        assert_eq!(config.ext, Some(vec!["pkb".to_string()]));
        assert_eq!(config.style, StyleSource::Preset(StylePreset::Expanded));
    }

    #[test]
    fn test_missing_explicit_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_toml_file(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, FormatError::Configuration { .. }));
    }

    #[test]
    fn test_missing_grammar_file_fails_profile() {
        let config = Config {
            grammar: GrammarSource::File(PathBuf::from("/nonexistent/grammar.toml")),
            ..Default::default()
        };
        assert!(config.profile().is_err());
    }
}
