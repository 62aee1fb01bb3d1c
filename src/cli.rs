//! Command-line interface for plsqlfmt.
//!
//! Defines CLI arguments using clap builder API

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};

/// Root value that reads the source from standard input
pub const STDIN_ROOT: &str = "-";

/// CLI arguments parsed from command line
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Directory or file to format, or `-` for standard input
    pub root: Option<PathBuf>,

    /// SQL extensions, comma separated; `all` for every known one
    pub ext: Option<String>,

    /// Markdown extensions, comma separated; empty disables Markdown files
    pub mext: Option<String>,

    /// Grammar selector: `default` or a grammar file
    pub grammar: Option<String>,

    /// Style selector: `default`, `compact`, `expanded`, `embedded` or a style file
    pub style: Option<String>,

    /// Glob patterns of paths to leave out
    pub exclude: Vec<String>,

    /// Explicit config file, replaces discovery
    pub config: Option<PathBuf>,

    /// Verbosity level (-v info, -vv debug)
    pub verbose: u8,

    /// Suppress the progress report
    pub quiet: bool,
}

impl CliArgs {
    /// Whether the source comes from standard input
    #[must_use]
    pub fn reads_stdin(&self) -> bool {
        self.root
            .as_ref()
            .is_some_and(|root| root.as_os_str() == STDIN_ROOT)
    }
}

/// Build the CLI command structure
#[must_use]
pub fn build_cli() -> Command {
    Command::new("plsqlfmt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Batch formatter for PL/SQL and SQL, including SQL blocks in Markdown")
        .arg(
            Arg::new("root")
                .help("Directory or file to format; '-' reads standard input")
                .value_name("ROOT")
                .required(false)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("ext")
                .long("ext")
                .help("SQL file extensions, comma separated, or 'all' [default: all]")
                .value_name("LIST"),
        )
        .arg(
            Arg::new("mext")
                .long("mext")
                .help("Markdown file extensions, comma separated; empty disables Markdown [default: markdown,mdown,mkdn,md]")
                .value_name("LIST"),
        )
        .arg(
            Arg::new("grammar")
                .long("grammar")
                .help("Grammar: 'default' or a grammar file")
                .value_name("PATH|default"),
        )
        .arg(
            Arg::new("style")
                .long("style")
                .help("Style: 'default', 'compact', 'expanded', 'embedded' or a style file")
                .value_name("PATH|KEYWORD"),
        )
        .arg(
            Arg::new("exclude")
                .short('e')
                .long("exclude")
                .help("Exclude files matching glob pattern (can be repeated)")
                .value_name("PATTERN")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Config file to use instead of discovered plsqlfmt.toml files")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("More diagnostics on stderr (repeat for debug output)")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Do not print the progress report")
                .action(ArgAction::SetTrue),
        )
}

/// Parse CLI arguments from the process arguments
#[must_use]
pub fn parse_args() -> CliArgs {
    args_from_matches(&build_cli().get_matches())
}

/// Parse CLI arguments from an iterator (for testing)
#[must_use]
pub fn parse_args_from<I, T>(args: I) -> CliArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    args_from_matches(&build_cli().get_matches_from(args))
}

/// Convert clap `ArgMatches` to `CliArgs`
fn args_from_matches(matches: &clap::ArgMatches) -> CliArgs {
    CliArgs {
        root: matches.get_one::<PathBuf>("root").cloned(),
        ext: matches.get_one::<String>("ext").cloned(),
        mext: matches.get_one::<String>("mext").cloned(),
        grammar: matches.get_one::<String>("grammar").cloned(),
        style: matches.get_one::<String>("style").cloned(),
        exclude: matches
            .get_many::<String>("exclude")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        config: matches.get_one::<PathBuf>("config").cloned(),
        verbose: matches.get_count("verbose"),
        quiet: matches.get_flag("quiet"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_builds() {
        let cmd = build_cli();
        assert_eq!(cmd.get_name(), "plsqlfmt");
        cmd.debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let args = parse_args_from(vec!["plsqlfmt"]);
        assert!(args.root.is_none());
        assert!(args.ext.is_none());
        assert!(args.exclude.is_empty());
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert!(!args.reads_stdin());
    }

    #[test]
    fn test_rule_selectors() {
        let args = parse_args_from(vec![
            "plsqlfmt",
            "--grammar",
            "rules/grammar.toml",
            "--style",
            "embedded",
            "src",
        ]);
        assert_eq!(args.grammar.as_deref(), Some("rules/grammar.toml"));
        assert_eq!(args.style.as_deref(), Some("embedded"));
        assert_eq!(args.root, Some(PathBuf::from("src")));
    }

    #[test]
    fn test_empty_mext() {
        let args = parse_args_from(vec!["plsqlfmt", "--mext", "", "--ext=pkb", "src"]);
        assert_eq!(args.mext.as_deref(), Some(""));
        assert_eq!(args.ext.as_deref(), Some("pkb"));
    }

    #[test]
    fn test_exclude_multiple() {
        let args = parse_args_from(vec!["plsqlfmt", "-e", "build", "--exclude", "*_old.sql", "."]);
        assert_eq!(args.exclude, vec!["build", "*_old.sql"]);
    }

    #[test]
    fn test_verbose_count() {
        let args = parse_args_from(vec!["plsqlfmt", "-vv", "-q", "."]);
        assert_eq!(args.verbose, 2);
        assert!(args.quiet);
    }

    #[test]
    fn test_stdin_root() {
        let args = parse_args_from(vec!["plsqlfmt", "-"]);
        assert!(args.reads_stdin());
    }
}
