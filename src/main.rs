//! plsqlfmt - Batch formatter for PL/SQL and SQL sources

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::io::{self, IsTerminal, Read};
use std::path::Path;
use std::process::ExitCode;

use log::{debug, info};
use plsqlfmt::{format_text, parse_args, CliArgs, Config, GrammarSource, Result, StyleSource};

fn main() -> ExitCode {
    let args = parse_args();
    init_logging(args.verbose);

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins over the `-v` level
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(args: &CliArgs) -> Result<ExitCode> {
    let Some(root) = &args.root else {
        if io::stdin().is_terminal() {
            plsqlfmt::build_cli().print_help()?;
            return Ok(ExitCode::SUCCESS);
        }
        return process_stdin(args);
    };
    if args.reads_stdin() {
        return process_stdin(args);
    }

    let config = build_config(args, root)?;
    let format_run = config.format_run(root)?;
    let summary = if args.quiet {
        format_run.execute(io::sink())?
    } else {
        format_run.execute(io::stdout().lock())?
    };
    info!(
        "{} formatted ({} rewritten), {} skipped, {} failed",
        summary.formatted, summary.rewritten, summary.skipped, summary.failed
    );
    Ok(ExitCode::SUCCESS)
}

/// Build configuration from CLI args and the config files
///
/// Without `--config`, config files are discovered from `root` upwards.
fn build_config(args: &CliArgs, root: &Path) -> Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        debug!("using explicit config file: {}", config_path.display());
        Config::from_toml_file(config_path)?
    } else {
        let discovered = Config::discover_config_files(root);
        if discovered.is_empty() {
            debug!("no config files discovered for {}", root.display());
        }
        Config::from_discovered_files(root)
    };

    // Override with CLI arguments
    if let Some(ext) = &args.ext {
        config.ext = Some(vec![ext.clone()]);
    }
    if let Some(mext) = &args.mext {
        config.mext = Some(vec![mext.clone()]);
    }
    if let Some(grammar) = &args.grammar {
        config.grammar = GrammarSource::from_selector(grammar);
    }
    if let Some(style) = &args.style {
        config.style = StyleSource::from_selector(style);
    }
    config.exclude.extend(args.exclude.iter().cloned());

    debug!("configuration: {config:?}");
    Ok(config)
}

/// Format standard input as generic SQL and write it to stdout
fn process_stdin(args: &CliArgs) -> Result<ExitCode> {
    let cwd = std::env::current_dir()?;
    let config = build_config(args, &cwd)?;
    let profile = config.profile()?;

    let mut source = String::new();
    io::stdin().read_to_string(&mut source)?;

    match format_text(&source, &profile) {
        Ok(text) => {
            print!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            eprintln!("{error}");
            Ok(ExitCode::FAILURE)
        }
    }
}
