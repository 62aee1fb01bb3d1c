//! Batch driver.
//!
//! Selects the candidates once, then formats them one at a time in selection
//! order. A file is written only when it was formatted and its content
//! changed; failed and skipped files are never touched. Syntax errors and
//! files that are not UTF-8 text are reported and the run goes on, I/O errors
//! end the run.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use log::{debug, info, warn};

use super::pipeline::{format_content, not_text, FormatOutcome};
use super::report::Reporter;
use super::selector::{select_files, FileSelection};
use crate::error::{FormatError, Result};
use crate::profile::RuleProfile;

/// Parameters of one run; fixed for its whole duration
#[derive(Debug, Clone)]
pub struct FormatRun {
    pub root: PathBuf,
    pub selection: FileSelection,
    pub profile: RuleProfile,
}

/// Outcome counts of a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub formatted: usize,
    /// Formatted files whose content changed and was written back
    pub rewritten: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    #[must_use]
    pub fn total(&self) -> usize {
        self.formatted + self.skipped + self.failed
    }

    fn record(&mut self, outcome: &FormatOutcome) {
        match outcome {
            FormatOutcome::Formatted(_) => self.formatted += 1,
            FormatOutcome::Skipped | FormatOutcome::NotText(_) => self.skipped += 1,
            FormatOutcome::Failed(_) => self.failed += 1,
        }
    }
}

impl FormatRun {
    /// Format every selected file, writing the progress report to `report`
    pub fn execute<W: Write>(&self, report: W) -> Result<RunSummary> {
        let candidates = select_files(&self.root, &self.selection)?;
        let total = candidates.len();
        info!("{total} file(s) selected under {}", self.root.display());

        let mut reporter = Reporter::new(report);
        let mut summary = RunSummary::default();
        for (i, candidate) in candidates.iter().enumerate() {
            let path = &candidate.path;
            let bytes = fs::read(path).map_err(|e| FormatError::io(path.clone(), e))?;
            reporter.start(i + 1, total, path)?;

            let outcome = match String::from_utf8(bytes) {
                Ok(content) => {
                    let outcome = format_content(&content, candidate.kind, &self.profile);
                    if let Some(text) = outcome.changed_content(&content) {
                        if let Err(e) = fs::write(path, text) {
                            reporter.abort()?;
                            return Err(FormatError::io(path.clone(), e).into());
                        }
                        summary.rewritten += 1;
                        debug!("rewrote {}", path.display());
                    }
                    outcome
                }
                Err(e) => {
                    warn!("{} is not UTF-8 text", path.display());
                    not_text(&e)
                }
            };

            summary.record(&outcome);
            reporter.finish(&outcome)?;
        }
        Ok(summary)
    }
}
