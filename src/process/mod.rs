//! File selection and the batch formatting run.
//!
//! A run goes through these steps:
//!
//! 1. [`select_files`] walks the root and yields the ordered candidates
//! 2. For each candidate, in order, [`format_content`] extracts the regions,
//!    parses and rewrites the formattable ones and reassembles the file
//! 3. The [`FormatOutcome`] decides both the report entry and whether the
//!    file is written back
//!
//! The main entry point is [`FormatRun::execute`].

pub mod driver;
pub mod pipeline;
pub mod report;
pub mod selector;

pub use driver::{FormatRun, RunSummary};
pub use pipeline::{format_content, FormatOutcome};
pub use report::Reporter;
pub use selector::{select_files, CandidateFile, FileSelection};
