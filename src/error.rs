use acs_report_core::ReportError;
use thiserror::Error;

/// Errors surfaced by the command-line front end.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Report generation failed: {0}")]
    Report(#[from] ReportError),

    #[error("Could not parse JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Layout validation found {0} problem(s)")]
    LayoutInvalid(usize),
}
