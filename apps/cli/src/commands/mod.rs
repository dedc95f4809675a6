//! Command implementations for the aip CLI.

pub mod evaluation;

pub use evaluation::EvaluationCommand;

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}
