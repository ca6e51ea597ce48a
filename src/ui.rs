//! Terminal output shown to the user while tracks are processed

use std::error::Error;

use colored::Colorize;

/// Receives everything the user should see.
///
/// Process termination is not part of this trait: unrecoverable conditions
/// travel as [`crate::error::AppError`] to the entrypoint.
pub trait Reporter {
    fn println(&self, text: &str);

    fn warning(&self, text: &str);

    fn error(&self, context: &str, err: &dyn Error);

    fn success(&self, text: &str);

    /// A line of the failure summary
    fn failure(&self, text: &str);
}

/// Prints to stdout, red for errors, yellow for warnings, green for success
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalReporter;

impl Reporter for TerminalReporter {
    fn println(&self, text: &str) {
        println!("{text}");
    }

    fn warning(&self, text: &str) {
        println!("{}", text.yellow());
    }

    fn error(&self, context: &str, err: &dyn Error) {
        println!("{}", format!("{context}: {err}").red());
    }

    fn success(&self, text: &str) {
        println!("{}", text.green());
    }

    fn failure(&self, text: &str) {
        println!("{}", text.red());
    }
}
