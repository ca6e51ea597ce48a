use std::process::ExitCode;

use crate::cli::run;

pub mod catalog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod pipeline;
pub mod playlist;
pub mod ui;

fn main() -> ExitCode {
    run()
}
