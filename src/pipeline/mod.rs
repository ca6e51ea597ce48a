//! Download, tag and register tracks one at a time

pub mod error;
pub mod fetch;
pub mod processor;
mod scratch;
pub mod tag;
