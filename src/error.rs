use thiserror::Error;

use crate::catalog::error::CatalogError;

/// Conditions that end the whole run, handled once in [`crate::cli::run`]
#[derive(Debug, Error)]
pub enum AppError {
    #[error("there are no tracks to download")]
    NothingToDo,

    #[error("configuration error: {0:#}")]
    Config(anyhow::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("couldn't load batch file: {0:#}")]
    BatchFile(anyhow::Error),
}
