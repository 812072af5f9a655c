use std::path::PathBuf;

use thiserror::Error;
use tokio::task::JoinError;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Unable to open CSV at path [{path}]: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error
    },
    #[error("Unable to read CSV headers at path [{path}]: {source}")]
    Headers {
        path: PathBuf,
        source: csv::Error
    },
    #[error("CSV reader task failed: {0}")]
    Join(#[from] JoinError)
}
