/// Fatal errors of a sweep run
///
/// Only these abort a run. Missing folders and per-file delete failures are
/// recorded in the step reports instead and never surface here.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("{} not found", path.display())]
    CatalogNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error parsing JSON in {}: {source}", path.display())]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to save {}: {source}", path.display())]
    CatalogSave {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

impl SweepError {
    /// True for the two load failure kinds (absent file, malformed catalog)
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            SweepError::CatalogNotFound { .. }
                | SweepError::CatalogRead { .. }
                | SweepError::CatalogParse { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SweepError>;
