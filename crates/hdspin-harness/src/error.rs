//! Harness error type.

use std::path::PathBuf;

use hdspin_core::HdspinError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("io on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("log: {0}")]
    Log(#[source] std::io::Error),
    #[error(transparent)]
    Core(#[from] HdspinError),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl HarnessError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type HarnessResult<T> = Result<T, HarnessError>;
