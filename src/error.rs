use std::path::PathBuf;

use thiserror::Error;

/// Failures of a single generation run. None of them are fatal to the
/// process: the command reports the message and the user re-runs.
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("unsupported file format: {} (use a .txt or .pdf file)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("failed to read {}: {reason}", path.display())]
    ReadError { path: PathBuf, reason: String },

    #[error("fetching {0} needs a backend service; use file or text input instead")]
    BackendRequired(String),

    #[error("no usable text: every line was empty or filtered out")]
    EmptyInput,

    #[error("content analysis failed: {0}")]
    AnalysisFailure(String),

    #[error("failed to serialize site data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {}: {source}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SiteError {
    pub(crate) fn read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        SiteError::ReadError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;
