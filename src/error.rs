use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document could not be turned into text or rows. Fatal for that
    /// document only.
    #[error("failed to extract {}: {reason}", path.display())]
    Extraction { path: PathBuf, reason: String },

    /// Storage failed; the document is not considered ingested.
    #[error("database error: {0}")]
    Sink(#[from] rusqlite::Error),
}

impl IngestError {
    pub fn extraction(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        IngestError::Extraction {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Errors that only affect the current document and let a batch continue.
    pub fn is_document_local(&self) -> bool {
        !matches!(self, IngestError::Sink(_))
    }
}
