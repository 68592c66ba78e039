use crate::import::store::StorageError;
use thiserror::Error;

pub type ImportResult<T> = Result<T, ImportError>;

/// Errors that stop an import before or instead of producing a history entry.
///
/// Rejected records and failed organization writes are not errors at this
/// level; they fold into the recorded outcome.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("uploaded file is empty")]
    EmptyPayload,
    #[error("no organizations to import")]
    EmptyBatch,
    #[error("username must not be blank")]
    BlankUsername,
    #[error("batch of {size} organizations exceeds the limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },
    #[error("unreadable import payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
    #[error("failed to record import history: {0}")]
    HistoryWrite(StorageError),
}

impl ImportError {
    /// Whether the caller supplied bad input, as opposed to a server-side failure.
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, ImportError::HistoryWrite(_))
    }
}
