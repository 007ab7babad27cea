use thiserror::Error;

pub type VwResult<T> = Result<T, VwError>;

#[derive(Debug, Error)]
pub enum VwError {
    /// Malformed hex, missing field, unreadable input. Never retried.
    #[error("input error: {0}")]
    Input(String),

    /// Integrity code or signature mismatch. Always fail-closed.
    #[error("authentication failure: {0}")]
    Auth(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(String),

    /// The OS random source failed. Fatal for the operation that needed it;
    /// there is no fallback source.
    #[error("randomness failure: {0}")]
    Randomness(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VwError {
    /// True for rejections the sender caused (bad input or failed
    /// authentication), as opposed to server-side faults.
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            VwError::Input(_) | VwError::Auth(_) | VwError::NotFound(_)
        )
    }
}
