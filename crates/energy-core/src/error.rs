use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Rejected user input or a forbidden workflow step.
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Broken calculation or reconciliation invariant.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }

    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            CoreError::Storage(_) | CoreError::Serde(_) | CoreError::Io(_)
        )
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, CoreError::Internal(_))
    }
}
