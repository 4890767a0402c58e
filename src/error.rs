use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T, E = ConnmatError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum ConnmatError {
    /// Input does not fit the declared bit widths of the blob layout.
    #[error("precondition violation: {0}")]
    PreconditionViolation(String),

    /// Blob bytes are inconsistent with the layout.
    #[error("malformed blob: {0}")]
    MalformedBlob(String),

    /// Lookup outside the matrix.
    #[error("cell ({row}, {col}) out of range for {size}x{size} matrix")]
    OutOfRange { row: usize, col: usize, size: usize },

    /// Propagated I/O error from an output sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConnmatError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        ConnmatError::MalformedBlob(msg.into())
    }

    pub(crate) fn precondition(msg: impl Into<String>) -> Self {
        ConnmatError::PreconditionViolation(msg.into())
    }
}
