//! Result and error types for internal invariant failures.

/// The standard result type for operations that can only fail on a
/// compiler bug.
///
/// An `Err` here never describes a problem with the user's design; those
/// are reported through pass-specific channels while the operation still
/// returns `Ok`.
pub type SilicaResult<T> = Result<T, InternalError>;

/// An internal invariant violation — a bug in Silica itself.
///
/// Produced by consistency checks such as the IR module verifier.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the violated invariant.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
