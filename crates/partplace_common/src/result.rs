//! Common result and error types for the floorplanner.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates an unrecoverable internal error (a bug in the solver),
/// not a user-facing problem. Input errors and search outcomes are reported
/// through their own error types and through diagnostics.
pub type PlanResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in the floorplanner, not an input problem.
///
/// These errors should never occur during normal operation. If one does occur,
/// a heuristic broke one of its own postconditions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("internal floorplanner error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let err = InternalError::new("reducer left area insufficient");
        assert_eq!(
            format!("{err}"),
            "internal floorplanner error: reducer left area insufficient"
        );
    }

    #[test]
    fn err_path() {
        let r: PlanResult<i32> = Err(InternalError::new("test error"));
        assert_eq!(r.unwrap_err().message, "test error");
    }

    #[test]
    fn from_string() {
        let err: InternalError = "from string".to_string().into();
        assert_eq!(err.message, "from string");
    }
}
