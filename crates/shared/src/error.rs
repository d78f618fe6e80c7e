//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Variants correspond to the error kinds of the domain contract, not to
/// transport codes: the HTTP mapping lives in [`AppError::status_code`] and
/// is the only place a status number appears.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failed or no credentials presented.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Caller lacks the membership or role the operation requires.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Referenced entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input (non-positive amount, unknown filter value, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A referenced entity exists but violates a relational constraint.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// State transition attempted from the wrong source state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Underlying persistence failure; may be retried by the caller.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::InvalidArgument(_) | Self::InvalidReference(_) => 400,
            Self::Conflict(_) => 409,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::InvalidReference(_) => "INVALID_REFERENCE",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the error is deterministic and must not be retried.
    ///
    /// Only persistence failures are transient; every business-rule error
    /// yields the same outcome on replay.
    #[must_use]
    pub const fn is_deterministic(&self) -> bool {
        !matches!(self, Self::Database(_) | Self::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::Unauthorized(String::new()), 401)]
    #[case(AppError::Forbidden(String::new()), 403)]
    #[case(AppError::NotFound(String::new()), 404)]
    #[case(AppError::InvalidArgument(String::new()), 400)]
    #[case(AppError::InvalidReference(String::new()), 400)]
    #[case(AppError::Conflict(String::new()), 409)]
    #[case(AppError::Database(String::new()), 500)]
    #[case(AppError::Internal(String::new()), 500)]
    fn test_error_status_codes(#[case] err: AppError, #[case] expected: u16) {
        assert_eq!(err.status_code(), expected);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::Unauthorized(String::new()).error_code(),
            "UNAUTHORIZED"
        );
        assert_eq!(AppError::Forbidden(String::new()).error_code(), "FORBIDDEN");
        assert_eq!(AppError::NotFound(String::new()).error_code(), "NOT_FOUND");
        assert_eq!(
            AppError::InvalidArgument(String::new()).error_code(),
            "INVALID_ARGUMENT"
        );
        assert_eq!(
            AppError::InvalidReference(String::new()).error_code(),
            "INVALID_REFERENCE"
        );
        assert_eq!(AppError::Conflict(String::new()).error_code(), "CONFLICT");
        assert_eq!(
            AppError::Database(String::new()).error_code(),
            "DATABASE_ERROR"
        );
        assert_eq!(
            AppError::Internal(String::new()).error_code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Forbidden("msg".into()).to_string(),
            "Access denied: msg"
        );
        assert_eq!(
            AppError::Conflict("msg".into()).to_string(),
            "Conflict: msg"
        );
        assert_eq!(
            AppError::InvalidReference("msg".into()).to_string(),
            "Invalid reference: msg"
        );
    }

    #[test]
    fn test_retry_classification() {
        assert!(!AppError::Database(String::new()).is_deterministic());
        assert!(!AppError::Internal(String::new()).is_deterministic());
        assert!(AppError::Forbidden(String::new()).is_deterministic());
        assert!(AppError::Conflict(String::new()).is_deterministic());
        assert!(AppError::NotFound(String::new()).is_deterministic());
    }
}
