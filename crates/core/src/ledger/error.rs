//! Error types for ledger operations.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use hearth_shared::AppError;

/// Classification of a ledger error.
///
/// The kind is the stable contract with the transport layer: every variant
/// of [`LedgerError`] maps to exactly one kind, and all kinds except
/// `Transient` are deterministic - retrying them replays the same outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller lacks the membership or role the operation requires.
    Forbidden,
    /// The targeted entity does not exist.
    NotFound,
    /// A referenced entity exists but violates a relational constraint.
    InvalidReference,
    /// Malformed input.
    InvalidArgument,
    /// Transition attempted on an entry not in the required source state.
    Conflict,
    /// Underlying persistence failure; the caller may retry.
    Transient,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Caller is not a member of the group.
    #[error("not a member of this group")]
    NotAMember,

    /// Operation is reserved for the group head.
    #[error("only the group head can perform this action")]
    HeadRequired,

    /// Ledger entry not found.
    #[error("ledger entry {0} not found")]
    EntryNotFound(Uuid),

    /// Referenced chore does not exist.
    #[error("chore {0} not found")]
    ChoreNotFound(Uuid),

    /// Referenced chore belongs to a different group.
    #[error("chore does not belong to this group")]
    ChoreOutsideGroup,

    /// Chosen beneficiary is not a member of the group.
    #[error("beneficiary {0} is not a member of this group")]
    BeneficiaryNotMember(Uuid),

    /// Amount must be strictly positive.
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Unrecognized status filter value.
    #[error("unrecognized status filter: {0}")]
    UnknownStatusFilter(String),

    /// Entry is not in the pending state required for the transition.
    #[error("entry is not pending approval")]
    EntryNotPending,

    /// Persistence failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Returns the error kind for this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAMember | Self::HeadRequired => ErrorKind::Forbidden,
            Self::EntryNotFound(_) => ErrorKind::NotFound,
            Self::ChoreNotFound(_) | Self::ChoreOutsideGroup | Self::BeneficiaryNotMember(_) => {
                ErrorKind::InvalidReference
            }
            Self::NonPositiveAmount(_) | Self::UnknownStatusFilter(_) => ErrorKind::InvalidArgument,
            Self::EntryNotPending => ErrorKind::Conflict,
            Self::Storage(_) => ErrorKind::Transient,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::InvalidReference | ErrorKind::InvalidArgument => 400,
            ErrorKind::Conflict => 409,
            ErrorKind::Transient => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotAMember => "NOT_A_MEMBER",
            Self::HeadRequired => "HEAD_REQUIRED",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::ChoreNotFound(_) => "CHORE_NOT_FOUND",
            Self::ChoreOutsideGroup => "CHORE_OUTSIDE_GROUP",
            Self::BeneficiaryNotMember(_) => "BENEFICIARY_NOT_MEMBER",
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::UnknownStatusFilter(_) => "UNKNOWN_STATUS_FILTER",
            Self::EntryNotPending => "ENTRY_NOT_PENDING",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::Forbidden => Self::Forbidden(message),
            ErrorKind::NotFound => Self::NotFound(message),
            ErrorKind::InvalidReference => Self::InvalidReference(message),
            ErrorKind::InvalidArgument => Self::InvalidArgument(message),
            ErrorKind::Conflict => Self::Conflict(message),
            ErrorKind::Transient => Self::Database(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_forbidden_kinds() {
        assert_eq!(LedgerError::NotAMember.kind(), ErrorKind::Forbidden);
        assert_eq!(LedgerError::HeadRequired.kind(), ErrorKind::Forbidden);
        assert_eq!(LedgerError::NotAMember.status_code(), 403);
        assert_eq!(LedgerError::HeadRequired.status_code(), 403);
    }

    #[test]
    fn test_not_found_kind() {
        let err = LedgerError::EntryNotFound(Uuid::nil());
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "ENTRY_NOT_FOUND");
    }

    #[test]
    fn test_invalid_reference_kinds() {
        assert_eq!(
            LedgerError::ChoreNotFound(Uuid::nil()).kind(),
            ErrorKind::InvalidReference
        );
        assert_eq!(
            LedgerError::ChoreOutsideGroup.kind(),
            ErrorKind::InvalidReference
        );
        assert_eq!(
            LedgerError::BeneficiaryNotMember(Uuid::nil()).kind(),
            ErrorKind::InvalidReference
        );
        // Distinct messages, same kind.
        assert_ne!(
            LedgerError::ChoreNotFound(Uuid::nil()).to_string(),
            LedgerError::ChoreOutsideGroup.to_string()
        );
    }

    #[test]
    fn test_invalid_argument_kinds() {
        assert_eq!(
            LedgerError::NonPositiveAmount(dec!(0)).kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            LedgerError::UnknownStatusFilter("bogus".into()).kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn test_conflict_kind() {
        let err = LedgerError::EntryNotPending;
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "ENTRY_NOT_PENDING");
    }

    #[test]
    fn test_transient_kind() {
        let err = LedgerError::Storage("connection reset".into());
        assert_eq!(err.kind(), ErrorKind::Transient);
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_app_error_conversion_preserves_kind() {
        let app: AppError = LedgerError::NotAMember.into();
        assert_eq!(app.status_code(), 403);

        let app: AppError = LedgerError::EntryNotPending.into();
        assert_eq!(app.status_code(), 409);
        assert!(app.is_deterministic());

        let app: AppError = LedgerError::Storage("timeout".into()).into();
        assert!(!app.is_deterministic());
    }
}
