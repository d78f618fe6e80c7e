//! Ledger domain types for entry creation and lifecycle.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::group::Role;

/// Status of a ledger entry in the approval lifecycle.
///
/// Entries move `pending_approval -> approved` or
/// `pending_approval -> rejected`; both targets are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Awaiting the head's decision.
    PendingApproval,
    /// Credited toward the beneficiary's balance (terminal).
    Approved,
    /// Declined; contributes nothing to any balance (terminal).
    Rejected,
}

impl EntryStatus {
    /// Parse a status from its wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending_approval" => Some(Self::PendingApproval),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PendingApproval => "pending_approval",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How (and by whom) an entry was resolved.
///
/// Modeled as a single sum type instead of two independently-nullable
/// approver/rejecter fields, so "at most one of the two is set" holds by
/// construction. The persistence layer flattens this into the column pair
/// and rebuilds it on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Entry is still pending; neither approver nor rejecter is set.
    Unresolved,
    /// Entry was approved.
    Approved {
        /// The head who approved it.
        by: Uuid,
    },
    /// Entry was rejected.
    Rejected {
        /// The head who rejected it.
        by: Uuid,
    },
}

impl Resolution {
    /// The approver, if the entry was approved.
    #[must_use]
    pub const fn approver(&self) -> Option<Uuid> {
        match self {
            Self::Approved { by } => Some(*by),
            _ => None,
        }
    }

    /// The rejecter, if the entry was rejected.
    #[must_use]
    pub const fn rejecter(&self) -> Option<Uuid> {
        match self {
            Self::Rejected { by } => Some(*by),
            _ => None,
        }
    }

    /// Flattens into the `(approved_by, rejected_by)` column pair.
    #[must_use]
    pub const fn into_columns(self) -> (Option<Uuid>, Option<Uuid>) {
        match self {
            Self::Unresolved => (None, None),
            Self::Approved { by } => (Some(by), None),
            Self::Rejected { by } => (None, Some(by)),
        }
    }

    /// Rebuilds a resolution from the stored column pair.
    ///
    /// A row carrying both columns violates the schema constraint; the
    /// approver wins here only so reads stay total.
    #[must_use]
    pub const fn from_columns(approved_by: Option<Uuid>, rejected_by: Option<Uuid>) -> Self {
        match (approved_by, rejected_by) {
            (Some(by), _) => Self::Approved { by },
            (None, Some(by)) => Self::Rejected { by },
            (None, None) => Self::Unresolved,
        }
    }

    /// The status this resolution corresponds to.
    #[must_use]
    pub const fn status(&self) -> EntryStatus {
        match self {
            Self::Unresolved => EntryStatus::PendingApproval,
            Self::Approved { .. } => EntryStatus::Approved,
            Self::Rejected { .. } => EntryStatus::Rejected,
        }
    }
}

/// A chore as seen by entry validation: identity, owning group, and the
/// amount the client UI prefills. The entry's amount is copied at creation
/// time and never re-read from the chore.
#[derive(Debug, Clone)]
pub struct ChoreRef {
    /// Chore ID.
    pub id: Uuid,
    /// The group that owns the chore (immutable).
    pub group_id: Uuid,
    /// The chore's current monetary value.
    pub amount: Decimal,
}

/// Input for creating a ledger entry, after authentication and membership
/// resolution but before policy is applied.
#[derive(Debug, Clone)]
pub struct CreateEntryInput {
    /// The group the entry is created in.
    pub group_id: Uuid,
    /// The authenticated caller.
    pub caller_id: Uuid,
    /// The caller's resolved role in the group.
    pub caller_role: Role,
    /// Beneficiary requested in the payload, if any. Only honored for heads;
    /// ignored for members, whose entries always credit themselves.
    pub beneficiary_id: Option<Uuid>,
    /// The chore being recorded.
    pub chore_id: Uuid,
    /// The amount to credit (must be positive).
    pub amount: Decimal,
}

/// The outcome of the creation policy: who the entry credits and the state
/// it is born in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreationDecision {
    /// The user the entry credits.
    pub beneficiary: Uuid,
    /// The initial status of the entry.
    pub status: EntryStatus,
    /// The initial resolution (set for head self-approval, unset otherwise).
    pub resolution: Resolution,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("pending_approval", Some(EntryStatus::PendingApproval))]
    #[case("approved", Some(EntryStatus::Approved))]
    #[case("rejected", Some(EntryStatus::Rejected))]
    #[case("draft", None)]
    #[case("APPROVED", None)]
    fn test_status_parse(#[case] input: &str, #[case] expected: Option<EntryStatus>) {
        assert_eq!(EntryStatus::parse(input), expected);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            EntryStatus::PendingApproval,
            EntryStatus::Approved,
            EntryStatus::Rejected,
        ] {
            assert_eq!(EntryStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(!EntryStatus::PendingApproval.is_terminal());
        assert!(EntryStatus::Approved.is_terminal());
        assert!(EntryStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_resolution_columns_round_trip() {
        let by = Uuid::new_v4();
        for resolution in [
            Resolution::Unresolved,
            Resolution::Approved { by },
            Resolution::Rejected { by },
        ] {
            let (approved_by, rejected_by) = resolution.into_columns();
            assert_eq!(Resolution::from_columns(approved_by, rejected_by), resolution);
        }
    }

    #[test]
    fn test_resolution_sets_at_most_one_column() {
        let by = Uuid::new_v4();
        let (a, r) = Resolution::Approved { by }.into_columns();
        assert_eq!(a, Some(by));
        assert_eq!(r, None);

        let (a, r) = Resolution::Rejected { by }.into_columns();
        assert_eq!(a, None);
        assert_eq!(r, Some(by));

        let (a, r) = Resolution::Unresolved.into_columns();
        assert_eq!(a, None);
        assert_eq!(r, None);
    }

    #[test]
    fn test_resolution_status_agreement() {
        let by = Uuid::new_v4();
        assert_eq!(Resolution::Unresolved.status(), EntryStatus::PendingApproval);
        assert_eq!(Resolution::Approved { by }.status(), EntryStatus::Approved);
        assert_eq!(Resolution::Rejected { by }.status(), EntryStatus::Rejected);
    }
}
