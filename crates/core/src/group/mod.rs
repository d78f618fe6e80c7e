//! Group membership roles and the authorization contract.
//!
//! Every group-scoped operation resolves the caller's role before touching
//! anything else. The lookup itself lives in the persistence layer; this
//! module defines the role vocabulary and the two gate checks the rest of
//! the domain builds on. A caller with no membership always fails the gate -
//! absence is never treated as an implicit low-privilege role.

use serde::{Deserialize, Serialize};

use crate::ledger::error::LedgerError;

/// A user's role within a group.
///
/// A group has exactly one head (its creator); everyone else joining through
/// an invite becomes a member. Headship is not transferable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The privileged role: approves/rejects entries, manages chores,
    /// records settlements, issues invites.
    Head,
    /// A regular participant: creates self-credited pending entries and
    /// views group data.
    Member,
}

impl Role {
    /// Parse a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "head" => Some(Self::Head),
            "member" => Some(Self::Member),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Member => "member",
        }
    }

    /// Returns true for the head role.
    #[must_use]
    pub const fn is_head(&self) -> bool {
        matches!(self, Self::Head)
    }
}

/// Requires that the caller is a member of the group.
///
/// Membership resolution runs before any existence check on the target
/// resource, so a non-member probing a group learns nothing about what the
/// group contains.
///
/// # Errors
///
/// Returns [`LedgerError::NotAMember`] when the caller has no membership.
pub fn require_member(role: Option<Role>) -> Result<Role, LedgerError> {
    role.ok_or(LedgerError::NotAMember)
}

/// Requires that the caller is the head of the group.
///
/// # Errors
///
/// Returns [`LedgerError::NotAMember`] for non-members and
/// [`LedgerError::HeadRequired`] for members without the head role.
pub fn require_head(role: Option<Role>) -> Result<(), LedgerError> {
    match require_member(role)? {
        Role::Head => Ok(()),
        Role::Member => Err(LedgerError::HeadRequired),
    }
}
