//! Role-dependent creation policy for ledger entries.
//!
//! The head/member branching is the crux of the business rules, so it is
//! centralized in one exhaustively-tested function instead of being spread
//! across call sites.

use uuid::Uuid;

use crate::group::Role;
use crate::ledger::types::{CreationDecision, EntryStatus, Resolution};

/// The two creation policies, one per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationPolicy {
    /// Head entries are born approved; the head may credit any member.
    Head,
    /// Member entries are born pending and always credit the creator.
    Member,
}

impl CreationPolicy {
    /// Selects the policy for a role.
    #[must_use]
    pub const fn for_role(role: Role) -> Self {
        match role {
            Role::Head => Self::Head,
            Role::Member => Self::Member,
        }
    }
}

/// Decides beneficiary, initial status, and initial resolution for a new
/// ledger entry.
///
/// - A head's entry is created already approved with the head as approver.
///   The beneficiary is the requested user when given (validated as a group
///   member by the caller), otherwise the head itself.
/// - A member's entry is created pending with the member as beneficiary;
///   any requested beneficiary is ignored, since members cannot credit
///   anyone else.
#[must_use]
pub fn decide_creation(
    role: Role,
    caller: Uuid,
    requested_beneficiary: Option<Uuid>,
) -> CreationDecision {
    match CreationPolicy::for_role(role) {
        CreationPolicy::Head => CreationDecision {
            beneficiary: requested_beneficiary.unwrap_or(caller),
            status: EntryStatus::Approved,
            resolution: Resolution::Approved { by: caller },
        },
        CreationPolicy::Member => CreationDecision {
            beneficiary: caller,
            status: EntryStatus::PendingApproval,
            resolution: Resolution::Unresolved,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_for_role() {
        assert_eq!(CreationPolicy::for_role(Role::Head), CreationPolicy::Head);
        assert_eq!(
            CreationPolicy::for_role(Role::Member),
            CreationPolicy::Member
        );
    }

    #[test]
    fn test_head_without_beneficiary_defaults_to_self() {
        let head = Uuid::new_v4();
        let decision = decide_creation(Role::Head, head, None);

        assert_eq!(decision.beneficiary, head);
        assert_eq!(decision.status, EntryStatus::Approved);
        assert_eq!(decision.resolution, Resolution::Approved { by: head });
    }

    #[test]
    fn test_head_with_beneficiary_credits_target() {
        let head = Uuid::new_v4();
        let target = Uuid::new_v4();
        let decision = decide_creation(Role::Head, head, Some(target));

        assert_eq!(decision.beneficiary, target);
        assert_eq!(decision.status, EntryStatus::Approved);
        // The approver is the head, even when crediting someone else.
        assert_eq!(decision.resolution.approver(), Some(head));
    }

    #[test]
    fn test_member_is_forced_to_self_credit() {
        let member = Uuid::new_v4();
        let someone_else = Uuid::new_v4();
        let decision = decide_creation(Role::Member, member, Some(someone_else));

        assert_eq!(decision.beneficiary, member);
        assert_eq!(decision.status, EntryStatus::PendingApproval);
        assert_eq!(decision.resolution, Resolution::Unresolved);
    }

    #[test]
    fn test_member_without_beneficiary() {
        let member = Uuid::new_v4();
        let decision = decide_creation(Role::Member, member, None);

        assert_eq!(decision.beneficiary, member);
        assert_eq!(decision.status, EntryStatus::PendingApproval);
        assert_eq!(decision.resolution.approver(), None);
        assert_eq!(decision.resolution.rejecter(), None);
    }

    #[test]
    fn test_decision_status_matches_resolution() {
        let caller = Uuid::new_v4();
        for (role, requested) in [
            (Role::Head, None),
            (Role::Head, Some(Uuid::new_v4())),
            (Role::Member, None),
            (Role::Member, Some(Uuid::new_v4())),
        ] {
            let decision = decide_creation(role, caller, requested);
            assert_eq!(decision.resolution.status(), decision.status);
        }
    }
}
